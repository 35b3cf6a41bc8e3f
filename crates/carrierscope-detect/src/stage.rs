//! Detection stage trait and common types

use carrierscope_core::{Carrier, Confidence, DetectionMethod, ProviderRecord};

/// Trait for every synchronous pipeline stage
///
/// Stages are pure: no I/O, no shared mutable state. A stage either resolves
/// the carrier (short-circuiting the pipeline) or passes with a reason that
/// ends up in the diagnostic trace.
pub trait DetectionStage: Send + Sync {
    /// Evaluate the evidence
    fn evaluate(&self, ctx: &StageContext<'_>) -> StageOutcome;

    /// Get the stage name
    fn name(&self) -> &str;

    /// Method reported when this stage matches
    fn method(&self) -> DetectionMethod;
}

/// Inputs shared by every stage of one detection call
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Normalized evidence, in slot order
    pub evidence: &'a [ProviderRecord],

    /// Connectivity, read once per call
    pub is_on_wifi: bool,
}

impl<'a> StageContext<'a> {
    pub fn new(evidence: &'a [ProviderRecord], is_on_wifi: bool) -> Self {
        Self {
            evidence,
            is_on_wifi,
        }
    }

    /// Usable names across all records, in slot order
    pub fn usable_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.evidence.iter().filter_map(ProviderRecord::usable_name)
    }
}

/// Result of evaluating one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Carrier resolved; the pipeline stops here
    Matched(StageMatch),

    /// Nothing conclusive; the reason is recorded in the trace
    Passed(String),
}

impl StageOutcome {
    pub fn passed(reason: impl Into<String>) -> Self {
        Self::Passed(reason.into())
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// A stage's classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMatch {
    pub carrier: Carrier,
    pub confidence: Confidence,

    /// Label observed on the device (or the outcome label for
    /// inconclusive outcomes)
    pub detected_label: String,

    /// Why the stage matched, for the trace
    pub detail: String,
}

impl StageMatch {
    pub fn new(
        carrier: Carrier,
        confidence: Confidence,
        detected_label: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            carrier,
            confidence,
            detected_label: detected_label.into(),
            detail: detail.into(),
        }
    }
}
