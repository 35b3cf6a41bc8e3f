//! Carrier detection pipeline
//!
//! Runs detection stages strictly in order and stops at the first stage that
//! resolves the carrier. Every stage leaves an entry in the result's trace,
//! so a caller can see which strategies were tried and why each passed.
//! When no stage resolves, the pipeline ends in the failure terminal.

use crate::stage::{DetectionStage, StageContext, StageOutcome};
use crate::stages::{
    CarrierNameStage, MncCodeStage, PartialNameStage, RadioTechnologyStage,
    WifiCallingInterferenceStage,
};
use carrierscope_core::{
    Carrier, Confidence, DetectionMethod, DetectionResult, ProviderRecord, StageTrace,
    WhoisRecord, DETECTION_FAILED_LABEL, WIFI_CALLING_LABEL,
};
use std::sync::Arc;
use tracing::debug;

/// An ordered list of detection stages
#[derive(Clone)]
pub struct CarrierPipeline {
    stages: Vec<Arc<dyn DetectionStage>>,
}

impl CarrierPipeline {
    /// A pipeline with no stages; every run ends in the failure terminal.
    /// [`Default`] gives the standard five-stage pipeline instead.
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// The standard five-stage pipeline
    pub fn standard() -> Self {
        PipelineBuilder::new()
            .stage(Arc::new(MncCodeStage))
            .stage(Arc::new(CarrierNameStage::new()))
            .stage(Arc::new(RadioTechnologyStage))
            .stage(Arc::new(PartialNameStage::new()))
            .stage(Arc::new(WifiCallingInterferenceStage))
            .build()
    }

    /// Append a stage
    pub fn add_stage(mut self, stage: Arc<dyn DetectionStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Run every stage against the evidence and produce a result.
    ///
    /// Synchronous and free of I/O. Identical inputs always produce identical
    /// results.
    pub fn run(&self, evidence: Vec<ProviderRecord>, is_on_wifi: bool) -> DetectionResult {
        let ctx = StageContext::new(&evidence, is_on_wifi);
        let mut trace = Vec::with_capacity(self.stages.len() + 1);
        let mut resolved = None;

        for stage in &self.stages {
            match stage.evaluate(&ctx) {
                StageOutcome::Matched(m) => {
                    debug!(stage = stage.name(), carrier = %m.carrier, "Stage resolved carrier");
                    trace.push(StageTrace::matched(stage.method(), m.detail.clone()));
                    resolved = Some((stage.method(), m));
                    break;
                }
                StageOutcome::Passed(reason) => {
                    debug!(stage = stage.name(), %reason, "Stage passed");
                    trace.push(StageTrace::passed(stage.method(), reason));
                }
            }
        }

        let (method, carrier, confidence, label) = match resolved {
            Some((method, m)) => (method, m.carrier, m.confidence, m.detected_label),
            None => {
                trace.push(StageTrace::matched(
                    DetectionMethod::Failed,
                    "no stage resolved the carrier",
                ));
                (
                    DetectionMethod::Failed,
                    Carrier::Unknown,
                    Confidence::Low,
                    DETECTION_FAILED_LABEL.to_string(),
                )
            }
        };

        let supports_wifi_calling = evidence.iter().any(|r| r.allows_voip);

        DetectionResult {
            carrier,
            confidence,
            method,
            detected_label: label,
            is_on_wifi,
            supports_wifi_calling,
            raw_evidence: evidence,
            trace,
            whois: None,
        }
    }

    /// Get number of stages in pipeline
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl Default for CarrierPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for constructing pipelines fluently
pub struct PipelineBuilder {
    pipeline: CarrierPipeline,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            pipeline: CarrierPipeline::empty(),
        }
    }

    /// Add a stage
    pub fn stage(mut self, stage: Arc<dyn DetectionStage>) -> Self {
        self.pipeline = self.pipeline.add_stage(stage);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> CarrierPipeline {
        self.pipeline
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge a registry record into a low-confidence synchronous result.
///
/// - A record with an inferred carrier overrides carrier, confidence and
///   method; the label becomes the registry organization.
/// - A record without a carrier leaves the classification alone and keeps an
///   inconclusive label; any other label degrades to "Detection Failed".
/// - No record leaves the result untouched.
pub fn merge_whois(mut result: DetectionResult, record: Option<WhoisRecord>) -> DetectionResult {
    let Some(record) = record else {
        return result;
    };

    let inferred = record
        .inferred_carrier
        .zip(record.inferred_confidence.to_confidence());

    match inferred {
        Some((carrier, confidence)) => {
            result.carrier = carrier;
            result.confidence = confidence;
            result.method = DetectionMethod::WhoisLookup;
            result.detected_label = record
                .organization_name
                .clone()
                .unwrap_or_else(|| carrier.display_name().to_string());
            result.trace.push(StageTrace::matched(
                DetectionMethod::WhoisLookup,
                format!("{} attributed address to {}", record.source_endpoint, carrier),
            ));
        }
        None => {
            if result.detected_label != WIFI_CALLING_LABEL
                && result.detected_label != DETECTION_FAILED_LABEL
            {
                result.detected_label = DETECTION_FAILED_LABEL.to_string();
            }
            result.trace.push(StageTrace::passed(
                DetectionMethod::WhoisLookup,
                format!(
                    "{} answered without a carrier match ({})",
                    record.source_endpoint,
                    record.organization_name.as_deref().unwrap_or("no organization")
                ),
            ));
        }
    }

    result.whois = Some(record);
    result
}
