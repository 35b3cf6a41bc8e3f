//! Core value types for CarrierScope

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder values the telephony subsystem reports when it has no real data
pub const SENTINEL_VALUES: [&str; 3] = ["", "--", "65535"];

/// Label attached to the Wi-Fi-calling interference outcome
pub const WIFI_CALLING_LABEL: &str = "Wi-Fi Calling Active";

/// Label attached to the terminal failure outcome
pub const DETECTION_FAILED_LABEL: &str = "Detection Failed";

/// Check whether a telephony value is a sentinel (or missing)
pub fn is_sentinel(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => SENTINEL_VALUES.contains(&v.trim()),
    }
}

/// Carriers the detector can classify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Carrier {
    Verizon,
    Att,
    TMobile,
    UsCellular,
    /// Unknown or unsupported carrier; also the placeholder for
    /// interference and failure outcomes
    #[default]
    Unknown,
}

impl Carrier {
    /// Human-readable brand name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Verizon => "Verizon",
            Self::Att => "AT&T",
            Self::TMobile => "T-Mobile",
            Self::UsCellular => "US Cellular",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether this is a real classification rather than the placeholder
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Classification strength of a detection outcome (`Low < Medium < High`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Strategy that produced a detection outcome
///
/// The first five variants double as pipeline stage identifiers in the
/// diagnostic trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    MncCode,
    CarrierName,
    RadioTechnology,
    PartialName,
    WifiCallingInterference,
    WhoisLookup,
    Failed,
}

impl DetectionMethod {
    /// Stable identifier used in metrics labels and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MncCode => "mnc-code",
            Self::CarrierName => "carrier-name",
            Self::RadioTechnology => "radio-technology",
            Self::PartialName => "partial-name",
            Self::WifiCallingInterference => "wifi-calling-interference",
            Self::WhoisLookup => "whois-lookup",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized telephony snapshot for one SIM slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Opaque slot key
    pub service_id: String,

    /// Carrier name as reported by the SIM (may be a sentinel)
    pub carrier_name: Option<String>,

    /// Mobile country code
    pub mobile_country_code: Option<String>,

    /// Mobile network code
    pub mobile_network_code: Option<String>,

    /// Whether the carrier allows VoIP (Wi-Fi calling)
    pub allows_voip: bool,

    /// Radio access technology hint (e.g. "LTE", "NR"), diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_technology: Option<String>,
}

impl ProviderRecord {
    /// Create a record for the given slot with no evidence
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            carrier_name: None,
            mobile_country_code: None,
            mobile_network_code: None,
            allows_voip: false,
            radio_technology: None,
        }
    }

    /// Set the carrier name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.carrier_name = Some(name.into());
        self
    }

    /// Set the MCC/MNC pair
    pub fn with_codes(mut self, mcc: impl Into<String>, mnc: impl Into<String>) -> Self {
        self.mobile_country_code = Some(mcc.into());
        self.mobile_network_code = Some(mnc.into());
        self
    }

    /// Set the VoIP capability flag
    pub fn with_voip(mut self, allows_voip: bool) -> Self {
        self.allows_voip = allows_voip;
        self
    }

    /// Set the radio access technology hint
    pub fn with_radio_technology(mut self, rat: impl Into<String>) -> Self {
        self.radio_technology = Some(rat.into());
        self
    }

    /// Carrier name, unless it is a sentinel
    pub fn usable_name(&self) -> Option<&str> {
        usable(self.carrier_name.as_deref())
    }

    /// Mobile country code, unless it is a sentinel
    pub fn usable_mcc(&self) -> Option<&str> {
        usable(self.mobile_country_code.as_deref())
    }

    /// Mobile network code, unless it is a sentinel
    pub fn usable_mnc(&self) -> Option<&str> {
        usable(self.mobile_network_code.as_deref())
    }

    /// True when name, MCC and MNC are all sentinels
    pub fn is_sentinel_invalid(&self) -> bool {
        self.usable_name().is_none() && self.usable_mcc().is_none() && self.usable_mnc().is_none()
    }

    /// True when the slot carries a real name or a real (MCC, MNC) pair
    pub fn has_usable_evidence(&self) -> bool {
        self.usable_name().is_some() || (self.usable_mcc().is_some() && self.usable_mnc().is_some())
    }
}

fn usable(value: Option<&str>) -> Option<&str> {
    if is_sentinel(value) {
        None
    } else {
        value.map(str::trim)
    }
}

/// Whether a pipeline stage resolved the carrier or passed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcomeKind {
    Matched,
    Passed,
}

/// One entry of the diagnostic trace attached to every result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrace {
    /// Stage that ran
    pub stage: DetectionMethod,

    /// What the stage decided
    pub outcome: StageOutcomeKind,

    /// Why the stage matched or passed
    pub detail: String,
}

impl StageTrace {
    /// Trace entry for a stage that resolved the carrier
    pub fn matched(stage: DetectionMethod, detail: impl Into<String>) -> Self {
        Self {
            stage,
            outcome: StageOutcomeKind::Matched,
            detail: detail.into(),
        }
    }

    /// Trace entry for a stage that passed through
    pub fn passed(stage: DetectionMethod, detail: impl Into<String>) -> Self {
        Self {
            stage,
            outcome: StageOutcomeKind::Passed,
            detail: detail.into(),
        }
    }
}

/// Final carrier classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Classified carrier
    pub carrier: Carrier,

    /// Classification strength
    pub confidence: Confidence,

    /// Strategy that produced the classification
    pub method: DetectionMethod,

    /// Human-readable string actually observed; authoritative for
    /// interference and failure outcomes
    pub detected_label: String,

    /// Connectivity at detection time
    pub is_on_wifi: bool,

    /// Whether any slot allows Wi-Fi calling
    pub supports_wifi_calling: bool,

    /// Evidence the decision was made from, retained for diagnostics
    pub raw_evidence: Vec<ProviderRecord>,

    /// Stages attempted, in order
    #[serde(default)]
    pub trace: Vec<StageTrace>,

    /// Registry record consulted by the network fallback, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisRecord>,
}

impl DetectionResult {
    /// True for the Wi-Fi-calling interference and failure outcomes
    pub fn is_inconclusive(&self) -> bool {
        matches!(
            self.method,
            DetectionMethod::WifiCallingInterference | DetectionMethod::Failed
        )
    }
}

/// SIM lock and dual-SIM posture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStatus {
    /// Best-effort inference, never a hard guarantee
    pub is_unlocked: bool,

    /// At least two slots produced usable evidence
    pub is_dual_sim: bool,

    /// Number of slots reported
    pub slot_count: usize,

    /// Distinct non-sentinel carrier names across slots
    pub carrier_labels: BTreeSet<String>,

    /// Strength of the inference
    pub confidence: Confidence,
}

/// Confidence of a registry-derived classification (`None < Low < Medium < High`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WhoisConfidence {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl WhoisConfidence {
    /// Map onto the detection confidence scale; `None` has no counterpart
    pub fn to_confidence(self) -> Option<Confidence> {
        match self {
            Self::None => None,
            Self::Low => Some(Confidence::Low),
            Self::Medium => Some(Confidence::Medium),
            Self::High => Some(Confidence::High),
        }
    }
}

/// IP-ownership record returned by the network fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WhoisRecord {
    pub organization_name: Option<String>,
    pub network_name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,

    /// Carrier inferred from the organization and network names
    pub inferred_carrier: Option<Carrier>,

    /// Strength of the inference
    pub inferred_confidence: WhoisConfidence,

    /// Endpoint that answered
    pub source_endpoint: String,
}
