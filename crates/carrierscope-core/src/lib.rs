//! CarrierScope Core
//!
//! Core value types and error handling shared across CarrierScope components.
//!
//! This crate provides:
//! - Evidence records reported per SIM slot, and the sentinel rules for them
//! - Detection outcomes (`DetectionResult`, `SimStatus`, `WhoisRecord`)
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    is_sentinel, Carrier, Confidence, DetectionMethod, DetectionResult, ProviderRecord,
    SimStatus, StageOutcomeKind, StageTrace, WhoisConfidence, WhoisRecord,
    DETECTION_FAILED_LABEL, SENTINEL_VALUES, WIFI_CALLING_LABEL,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Carrier, Confidence, DetectionMethod, DetectionResult, ProviderRecord, SimStatus,
        WhoisConfidence, WhoisRecord,
    };
}
