//! CarrierScope Detection
//!
//! Evidence-weighted detection of a device's mobile carrier and SIM posture.
//!
//! Detection runs as an ordered pipeline of strategies, strongest first:
//! - MNC code lookup (high confidence)
//! - Carrier name patterns (medium)
//! - Radio technology hints (diagnostic only)
//! - Partial and legacy brand names (medium)
//! - Wi-Fi calling interference (low)
//!
//! When the synchronous pipeline is inconclusive, an optional async fallback
//! asks regional registries who owns the device's cellular address.

pub mod config;
pub mod detector;
pub mod device;
pub mod evidence;
pub mod mnc;
pub mod patterns;
pub mod pipeline;
pub mod sim_status;
pub mod stage;
pub mod stages;
pub mod whois;

pub use config::{build_resolver, load_config, DetectorConfig, EndpointSpec, WhoisConfig};
pub use detector::CarrierDetector;
pub use device::{DeviceSnapshot, InterfaceSource, NetworkInterface, Reachability, TelephonyProvider};
pub use evidence::RawProviderRecord;
pub use patterns::{MatchStrength, PatternMatch, PatternMatcher};
pub use pipeline::{merge_whois, CarrierPipeline, PipelineBuilder};
pub use stage::{DetectionStage, StageContext, StageMatch, StageOutcome};
pub use whois::{QueryStrategy, WhoisEndpoint, WhoisResolver, WhoisResponse};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::detector::CarrierDetector;
    pub use crate::device::{DeviceSnapshot, NetworkInterface};
    pub use crate::evidence::RawProviderRecord;
    pub use crate::pipeline::CarrierPipeline;
    pub use crate::stage::{DetectionStage, StageContext, StageOutcome};
    pub use crate::whois::{WhoisEndpoint, WhoisResolver};
    pub use carrierscope_core::prelude::*;
}
