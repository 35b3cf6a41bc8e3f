//! Snapshot loading and the JSON report

use anyhow::Context;
use carrierscope_core::{DetectionResult, SimStatus};
use carrierscope_detect::{CarrierDetector, DeviceSnapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::Instant;

/// Everything the detector concluded about one device snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub detection: DetectionResult,
    pub sim_status: SimStatus,
}

/// Load a captured device snapshot; `.json` files are parsed as JSON,
/// anything else as YAML
pub fn load_snapshot(path: &Path) -> anyhow::Result<DeviceSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let snapshot = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(snapshot)
}

/// Run detection with fallback and SIM posture resolution against a snapshot
pub async fn build_report(
    detector: &CarrierDetector,
    snapshot: &DeviceSnapshot,
    deadline: Option<Instant>,
) -> Report {
    let detection = detector.detect_device_with_fallback(snapshot, deadline).await;
    let sim_status = detector.sim_status(&snapshot.providers);

    Report {
        detection,
        sim_status,
    }
}
