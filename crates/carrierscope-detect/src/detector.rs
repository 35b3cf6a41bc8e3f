//! Top-level carrier detector
//!
//! Ties evidence collection, the synchronous stage pipeline and the optional
//! registry fallback together. The synchronous path is always available and
//! never blocks; the fallback is consulted only when the synchronous result
//! came out at low confidence.

use crate::config::{build_resolver, DetectorConfig};
use crate::device::{InterfaceSource, NetworkInterface, Reachability, TelephonyProvider};
use crate::evidence::{self, RawProviderRecord};
use crate::pipeline::{merge_whois, CarrierPipeline};
use crate::sim_status;
use crate::whois::WhoisResolver;
use carrierscope_core::{Confidence, DetectionResult, Result, SimStatus};
use tokio::time::Instant;
use tracing::{debug, info};

/// Carrier detector
#[derive(Clone, Default)]
pub struct CarrierDetector {
    pipeline: CarrierPipeline,
    resolver: Option<WhoisResolver>,
}

impl CarrierDetector {
    /// Standard pipeline without a registry fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        Ok(Self {
            pipeline: CarrierPipeline::standard(),
            resolver: build_resolver(config)?,
        })
    }

    /// Replace the stage pipeline
    pub fn with_pipeline(mut self, pipeline: CarrierPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Attach a registry fallback resolver
    pub fn with_resolver(mut self, resolver: WhoisResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.resolver.is_some()
    }

    /// Synchronous detection from raw slot records
    pub fn detect(&self, raw: &[RawProviderRecord], is_on_wifi: bool) -> DetectionResult {
        let result = self.run_pipeline(raw, is_on_wifi);
        record_detection(&result);
        result
    }

    fn run_pipeline(&self, raw: &[RawProviderRecord], is_on_wifi: bool) -> DetectionResult {
        let result = self.pipeline.run(evidence::collect(raw), is_on_wifi);
        debug!(
            carrier = %result.carrier,
            confidence = %result.confidence,
            method = %result.method,
            "Synchronous detection finished"
        );
        result
    }

    /// Synchronous detection against live collaborators.
    ///
    /// Connectivity is read exactly once per call.
    pub fn detect_device<D>(&self, device: &D) -> DetectionResult
    where
        D: TelephonyProvider + Reachability + ?Sized,
    {
        let is_on_wifi = device.is_on_wifi();
        self.detect(&device.provider_records(), is_on_wifi)
    }

    /// Detection with the registry fallback.
    ///
    /// The fallback only runs when the synchronous result is low confidence
    /// and a resolver is configured. A registry carrier match overrides the
    /// classification; anything else leaves it as it was.
    pub async fn detect_with_fallback(
        &self,
        raw: &[RawProviderRecord],
        is_on_wifi: bool,
        interfaces: &[NetworkInterface],
        deadline: Option<Instant>,
    ) -> DetectionResult {
        let result = self.run_pipeline(raw, is_on_wifi);

        let resolver = match &self.resolver {
            Some(resolver) if result.confidence == Confidence::Low => resolver,
            _ => {
                record_detection(&result);
                return result;
            }
        };

        let record = resolver.resolve_via_network(interfaces, deadline).await;
        let merged = merge_whois(result, record);

        info!(
            carrier = %merged.carrier,
            confidence = %merged.confidence,
            method = %merged.method,
            "Detection with registry fallback finished"
        );
        record_detection(&merged);
        merged
    }

    /// [`Self::detect_with_fallback`] against live collaborators
    pub async fn detect_device_with_fallback<D>(
        &self,
        device: &D,
        deadline: Option<Instant>,
    ) -> DetectionResult
    where
        D: TelephonyProvider + Reachability + InterfaceSource + ?Sized,
    {
        let is_on_wifi = device.is_on_wifi();
        let raw = device.provider_records();
        let interfaces = device.interfaces();
        self.detect_with_fallback(&raw, is_on_wifi, &interfaces, deadline)
            .await
    }

    /// SIM posture from raw slot records
    pub fn sim_status(&self, raw: &[RawProviderRecord]) -> SimStatus {
        sim_status::resolve(&evidence::collect(raw))
    }
}

/// Count a finished detection under the method that produced the final result
fn record_detection(result: &DetectionResult) {
    metrics::counter!("carrierscope_detections_total", "method" => result.method.as_str())
        .increment(1);
}
