//! Registry lookup fallback
//!
//! Last-resort classification from IP address ownership. The resolver picks
//! the device's cellular address from its interfaces, asks an ordered list
//! of regional registry endpoints who owns it, and classifies the owning
//! organization with the carrier pattern matcher.
//!
//! The first endpoint that answers with any record wins, even when that
//! record names no carrier. Failures of a single endpoint (DNS, timeout,
//! refused connection, malformed response) are logged and skipped; only when
//! every endpoint fails does the resolver give up.
//!
//! Endpoints are pluggable through [`WhoisEndpoint`]. The built-in regional
//! registries are [`StaticRangeRegistry`] placeholders backed by a coarse
//! static range table; [`Port43Endpoint`] and [`RdapEndpoint`] talk to real
//! registry servers.

pub mod cellular;
pub mod port43;
pub mod rdap;
pub mod static_ranges;

pub use cellular::{derive_cellular_ip, DEFAULT_CELLULAR_PREFIXES};
pub use port43::{parse_whois_text, Port43Endpoint};
pub use rdap::{parse_rdap_response, RdapEndpoint};
pub use static_ranges::{Ipv4Range, RangeEntry, Region, StaticRangeRegistry};

use crate::device::NetworkInterface;
use crate::patterns::{MatchStrength, PatternMatcher};
use async_trait::async_trait;
use carrierscope_core::{Error, Result, WhoisConfidence, WhoisRecord};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default per-endpoint query timeout
pub const DEFAULT_ENDPOINT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for every registry endpoint
#[async_trait]
pub trait WhoisEndpoint: Send + Sync {
    /// Look up the owner of an address
    async fn query(&self, address: Ipv4Addr) -> Result<WhoisResponse>;

    /// Identifier reported as the record's source
    fn name(&self) -> &str;
}

/// Ownership fields an endpoint managed to extract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisResponse {
    pub organization_name: Option<String>,
    pub network_name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
}

impl WhoisResponse {
    /// Whether no field was extracted
    pub fn is_empty(&self) -> bool {
        self.organization_name.is_none()
            && self.network_name.is_none()
            && self.description.is_none()
            && self.country.is_none()
    }
}

/// How endpoints are consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStrategy {
    /// One endpoint at a time, in order
    #[default]
    Sequential,
    /// All endpoints at once; the first responder wins and the rest are cancelled
    Race,
}

/// Registry lookup fallback resolver
#[derive(Clone)]
pub struct WhoisResolver {
    endpoints: Vec<Arc<dyn WhoisEndpoint>>,
    endpoint_timeout: Duration,
    strategy: QueryStrategy,
    interface_prefixes: Vec<String>,
}

impl WhoisResolver {
    /// Create a resolver over the given endpoints, consulted in order
    pub fn new(endpoints: Vec<Arc<dyn WhoisEndpoint>>) -> Self {
        Self {
            endpoints,
            endpoint_timeout: DEFAULT_ENDPOINT_TIMEOUT,
            strategy: QueryStrategy::default(),
            interface_prefixes: DEFAULT_CELLULAR_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// North America, Europe and Asia-Pacific placeholder registries
    pub fn standard() -> Self {
        Self::new(
            Region::ALL
                .iter()
                .map(|region| {
                    Arc::new(StaticRangeRegistry::for_region(*region)) as Arc<dyn WhoisEndpoint>
                })
                .collect(),
        )
    }

    /// Set the per-endpoint timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint_timeout = timeout;
        self
    }

    /// Set the query strategy
    pub fn with_strategy(mut self, strategy: QueryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the interface name prefixes treated as cellular
    pub fn with_interface_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.interface_prefixes = prefixes;
        self
    }

    /// Number of configured endpoints
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn strategy(&self) -> QueryStrategy {
        self.strategy
    }

    /// Resolve carrier ownership of the device's cellular address.
    ///
    /// Returns `None` without touching the network when no cellular address
    /// is found, and `None` when every endpoint fails or the deadline passes.
    pub async fn resolve_via_network(
        &self,
        interfaces: &[NetworkInterface],
        deadline: Option<Instant>,
    ) -> Option<WhoisRecord> {
        let Some(address) = derive_cellular_ip(interfaces, &self.interface_prefixes[..]) else {
            debug!("No cellular interface address, skipping registry lookup");
            return None;
        };

        debug!(%address, strategy = ?self.strategy, "Starting registry lookup");

        let answer = match self.strategy {
            QueryStrategy::Sequential => self.query_sequential(address, deadline).await,
            QueryStrategy::Race => self.query_race(address, deadline).await,
        };

        match answer {
            Some((source, response)) => {
                let record = classify(&source, response);
                info!(
                    endpoint = %source,
                    carrier = ?record.inferred_carrier,
                    confidence = ?record.inferred_confidence,
                    "Registry lookup answered"
                );
                Some(record)
            }
            None => {
                warn!(%address, "Registry lookup exhausted all endpoints");
                None
            }
        }
    }

    async fn query_sequential(
        &self,
        address: Ipv4Addr,
        deadline: Option<Instant>,
    ) -> Option<(String, WhoisResponse)> {
        for endpoint in &self.endpoints {
            match self.query_endpoint(endpoint, address, deadline).await {
                Ok(response) => return Some((endpoint.name().to_string(), response)),
                Err(Error::Timeout) if deadline_passed(deadline) => {
                    warn!(endpoint = endpoint.name(), "Lookup deadline reached");
                    return None;
                }
                Err(_) => continue,
            }
        }
        None
    }

    async fn query_race(
        &self,
        address: Ipv4Addr,
        deadline: Option<Instant>,
    ) -> Option<(String, WhoisResponse)> {
        let mut pending: FuturesUnordered<_> = self
            .endpoints
            .iter()
            .map(|endpoint| async move {
                let result = self.query_endpoint(endpoint, address, deadline).await;
                (endpoint.name().to_string(), result)
            })
            .collect();

        while let Some((source, result)) = pending.next().await {
            if let Ok(response) = result {
                // Dropping the remaining futures cancels the losers
                return Some((source, response));
            }
        }
        None
    }

    async fn query_endpoint(
        &self,
        endpoint: &Arc<dyn WhoisEndpoint>,
        address: Ipv4Addr,
        deadline: Option<Instant>,
    ) -> Result<WhoisResponse> {
        let budget = match deadline {
            Some(deadline) => self
                .endpoint_timeout
                .min(deadline.saturating_duration_since(Instant::now())),
            None => self.endpoint_timeout,
        };

        if budget.is_zero() {
            return Err(Error::Timeout);
        }

        let start = std::time::Instant::now();
        let result = match tokio::time::timeout(budget, endpoint.query(address)).await {
            Ok(Ok(response)) if response.is_empty() => {
                Err(Error::no_record("endpoint returned no ownership fields"))
            }
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        };

        let name = endpoint.name().to_string();
        metrics::histogram!("carrierscope_whois_latency_us", "endpoint" => name.clone())
            .record(start.elapsed().as_micros() as f64);

        match &result {
            Ok(_) => {
                metrics::counter!("carrierscope_whois_queries_total", "endpoint" => name, "outcome" => "ok")
                    .increment(1);
            }
            Err(e) => {
                warn!(endpoint = %name, error = %e, "Registry endpoint failed");
                metrics::counter!("carrierscope_whois_queries_total", "endpoint" => name, "outcome" => e.kind())
                    .increment(1);
            }
        }

        result
    }
}

impl Default for WhoisResolver {
    fn default() -> Self {
        Self::standard()
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.map(|d| Instant::now() >= d).unwrap_or(false)
}

/// Classify a registry response.
///
/// Organization and network names are matched together against the
/// expanded carrier patterns. A qualified or exact brand gives high
/// confidence, a bare substring medium, no match none.
pub fn classify(source: &str, response: WhoisResponse) -> WhoisRecord {
    let text = [
        response.organization_name.as_deref(),
        response.network_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    let (inferred_carrier, inferred_confidence) = match PatternMatcher::expanded().match_name(&text) {
        Some(m) => {
            let confidence = match m.strength {
                MatchStrength::ExactBrand | MatchStrength::BrandWithQualifier => {
                    WhoisConfidence::High
                }
                MatchStrength::Partial => WhoisConfidence::Medium,
            };
            (Some(m.carrier), confidence)
        }
        None => (None, WhoisConfidence::None),
    };

    WhoisRecord {
        organization_name: response.organization_name,
        network_name: response.network_name,
        description: response.description,
        country: response.country,
        inferred_carrier,
        inferred_confidence,
        source_endpoint: source.to_string(),
    }
}
