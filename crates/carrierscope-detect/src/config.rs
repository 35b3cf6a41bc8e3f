//! Configuration for the detector and its registry fallback

use crate::whois::{
    Port43Endpoint, QueryStrategy, RdapEndpoint, Region, StaticRangeRegistry, WhoisEndpoint,
    WhoisResolver, DEFAULT_CELLULAR_PREFIXES,
};
use carrierscope_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Top-level detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Registry lookup fallback
    #[serde(default)]
    pub whois: WhoisConfig,

    /// Interface name prefixes treated as cellular links
    #[serde(default = "default_cellular_prefixes")]
    pub cellular_interface_prefixes: Vec<String>,
}

/// Registry fallback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhoisConfig {
    /// Consult registries when on-device detection is inconclusive
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Sequential (default) or racing queries
    #[serde(default)]
    pub strategy: QueryStrategy,

    /// Per-endpoint timeout
    #[serde(default = "default_endpoint_timeout_ms")]
    pub endpoint_timeout_ms: u64,

    /// Endpoints, in query order
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointSpec>,
}

/// Endpoint specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EndpointSpec {
    /// Built-in placeholder table for a region
    Static { region: Region },

    /// Plain WHOIS over TCP
    Port43 {
        host: String,
        #[serde(default = "default_whois_port")]
        port: u16,
        #[serde(default)]
        name: Option<String>,
    },

    /// RDAP over HTTPS
    Rdap { name: String, base_url: String },
}

impl EndpointSpec {
    /// Instantiate the endpoint
    pub fn build(&self) -> Result<Arc<dyn WhoisEndpoint>> {
        Ok(match self {
            Self::Static { region } => Arc::new(StaticRangeRegistry::for_region(*region)),
            Self::Port43 { host, port, name } => {
                let mut endpoint = Port43Endpoint::new(host.clone()).with_port(*port);
                if let Some(name) = name {
                    endpoint = endpoint.with_name(name.clone());
                }
                Arc::new(endpoint)
            }
            Self::Rdap { name, base_url } => Arc::new(RdapEndpoint::new(name.clone(), base_url.clone())?),
        })
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            whois: WhoisConfig::default(),
            cellular_interface_prefixes: default_cellular_prefixes(),
        }
    }
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: QueryStrategy::default(),
            endpoint_timeout_ms: default_endpoint_timeout_ms(),
            endpoints: default_endpoints(),
        }
    }
}

impl WhoisConfig {
    pub fn endpoint_timeout(&self) -> Duration {
        Duration::from_millis(self.endpoint_timeout_ms)
    }
}

impl DetectorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse detector config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject configurations that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.whois.endpoint_timeout_ms == 0 {
            return Err(Error::config("whois.endpoint_timeout_ms must be greater than zero"));
        }
        if self.whois.enabled && self.whois.endpoints.is_empty() {
            return Err(Error::config("whois is enabled but no endpoints are configured"));
        }
        Ok(())
    }
}

/// Load configuration from a file
pub fn load_config(path: impl AsRef<Path>) -> Result<DetectorConfig> {
    let path = path.as_ref();
    let config = DetectorConfig::from_file(path)?;
    info!(
        path = %path.display(),
        endpoints = config.whois.endpoints.len(),
        "Loaded detector configuration"
    );
    Ok(config)
}

/// Build the registry resolver; `None` when the fallback is disabled
pub fn build_resolver(config: &DetectorConfig) -> Result<Option<WhoisResolver>> {
    if !config.whois.enabled {
        return Ok(None);
    }

    let endpoints = config
        .whois
        .endpoints
        .iter()
        .map(EndpointSpec::build)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        WhoisResolver::new(endpoints)
            .with_timeout(config.whois.endpoint_timeout())
            .with_strategy(config.whois.strategy)
            .with_interface_prefixes(config.cellular_interface_prefixes.clone()),
    ))
}

fn default_true() -> bool {
    true
}

fn default_endpoint_timeout_ms() -> u64 {
    5_000
}

fn default_whois_port() -> u16 {
    crate::whois::port43::WHOIS_PORT
}

fn default_endpoints() -> Vec<EndpointSpec> {
    Region::ALL
        .iter()
        .map(|region| EndpointSpec::Static { region: *region })
        .collect()
}

fn default_cellular_prefixes() -> Vec<String> {
    DEFAULT_CELLULAR_PREFIXES.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert!(config.whois.enabled);
        assert_eq!(config.whois.strategy, QueryStrategy::Sequential);
        assert_eq!(config.whois.endpoints.len(), 3);
        assert_eq!(config.whois.endpoint_timeout(), Duration::from_secs(5));

        let resolver = build_resolver(&config).unwrap().unwrap();
        assert_eq!(resolver.endpoint_count(), 3);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = DetectorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, DetectorConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
whois:
  strategy: race
  endpoint_timeout_ms: 1500
  endpoints:
    - type: static
      region: north-america
    - type: port43
      host: whois.ripe.net
    - type: rdap
      name: apnic-rdap
      base_url: https://rdap.apnic.net
cellular_interface_prefixes: [pdp_ip, rmnet]
"#;
        let config = DetectorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.whois.strategy, QueryStrategy::Race);
        assert_eq!(config.whois.endpoint_timeout_ms, 1500);
        assert_eq!(
            config.whois.endpoints[1],
            EndpointSpec::Port43 {
                host: "whois.ripe.net".to_string(),
                port: 43,
                name: None,
            }
        );
        assert_eq!(config.cellular_interface_prefixes, vec!["pdp_ip", "rmnet"]);

        let resolver = build_resolver(&config).unwrap().unwrap();
        assert_eq!(resolver.endpoint_count(), 3);
        assert_eq!(resolver.strategy(), QueryStrategy::Race);
    }

    #[test]
    fn test_disabled_whois() {
        let config = DetectorConfig::from_yaml("whois:\n  enabled: false\n  endpoints: []\n").unwrap();
        assert!(build_resolver(&config).unwrap().is_none());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(DetectorConfig::from_yaml("whois:\n  endpoint_timeout_ms: 0\n").is_err());
        assert!(DetectorConfig::from_yaml("whois:\n  endpoints: []\n").is_err());
        assert!(DetectorConfig::from_yaml("whois:\n  strategy: shotgun\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "whois:\n  strategy: sequential").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.whois.strategy, QueryStrategy::Sequential);

        assert!(load_config("/nonexistent/carrierscope.yaml").is_err());
    }
}
