//! CLI configuration loading

use carrierscope_detect::DetectorConfig;
use std::path::Path;

impl crate::Cli {
    /// Load detector configuration from file and apply CLI overrides.
    ///
    /// A missing file at the default path falls back to built-in defaults; an
    /// explicitly named file must exist.
    pub fn load_config(&self) -> anyhow::Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?,
            None if Path::new(crate::DEFAULT_CONFIG_PATH).exists() => {
                DetectorConfig::from_file(crate::DEFAULT_CONFIG_PATH)?
            }
            None => DetectorConfig::default(),
        };

        // Apply CLI overrides
        if self.no_whois {
            config.whois.enabled = false;
        }

        if let Some(strategy) = self.strategy {
            config.whois.strategy = strategy.into();
        }

        if let Some(timeout_ms) = self.endpoint_timeout_ms {
            config.whois.endpoint_timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }
}
