//! Evidence collection from raw telephony snapshots

use carrierscope_core::ProviderRecord;
use serde::{Deserialize, Serialize};

pub use carrierscope_core::is_sentinel;

/// Provider record as reported by the telephony subsystem, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProviderRecord {
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub carrier_name: Option<String>,
    #[serde(default)]
    pub mobile_country_code: Option<String>,
    #[serde(default)]
    pub mobile_network_code: Option<String>,
    #[serde(default)]
    pub allows_voip: Option<bool>,
    #[serde(default)]
    pub radio_technology: Option<String>,
}

impl RawProviderRecord {
    /// Create a raw record keyed by slot
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: Some(service_id.into()),
            ..Self::default()
        }
    }

    /// Set the carrier name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.carrier_name = Some(name.into());
        self
    }

    /// Set the MCC/MNC pair
    pub fn codes(mut self, mcc: impl Into<String>, mnc: impl Into<String>) -> Self {
        self.mobile_country_code = Some(mcc.into());
        self.mobile_network_code = Some(mnc.into());
        self
    }

    /// Set the VoIP capability flag
    pub fn voip(mut self, allows_voip: bool) -> Self {
        self.allows_voip = Some(allows_voip);
        self
    }

    /// Set the radio access technology hint
    pub fn radio_technology(mut self, rat: impl Into<String>) -> Self {
        self.radio_technology = Some(rat.into());
        self
    }
}

/// Normalize raw slot records into an ordered evidence set.
///
/// Trims every string and fills missing slot keys with the slot index. Nothing
/// is filtered: sentinel records are kept so later stages can recognize them.
pub fn collect(raw: &[RawProviderRecord]) -> Vec<ProviderRecord> {
    raw.iter()
        .enumerate()
        .map(|(index, slot)| ProviderRecord {
            service_id: slot
                .service_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| index.to_string()),
            carrier_name: trimmed(&slot.carrier_name),
            mobile_country_code: trimmed(&slot.mobile_country_code),
            mobile_network_code: trimmed(&slot.mobile_network_code),
            allows_voip: slot.allows_voip.unwrap_or(false),
            radio_technology: trimmed(&slot.radio_technology),
        })
        .collect()
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_string())
}

/// True when every record is sentinel-invalid (vacuously true for no records)
pub fn all_sentinel_invalid(evidence: &[ProviderRecord]) -> bool {
    evidence.iter().all(ProviderRecord::is_sentinel_invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_trims_and_coalesces() {
        let raw = vec![
            RawProviderRecord::new(" slot-a ")
                .name("  Verizon  ")
                .codes(" 310", "004 "),
            RawProviderRecord::default(),
        ];

        let evidence = collect(&raw);
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[0].service_id, "slot-a");
        assert_eq!(evidence[0].carrier_name.as_deref(), Some("Verizon"));
        assert_eq!(evidence[0].mobile_country_code.as_deref(), Some("310"));
        assert_eq!(evidence[0].mobile_network_code.as_deref(), Some("004"));
        assert!(!evidence[0].allows_voip);

        assert_eq!(evidence[1].service_id, "1");
        assert_eq!(evidence[1].carrier_name, None);
    }

    #[test]
    fn test_collect_keeps_sentinels() {
        let raw = vec![RawProviderRecord::new("0").name("--").codes("65535", "65535")];
        let evidence = collect(&raw);

        assert_eq!(evidence.len(), 1);
        assert!(evidence[0].is_sentinel_invalid());
        assert!(all_sentinel_invalid(&evidence));
    }

    #[test]
    fn test_collect_empty() {
        assert!(collect(&[]).is_empty());
        assert!(all_sentinel_invalid(&[]));
    }
}
