//! Built-in detection stages, in pipeline order
//!
//! 1. [`MncCodeStage`] - network code table, high confidence
//! 2. [`CarrierNameStage`] - first usable name against brand patterns
//! 3. [`RadioTechnologyStage`] - diagnostic only, always passes
//! 4. [`PartialNameStage`] - every usable name against legacy/MVNO patterns
//! 5. [`WifiCallingInterferenceStage`] - all evidence masked while on Wi-Fi

use crate::evidence::all_sentinel_invalid;
use crate::mnc;
use crate::patterns::PatternMatcher;
use crate::stage::{DetectionStage, StageContext, StageMatch, StageOutcome};
use carrierscope_core::{Carrier, Confidence, DetectionMethod, WIFI_CALLING_LABEL};
use tracing::debug;

/// Resolves the carrier from the mobile network code table
#[derive(Debug, Default, Clone, Copy)]
pub struct MncCodeStage;

impl DetectionStage for MncCodeStage {
    fn evaluate(&self, ctx: &StageContext<'_>) -> StageOutcome {
        let mut unmapped = Vec::new();

        for record in ctx.evidence {
            let Some(code) = record.usable_mnc() else {
                continue;
            };

            match mnc::lookup(code) {
                Some(carrier) => {
                    let label = record
                        .usable_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("MNC {}", code));
                    return StageOutcome::Matched(StageMatch::new(
                        carrier,
                        Confidence::High,
                        label,
                        format!("MNC {} in slot {} maps to {}", code, record.service_id, carrier),
                    ));
                }
                None => unmapped.push(code),
            }
        }

        if unmapped.is_empty() {
            StageOutcome::passed("no usable MNC in evidence")
        } else {
            StageOutcome::passed(format!("MNC {} not in table", unmapped.join(", ")))
        }
    }

    fn name(&self) -> &str {
        "mnc_code"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::MncCode
    }
}

/// Matches the first usable carrier name against the brand patterns
#[derive(Clone, Copy)]
pub struct CarrierNameStage {
    matcher: &'static PatternMatcher,
}

impl CarrierNameStage {
    pub fn new() -> Self {
        Self {
            matcher: PatternMatcher::primary(),
        }
    }
}

impl Default for CarrierNameStage {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStage for CarrierNameStage {
    fn evaluate(&self, ctx: &StageContext<'_>) -> StageOutcome {
        let Some(name) = ctx.usable_names().next() else {
            return StageOutcome::passed("no usable carrier name");
        };

        // Any brand match counts the same here; qualifier strength only
        // matters for registry classification.
        match self.matcher.match_name(name) {
            Some(m) => StageOutcome::Matched(StageMatch::new(
                m.carrier,
                Confidence::Medium,
                name,
                format!("name '{}' matched pattern '{}'", name, m.pattern),
            )),
            None => StageOutcome::passed(format!("name '{}' matched no brand pattern", name)),
        }
    }

    fn name(&self) -> &str {
        "carrier_name"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::CarrierName
    }
}

/// Inspects radio access technology hints.
///
/// Technology does not identify a carrier, so this stage never resolves
/// anything. It stays in the pipeline to record what the radio reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct RadioTechnologyStage;

impl DetectionStage for RadioTechnologyStage {
    fn evaluate(&self, ctx: &StageContext<'_>) -> StageOutcome {
        let hints: Vec<String> = ctx
            .evidence
            .iter()
            .filter_map(|r| {
                r.radio_technology
                    .as_deref()
                    .filter(|rat| !rat.is_empty())
                    .map(|rat| format!("{}={}", r.service_id, rat))
            })
            .collect();

        if hints.is_empty() {
            StageOutcome::passed("no radio technology hints")
        } else {
            debug!(hints = %hints.join(", "), "Radio technology observed");
            StageOutcome::passed(format!("observed {} (not used for classification)", hints.join(", ")))
        }
    }

    fn name(&self) -> &str {
        "radio_technology"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::RadioTechnology
    }
}

/// Aggressive substring match of every usable name, including legacy and
/// merged brands
#[derive(Clone, Copy)]
pub struct PartialNameStage {
    matcher: &'static PatternMatcher,
}

impl PartialNameStage {
    pub fn new() -> Self {
        Self {
            matcher: PatternMatcher::expanded(),
        }
    }
}

impl Default for PartialNameStage {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStage for PartialNameStage {
    fn evaluate(&self, ctx: &StageContext<'_>) -> StageOutcome {
        let mut tried = 0;

        for name in ctx.usable_names() {
            tried += 1;
            if let Some(m) = self.matcher.match_name(name) {
                return StageOutcome::Matched(StageMatch::new(
                    m.carrier,
                    Confidence::Medium,
                    name,
                    format!("name '{}' partially matched '{}'", name, m.pattern),
                ));
            }
        }

        if tried == 0 {
            StageOutcome::passed("no usable carrier name")
        } else {
            StageOutcome::passed(format!("{} name(s) matched no known or legacy brand", tried))
        }
    }

    fn name(&self) -> &str {
        "partial_name"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::PartialName
    }
}

/// Recognizes evidence masked by Wi-Fi calling.
///
/// The carrier is a placeholder; callers should rely on the label.
#[derive(Debug, Default, Clone, Copy)]
pub struct WifiCallingInterferenceStage;

impl DetectionStage for WifiCallingInterferenceStage {
    fn evaluate(&self, ctx: &StageContext<'_>) -> StageOutcome {
        if !all_sentinel_invalid(ctx.evidence) {
            return StageOutcome::passed("evidence is not masked");
        }
        if !ctx.is_on_wifi {
            return StageOutcome::passed("evidence is masked but device is not on Wi-Fi");
        }

        StageOutcome::Matched(StageMatch::new(
            Carrier::Unknown,
            Confidence::Low,
            WIFI_CALLING_LABEL,
            format!(
                "all {} record(s) carry sentinel values while on Wi-Fi",
                ctx.evidence.len()
            ),
        ))
    }

    fn name(&self) -> &str {
        "wifi_calling_interference"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::WifiCallingInterference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrierscope_core::ProviderRecord;

    fn masked() -> ProviderRecord {
        ProviderRecord::new("0").with_name("--").with_codes("65535", "65535")
    }

    #[test]
    fn test_mnc_stage_first_hit() {
        let evidence = vec![
            ProviderRecord::new("0").with_codes("310", "999"),
            ProviderRecord::new("1").with_name("Visible").with_codes("311", "480"),
        ];
        let outcome = MncCodeStage.evaluate(&StageContext::new(&evidence, false));

        let StageOutcome::Matched(m) = outcome else {
            panic!("expected match");
        };
        assert_eq!(m.carrier, Carrier::Verizon);
        assert_eq!(m.confidence, Confidence::High);
        assert_eq!(m.detected_label, "Visible");
    }

    #[test]
    fn test_mnc_stage_label_without_name() {
        let evidence = vec![ProviderRecord::new("0").with_codes("310", "260")];
        let StageOutcome::Matched(m) = MncCodeStage.evaluate(&StageContext::new(&evidence, false))
        else {
            panic!("expected match");
        };
        assert_eq!(m.detected_label, "MNC 260");
    }

    #[test]
    fn test_mnc_stage_passes_on_sentinels() {
        let evidence = vec![masked()];
        let outcome = MncCodeStage.evaluate(&StageContext::new(&evidence, false));
        assert_eq!(outcome, StageOutcome::passed("no usable MNC in evidence"));
    }

    #[test]
    fn test_carrier_name_uses_first_usable_name_only() {
        let evidence = vec![
            masked(),
            ProviderRecord::new("1").with_name("Regional Co"),
            ProviderRecord::new("2").with_name("Verizon"),
        ];
        let outcome = CarrierNameStage::new().evaluate(&StageContext::new(&evidence, false));
        assert!(!outcome.is_match());
    }

    #[test]
    fn test_carrier_name_medium_confidence() {
        let evidence = vec![ProviderRecord::new("0").with_name("Verizon Wireless")];
        let StageOutcome::Matched(m) =
            CarrierNameStage::new().evaluate(&StageContext::new(&evidence, false))
        else {
            panic!("expected match");
        };
        // Qualified brand names are not promoted at this stage
        assert_eq!(m.confidence, Confidence::Medium);
        assert_eq!(m.detected_label, "Verizon Wireless");
    }

    #[test]
    fn test_radio_technology_never_matches() {
        let evidence = vec![
            ProviderRecord::new("0").with_name("Verizon").with_radio_technology("NR"),
        ];
        let outcome = RadioTechnologyStage.evaluate(&StageContext::new(&evidence, true));

        match outcome {
            StageOutcome::Passed(reason) => assert!(reason.contains("0=NR")),
            StageOutcome::Matched(_) => panic!("radio technology must not classify"),
        }
    }

    #[test]
    fn test_partial_name_scans_all_names() {
        let evidence = vec![
            ProviderRecord::new("0").with_name("Regional Co"),
            ProviderRecord::new("1").with_name("Sprint PCS"),
        ];
        let StageOutcome::Matched(m) =
            PartialNameStage::new().evaluate(&StageContext::new(&evidence, false))
        else {
            panic!("expected match");
        };
        assert_eq!(m.carrier, Carrier::TMobile);
        assert_eq!(m.detected_label, "Sprint PCS");
    }

    #[test]
    fn test_wifi_interference_requires_wifi() {
        let evidence = vec![masked()];
        let stage = WifiCallingInterferenceStage;

        assert!(!stage.evaluate(&StageContext::new(&evidence, false)).is_match());

        let StageOutcome::Matched(m) = stage.evaluate(&StageContext::new(&evidence, true)) else {
            panic!("expected interference");
        };
        assert_eq!(m.detected_label, WIFI_CALLING_LABEL);
        assert_eq!(m.carrier, Carrier::Unknown);
        assert_eq!(m.confidence, Confidence::Low);
    }

    #[test]
    fn test_wifi_interference_ignores_real_evidence() {
        let evidence = vec![masked(), ProviderRecord::new("1").with_name("Regional Co")];
        assert!(!WifiCallingInterferenceStage
            .evaluate(&StageContext::new(&evidence, true))
            .is_match());
    }
}
