//! SIM lock and dual-SIM posture
//!
//! There is no reliable on-device indicator of SIM lock state. The resolver
//! therefore leans toward "unlocked": any usable evidence or a second slot
//! counts for it, and with nothing to go on it still reports unlocked at
//! medium confidence.

use carrierscope_core::{Confidence, ProviderRecord, SimStatus};
use std::collections::BTreeSet;

/// Posture reported when no slot says anything
pub const UNLOCKED_BY_DEFAULT: bool = true;

/// Resolve SIM posture from normalized evidence
pub fn resolve(evidence: &[ProviderRecord]) -> SimStatus {
    let slot_count = evidence.len();
    let usable_slots = evidence.iter().filter(|r| r.has_usable_evidence()).count();

    let carrier_labels: BTreeSet<String> = evidence
        .iter()
        .filter_map(ProviderRecord::usable_name)
        .map(str::to_string)
        .collect();

    let has_usable = usable_slots > 0;
    // Multi-slot capability counts as unlock evidence
    let is_unlocked = if has_usable || slot_count > 1 {
        true
    } else {
        UNLOCKED_BY_DEFAULT
    };

    SimStatus {
        is_unlocked,
        is_dual_sim: usable_slots >= 2,
        slot_count,
        carrier_labels,
        confidence: if has_usable {
            Confidence::High
        } else {
            Confidence::Medium
        },
    }
}
