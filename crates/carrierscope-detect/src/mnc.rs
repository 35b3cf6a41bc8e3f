//! Mobile network code table
//!
//! Codes are matched exactly after trimming. Several codes resolve to the
//! same carrier: MVNO allocations and networks absorbed by another carrier
//! (Sprint, MetroPCS, Cingular, Alltel) resolve to the successor.

use carrierscope_core::Carrier;

/// (MNC, carrier) pairs, US allocations
const MNC_TABLE: &[(&str, Carrier)] = &[
    // Verizon (including the former Alltel ranges)
    ("004", Carrier::Verizon),
    ("010", Carrier::Verizon),
    ("012", Carrier::Verizon),
    ("013", Carrier::Verizon),
    ("480", Carrier::Verizon),
    ("481", Carrier::Verizon),
    ("482", Carrier::Verizon),
    ("483", Carrier::Verizon),
    ("484", Carrier::Verizon),
    ("485", Carrier::Verizon),
    ("486", Carrier::Verizon),
    ("487", Carrier::Verizon),
    ("488", Carrier::Verizon),
    ("489", Carrier::Verizon),
    ("590", Carrier::Verizon),
    ("890", Carrier::Verizon),
    // AT&T (including the former Cingular ranges)
    ("030", Carrier::Att),
    ("070", Carrier::Att),
    ("090", Carrier::Att),
    ("150", Carrier::Att),
    ("170", Carrier::Att),
    ("280", Carrier::Att),
    ("380", Carrier::Att),
    ("410", Carrier::Att),
    ("560", Carrier::Att),
    ("680", Carrier::Att),
    ("980", Carrier::Att),
    // T-Mobile (including the former Sprint and MetroPCS ranges)
    ("120", Carrier::TMobile),
    ("160", Carrier::TMobile),
    ("200", Carrier::TMobile),
    ("210", Carrier::TMobile),
    ("220", Carrier::TMobile),
    ("230", Carrier::TMobile),
    ("240", Carrier::TMobile),
    ("250", Carrier::TMobile),
    ("260", Carrier::TMobile),
    ("270", Carrier::TMobile),
    ("310", Carrier::TMobile),
    ("490", Carrier::TMobile),
    ("530", Carrier::TMobile),
    ("660", Carrier::TMobile),
    ("800", Carrier::TMobile),
    ("830", Carrier::TMobile),
    // US Cellular
    ("066", Carrier::UsCellular),
    ("580", Carrier::UsCellular),
    ("581", Carrier::UsCellular),
    ("582", Carrier::UsCellular),
    ("583", Carrier::UsCellular),
    ("584", Carrier::UsCellular),
    ("585", Carrier::UsCellular),
    ("586", Carrier::UsCellular),
    ("587", Carrier::UsCellular),
    ("588", Carrier::UsCellular),
];

/// Look up the carrier for a mobile network code
pub fn lookup(mnc: &str) -> Option<Carrier> {
    let mnc = mnc.trim();
    MNC_TABLE
        .iter()
        .find(|(code, _)| *code == mnc)
        .map(|(_, carrier)| *carrier)
}

/// All codes known for a carrier, in table order
pub fn codes_for(carrier: Carrier) -> impl Iterator<Item = &'static str> {
    MNC_TABLE
        .iter()
        .filter(move |(_, c)| *c == carrier)
        .map(|(code, _)| *code)
}
