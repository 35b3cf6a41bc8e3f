//! Placeholder regional registries
//!
//! A coarse static table of IPv4 allocations per region, standing in for a
//! real registry query. It answers only for addresses inside a listed range;
//! anything else is reported as "no record" so the resolver moves on to the
//! next region. Swap in [`super::Port43Endpoint`] or [`super::RdapEndpoint`]
//! for live data.

use super::{WhoisEndpoint, WhoisResponse};
use async_trait::async_trait;
use carrierscope_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// IPv4 CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Range {
    network: u32,
    prefix_len: u8,
}

impl Ipv4Range {
    /// Create a range; host bits of `network` are cleared
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(Error::config(format!("invalid prefix length /{}", prefix_len)));
        }
        let mask = Self::mask(prefix_len);
        Ok(Self {
            network: u32::from(network) & mask,
            prefix_len,
        })
    }

    /// Whether the address falls inside the block
    pub fn contains(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & Self::mask(self.prefix_len) == self.network
    }

    fn mask(prefix_len: u8) -> u32 {
        if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_len))
        }
    }
}

impl FromStr for Ipv4Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, len) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| Error::config(format!("'{}' is not in CIDR notation", s)))?;
        let network = addr
            .parse::<Ipv4Addr>()
            .map_err(|e| Error::config(format!("invalid network '{}': {}", addr, e)))?;
        let prefix_len = len
            .parse::<u8>()
            .map_err(|e| Error::config(format!("invalid prefix '{}': {}", len, e)))?;
        Self::new(network, prefix_len)
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.network), self.prefix_len)
    }
}

/// One allocation in the static table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEntry {
    pub range: Ipv4Range,
    pub organization: String,
    pub network_name: String,
    pub country: String,
}

/// Regional internet registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    NorthAmerica,
    Europe,
    AsiaPacific,
}

impl Region {
    /// Default query order
    pub const ALL: [Region; 3] = [Region::NorthAmerica, Region::Europe, Region::AsiaPacific];

    /// Registry server for the region
    pub fn endpoint_name(&self) -> &'static str {
        match self {
            Self::NorthAmerica => "whois.arin.net",
            Self::Europe => "whois.ripe.net",
            Self::AsiaPacific => "whois.apnic.net",
        }
    }

    /// (CIDR, organization, network name, country)
    fn allocations(&self) -> &'static [(&'static str, &'static str, &'static str, &'static str)] {
        match self {
            Self::NorthAmerica => &[
                ("174.192.0.0/10", "Cellco Partnership DBA Verizon Wireless", "WIRELESSDATANETWORK", "US"),
                ("97.128.0.0/9", "Cellco Partnership DBA Verizon Wireless", "WIRELESSDATANETWORK", "US"),
                ("166.128.0.0/9", "AT&T Mobility LLC", "ATT-MOBILITY-LLC", "US"),
                ("107.64.0.0/10", "AT&T Mobility LLC", "ATT-MOBILITY-LLC", "US"),
                ("12.0.0.0/8", "AT&T Services, Inc.", "ATT", "US"),
                ("172.32.0.0/11", "T-Mobile USA, Inc.", "TMO-NET", "US"),
                ("208.54.0.0/16", "T-Mobile USA, Inc.", "TMO-NET", "US"),
                ("68.24.0.0/13", "Sprint Nextel Corporation", "SPRINTLINK", "US"),
                ("75.104.0.0/16", "United States Cellular Corporation", "USCC-NET", "US"),
            ],
            Self::Europe => &[
                ("80.187.0.0/16", "Deutsche Telekom AG", "DTAG-MOBILE", "DE"),
                ("82.132.0.0/16", "Vodafone Limited", "VODAFONE-UK", "GB"),
            ],
            Self::AsiaPacific => &[
                ("49.96.0.0/12", "NTT DOCOMO, INC.", "DOCOMO-NET", "JP"),
                ("1.72.0.0/13", "NTT DOCOMO, INC.", "DOCOMO-NET", "JP"),
            ],
        }
    }
}

/// Placeholder registry answering from a static range table
#[derive(Debug, Clone)]
pub struct StaticRangeRegistry {
    name: String,
    entries: Vec<RangeEntry>,
}

impl StaticRangeRegistry {
    /// Create an empty registry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Registry preloaded with the built-in table for a region
    pub fn for_region(region: Region) -> Self {
        let entries = region
            .allocations()
            .iter()
            .filter_map(|(cidr, org, net, country)| {
                cidr.parse().ok().map(|range| RangeEntry {
                    range,
                    organization: org.to_string(),
                    network_name: net.to_string(),
                    country: country.to_string(),
                })
            })
            .collect();

        Self {
            name: region.endpoint_name().to_string(),
            entries,
        }
    }

    /// Add an allocation
    pub fn with_entry(mut self, entry: RangeEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Number of allocations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl WhoisEndpoint for StaticRangeRegistry {
    async fn query(&self, address: Ipv4Addr) -> Result<WhoisResponse> {
        self.entries
            .iter()
            .find(|entry| entry.range.contains(address))
            .map(|entry| WhoisResponse {
                organization_name: Some(entry.organization.clone()),
                network_name: Some(entry.network_name.clone()),
                description: Some(format!("{} ({})", entry.range, self.name)),
                country: Some(entry.country.clone()),
            })
            .ok_or_else(|| Error::no_record(format!("{} has no allocation for {}", self.name, address)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
