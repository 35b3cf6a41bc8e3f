//! Device collaborators
//!
//! The detector never talks to the platform directly. Telephony records,
//! connectivity and interface enumeration are supplied through these traits.

use crate::evidence::RawProviderRecord;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Source of per-SIM-slot provider records
pub trait TelephonyProvider: Send + Sync {
    /// Snapshot of every slot the telephony subsystem reports
    fn provider_records(&self) -> Vec<RawProviderRecord>;
}

/// Connectivity collaborator
pub trait Reachability: Send + Sync {
    /// Whether the device currently routes over Wi-Fi
    fn is_on_wifi(&self) -> bool;
}

/// Local network interface enumeration
pub trait InterfaceSource: Send + Sync {
    fn interfaces(&self) -> Vec<NetworkInterface>;
}

/// One address bound to a local interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name (e.g. "pdp_ip0", "rmnet_data0", "en0")
    pub name: String,
    pub address: IpAddr,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, address: IpAddr) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

/// Static device state, for tests and offline replay of captured snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    #[serde(default)]
    pub providers: Vec<RawProviderRecord>,

    #[serde(default)]
    pub on_wifi: bool,

    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,
}

impl DeviceSnapshot {
    pub fn new(providers: Vec<RawProviderRecord>) -> Self {
        Self {
            providers,
            ..Self::default()
        }
    }

    pub fn on_wifi(mut self, on_wifi: bool) -> Self {
        self.on_wifi = on_wifi;
        self
    }

    pub fn with_interface(mut self, interface: NetworkInterface) -> Self {
        self.interfaces.push(interface);
        self
    }
}

impl TelephonyProvider for DeviceSnapshot {
    fn provider_records(&self) -> Vec<RawProviderRecord> {
        self.providers.clone()
    }
}

impl Reachability for DeviceSnapshot {
    fn is_on_wifi(&self) -> bool {
        self.on_wifi
    }
}

impl InterfaceSource for DeviceSnapshot {
    fn interfaces(&self) -> Vec<NetworkInterface> {
        self.interfaces.clone()
    }
}

impl Reachability for bool {
    fn is_on_wifi(&self) -> bool {
        *self
    }
}
