//! Cellular address derivation from local interfaces

use crate::device::NetworkInterface;
use std::net::{IpAddr, Ipv4Addr};

/// Interface name prefixes used for cellular data links
/// (iOS `pdp_ip*`, Qualcomm `rmnet*`, MediaTek `ccmni*`, generic `wwan*`,
/// 464XLAT `v4-rmnet*`)
pub const DEFAULT_CELLULAR_PREFIXES: &[&str] = &["pdp_ip", "rmnet", "ccmni", "wwan", "v4-rmnet"];

/// Pick the first IPv4 address bound to an interface that looks cellular.
///
/// Loopback, unspecified and link-local addresses are skipped.
pub fn derive_cellular_ip<S: AsRef<str>>(
    interfaces: &[NetworkInterface],
    prefixes: &[S],
) -> Option<Ipv4Addr> {
    interfaces
        .iter()
        .filter(|iface| {
            prefixes
                .iter()
                .any(|prefix| iface.name.starts_with(prefix.as_ref()))
        })
        .find_map(|iface| match iface.address {
            IpAddr::V4(v4) if is_routable(v4) => Some(v4),
            _ => None,
        })
}

fn is_routable(address: Ipv4Addr) -> bool {
    !(address.is_loopback() || address.is_unspecified() || address.is_link_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn iface(name: &str, address: IpAddr) -> NetworkInterface {
        NetworkInterface::new(name, address)
    }

    #[test]
    fn test_picks_cellular_ipv4() {
        let interfaces = vec![
            iface("lo0", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            iface("en0", IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20))),
            iface("pdp_ip0", IpAddr::V6(Ipv6Addr::LOCALHOST)),
            iface("pdp_ip0", IpAddr::V4(Ipv4Addr::new(12, 34, 56, 78))),
        ];

        assert_eq!(
            derive_cellular_ip(&interfaces, DEFAULT_CELLULAR_PREFIXES),
            Some(Ipv4Addr::new(12, 34, 56, 78))
        );
    }

    #[test]
    fn test_android_interface_names() {
        let interfaces = vec![iface("rmnet_data0", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)))];
        assert!(derive_cellular_ip(&interfaces, DEFAULT_CELLULAR_PREFIXES).is_some());
    }

    #[test]
    fn test_skips_link_local_and_wifi() {
        let interfaces = vec![
            iface("pdp_ip1", IpAddr::V4(Ipv4Addr::new(169, 254, 3, 4))),
            iface("en0", IpAddr::V4(Ipv4Addr::new(12, 34, 56, 78))),
        ];
        assert_eq!(derive_cellular_ip(&interfaces, DEFAULT_CELLULAR_PREFIXES), None);
    }

    #[test]
    fn test_custom_prefixes() {
        let interfaces = vec![iface("usb0", IpAddr::V4(Ipv4Addr::new(10, 1, 1, 1)))];
        assert_eq!(derive_cellular_ip(&interfaces, DEFAULT_CELLULAR_PREFIXES), None);
        assert!(derive_cellular_ip(&interfaces, &["usb".to_string()][..]).is_some());
    }
}
