//! Comparable keys for address containment in SQLite.
//!
//! SQLite has no CIDR type. Each prefix is stored as the first and last
//! address it covers, as big-endian octets, so `memcmp` ordering on BLOBs
//! matches numeric ordering within one address family.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;

pub(crate) const FAMILY_V4: i64 = 4;
pub(crate) const FAMILY_V6: i64 = 6;

/// Address family and octets for an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AddressKey {
    pub(crate) family: i64,
    pub(crate) octets: Vec<u8>,
}

impl AddressKey {
    pub(crate) fn of(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self {
                family: FAMILY_V4,
                octets: v4.octets().to_vec(),
            },
            IpAddr::V6(v6) => Self {
                family: FAMILY_V6,
                octets: v6.octets().to_vec(),
            },
        }
    }
}

/// First and last address covered by a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RangeKey {
    pub(crate) family: i64,
    pub(crate) start: Vec<u8>,
    pub(crate) end: Vec<u8>,
}

impl RangeKey {
    pub(crate) fn of(network: &IpNetwork) -> Self {
        let prefix = u32::from(network.prefix());
        match network.ip() {
            IpAddr::V4(v4) => {
                let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
                let start = u32::from(v4) & mask;
                Self {
                    family: FAMILY_V4,
                    start: Ipv4Addr::from(start).octets().to_vec(),
                    end: Ipv4Addr::from(start | !mask).octets().to_vec(),
                }
            }
            IpAddr::V6(v6) => {
                let mask = u128::MAX.checked_shl(128 - prefix).unwrap_or(0);
                let start = u128::from(v6) & mask;
                Self {
                    family: FAMILY_V6,
                    start: Ipv6Addr::from(start).octets().to_vec(),
                    end: Ipv6Addr::from(start | !mask).octets().to_vec(),
                }
            }
        }
    }
}
