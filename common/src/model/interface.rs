use std::fmt;
use std::net::IpAddr;

use anyhow::Context;
use pnet::util::MacAddr;

/// Vendor prefix assigned to Mellanox InfiniBand hardware.
const INFINIBAND_MAC_PREFIX: [u8; 3] = [0x00, 0x02, 0xc9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    Ethernet,
    Infiniband,
}

impl InterfaceType {
    /// Derives the interface type from the MAC vendor prefix.
    pub fn from_mac(mac: MacAddr) -> Self {
        if [mac.0, mac.1, mac.2] == INFINIBAND_MAC_PREFIX {
            InterfaceType::Infiniband
        } else {
            InterfaceType::Ethernet
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceType::Ethernet => write!(f, "ethernet"),
            InterfaceType::Infiniband => write!(f, "infiniband"),
        }
    }
}

/// A single network interface on a [`Node`](crate::model::Node).
///
/// The MAC address is the unique hardware identifier and is kept in its
/// canonical colon-separated form by [`MacAddr`]. The IP address is optional
/// since a discovered interface may not have one assigned yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkInterface {
    pub mac_address: MacAddr,
    pub ip_address: Option<IpAddr>,
    pub is_active: bool,
    pub interface_type: InterfaceType,
}

impl NetworkInterface {
    /// Builds an interface, deriving its type from the MAC vendor prefix.
    pub fn new(mac_address: MacAddr, ip_address: Option<IpAddr>) -> Self {
        Self {
            mac_address,
            ip_address,
            is_active: true,
            interface_type: InterfaceType::from_mac(mac_address),
        }
    }

    /// Parses an interface out of textual scanner output.
    ///
    /// Fails on a malformed MAC or IP rather than constructing a bad record.
    pub fn parse(mac: &str, ip: Option<&str>) -> anyhow::Result<Self> {
        let mac_address: MacAddr = mac
            .parse()
            .ok()
            .with_context(|| format!("invalid MAC address: '{mac}'"))?;
        let ip_address = ip
            .map(|raw| {
                raw.parse::<IpAddr>()
                    .with_context(|| format!("invalid IP address: '{raw}'"))
            })
            .transpose()?;
        Ok(Self::new(mac_address, ip_address))
    }
}
