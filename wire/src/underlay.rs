// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IfType {
    Ethernet,
    Vlan,
    Loopback,
    Vtep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IfRole {
    Fabric,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub ipaddrs: Vec<String>,
    #[serde(rename = "type")]
    pub iftype: IfType,
    pub role: IfRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macaddr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
}

/// BGP address families a neighbor can be activated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BgpAf {
    Ipv4Unicast,
    Ipv6Unicast,
    L2vpnEvpn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSource {
    Interface(String),
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpNeighbor {
    pub address: String,
    pub remote_asn: String,
    pub af_activate: Vec<BgpAf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_source: Option<UpdateSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Unicast {
    pub networks: Vec<String>,
    pub redistribute_connected: bool,
    pub redistribute_static: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2VpnEvpn {
    pub advertise_all_vni: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub asn: String,
    pub router_id: String,
    pub neighbors: Vec<BgpNeighbor>,
    pub ipv4_unicast: Ipv4Unicast,
    pub l2vpn_evpn: L2VpnEvpn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrf {
    pub name: String,
    pub interfaces: Vec<Interface>,
    pub router: RouterConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Underlay {
    pub vrfs: Vec<Vrf>,
}
