// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The configuration message handed to the dataplane process.
//!
//! Every list in a [`GatewayConfig`] is expected to be sorted, so that two messages built from
//! the same intent compare equal and serialize to the same bytes.

#![deny(clippy::all, clippy::pedantic)]

pub mod device;
pub mod overlay;
pub mod underlay;

use serde::{Deserialize, Serialize};

pub use device::{Device, LogLevel, PacketDriver, TracingConfig};
pub use overlay::{
    Expose, GatewayGroup, GatewayGroupMember, Nat, Overlay, PeeringAs, PeeringEntryFor,
    PeeringIps, PeeringRule, Vpc, VpcPeering,
};
pub use underlay::{
    BgpAf, BgpNeighbor, IfRole, IfType, Interface, Ipv4Unicast, L2VpnEvpn, RouterConfig,
    Underlay, UpdateSource, Vrf,
};

/// The whole configuration of one gateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Generation of the intent this message was built from
    pub generation: i64,
    pub device: Device,
    pub underlay: Underlay,
    pub overlay: Overlay,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gw_groups: Vec<GatewayGroup>,
}
