// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Intent objects for the gateway control plane: the custom resources users write
//! (gateways, gateway groups, peerings), the tenant info resolved by the fabric and the
//! per-gateway agent resource, together with their defaulting rules.

#![deny(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod defaults;
pub mod gateway;
pub mod gwgroup;
pub mod peering;
pub mod utils;
pub mod vpcinfo;

#[cfg(any(test, feature = "bolero"))]
pub mod bolero;

pub use agent::{
    GatewayAgent, GatewayAgentGroup, GatewayAgentGroupMember, GatewayAgentSpec,
    GatewayAgentStatus,
};
pub use defaults::Defaultable;
pub use gateway::{
    Gateway, GatewayBgpNeighbor, GatewayGroupMembership, GatewayInterface, GatewayLogs,
    GatewaySpec,
};
pub use gwgroup::{GatewayGroup, GatewayGroupSpec};
pub use peering::{
    Peering, PeeringEntry, PeeringEntryAs, PeeringEntryExpose, PeeringEntryIp, PeeringNat,
    PeeringSpec, PeeringStatefulNat, PeeringStatelessNat,
};
pub use utils::{LoadError, load_crd_from_file, load_crd_from_str};
pub use vpcinfo::{VpcInfo, VpcInfoData, VpcInfoSpec, VpcInfoStatus, VpcInfoSubnet};
