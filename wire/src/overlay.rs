// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpc {
    pub name: String,
    /// Fabric-assigned identifier, empty if not known
    pub id: String,
    pub vni: u32,
}

/// A resolved prefix rule. Subnet references never make it to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeeringRule {
    Cidr(String),
    Not(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringIps {
    #[serde(flatten)]
    pub rule: PeeringRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringAs {
    #[serde(flatten)]
    pub rule: PeeringRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nat {
    Stateful { idle_timeout_secs: u64 },
    Stateless,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expose {
    #[serde(default)]
    pub ips: Vec<PeeringIps>,
    #[serde(default, rename = "as")]
    pub r#as: Vec<PeeringAs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat: Option<Nat>,
    /// Traffic matching no other block of the peering goes to this tenant
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringEntryFor {
    pub vpc: String,
    pub expose: Vec<Expose>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcPeering {
    pub name: String,
    #[serde(rename = "for")]
    pub r#for: Vec<PeeringEntryFor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub vpcs: Vec<Vpc>,
    pub peerings: Vec<VpcPeering>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayGroupMember {
    pub name: String,
    pub priority: u32,
    pub ipaddress: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayGroup {
    pub name: String,
    pub members: Vec<GatewayGroupMember>,
}
