// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The `GatewayAgent` custom resource: everything one gateway needs to build its dataplane
//! configuration, assembled from the gateway, the ready tenant catalogs and the peerings.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gateway::GatewaySpec;
use crate::peering::PeeringSpec;
use crate::vpcinfo::VpcInfoData;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "gwint.githedgehog.com",
    version = "v1alpha1",
    kind = "GatewayAgent",
    plural = "gatewayagents",
    shortname = "gwag",
    status = "GatewayAgentStatus",
    namespaced
)]
#[kube(derive = "PartialEq")]
#[kube(derive = "Default")]
#[serde(default)]
pub struct GatewayAgentSpec {
    /// Version of the agent, to trigger generation changes on controller upgrades
    #[serde(rename = "agentVersion", skip_serializing_if = "String::is_empty")]
    pub agent_version: String,
    pub gateway: GatewaySpec,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vpcs: BTreeMap<String, VpcInfoData>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub peerings: BTreeMap<String, PeeringSpec>,
    /// Members of each gateway group, keyed by group name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, GatewayAgentGroup>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct GatewayAgentGroup {
    pub members: Vec<GatewayAgentGroupMember>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct GatewayAgentGroupMember {
    pub name: String,
    pub priority: u32,
    #[serde(rename = "vtepIP")]
    pub vtep_ip: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct GatewayAgentStatus {
    #[serde(rename = "agentVersion", skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<String>,
    /// Generation of the last successfully applied configuration
    #[serde(rename = "lastAppliedGen", skip_serializing_if = "Option::is_none")]
    pub last_applied_gen: Option<i64>,
}
