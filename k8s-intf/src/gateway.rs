// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The `Gateway` custom resource: the routing identity of one gateway instance.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::defaults::{DEFAULT_GATEWAY_GROUP, DEFAULT_LOG_LEVEL, Defaultable};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "gateway.githedgehog.com",
    version = "v1alpha1",
    kind = "Gateway",
    plural = "gateways",
    shortname = "gw",
    namespaced
)]
#[kube(derive = "PartialEq")]
#[kube(derive = "Default")]
#[serde(default)]
pub struct GatewaySpec {
    /// Router/protocol address, a /32 host prefix
    #[serde(rename = "protocolIP")]
    pub protocol_ip: String,
    /// VXLAN tunnel endpoint address, a /32 host prefix
    #[serde(rename = "vtepIP")]
    pub vtep_ip: String,
    #[serde(rename = "vtepMAC")]
    pub vtep_mac: String,
    #[serde(rename = "vtepMTU")]
    pub vtep_mtu: u32,
    pub asn: u32,
    /// Interfaces keyed by name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, GatewayInterface>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub neighbors: Vec<GatewayBgpNeighbor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<u8>,
    pub logs: GatewayLogs,
    /// Gateway groups this gateway is a member of
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GatewayGroupMembership>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct GatewayInterface {
    /// Name of the underlying kernel device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,
    pub mtu: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct GatewayBgpNeighbor {
    /// Name of the local interface sessions are sourced from
    pub source: String,
    pub ip: String,
    pub asn: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct GatewayLogs {
    /// One of off, error, warning, info, debug, trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct GatewayGroupMembership {
    pub name: String,
    pub priority: u32,
}

impl GatewaySpec {
    /// Names of the groups this gateway belongs to. A gateway with no explicit
    /// membership belongs to the default group.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        let implicit = self.groups.is_empty().then_some(DEFAULT_GATEWAY_GROUP);
        self.groups.iter().map(|g| g.name.as_str()).chain(implicit)
    }

    /// Tell if this gateway is a member of group `name`
    #[must_use]
    pub fn in_group(&self, name: &str) -> bool {
        self.group_names().any(|g| g == name)
    }
}

impl Defaultable for GatewaySpec {
    fn defaulted(&self) -> Self {
        let mut spec = self.clone();
        if spec.groups.is_empty() {
            spec.groups.push(GatewayGroupMembership {
                name: DEFAULT_GATEWAY_GROUP.to_owned(),
                priority: 0,
            });
        }
        spec.groups.sort_by(|a, b| a.name.cmp(&b.name));
        if spec.logs.default.as_deref().is_none_or(str::is_empty) {
            spec.logs.default = Some(DEFAULT_LOG_LEVEL.to_owned());
        }
        spec
    }
}

impl Defaultable for Gateway {
    fn defaulted(&self) -> Self {
        Gateway {
            metadata: self.metadata.clone(),
            spec: self.spec.defaulted(),
        }
    }
}
