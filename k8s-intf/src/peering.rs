// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The `Peering` custom resource: which addresses tenants share with each other, and how
//! they are translated.

use kube::CustomResource;
use kube_core::duration::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::defaults::{
    DEFAULT_GATEWAY_GROUP, DEFAULT_STATEFUL_IDLE_TIMEOUT, Defaultable, LABEL_VALUE_TRUE,
    LABEL_VPC_PREFIX, list_label_vpc,
};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "gateway.githedgehog.com",
    version = "v1alpha1",
    kind = "Peering",
    plural = "peerings",
    namespaced
)]
#[kube(derive = "PartialEq")]
#[kube(derive = "Default")]
#[serde(default)]
pub struct PeeringSpec {
    /// Gateway group that implements this peering
    #[serde(rename = "gatewayGroup", skip_serializing_if = "String::is_empty")]
    pub gateway_group: String,
    /// Per-tenant entries keyed by tenant (VPC) name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub peering: BTreeMap<String, PeeringEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct PeeringEntry {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expose: Vec<PeeringEntryExpose>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct PeeringEntryExpose {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<PeeringEntryIp>,
    #[serde(rename = "as", skip_serializing_if = "Vec::is_empty")]
    pub r#as: Vec<PeeringEntryAs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat: Option<PeeringNat>,
    /// Send traffic matching no other expose block to this tenant
    #[serde(rename = "defaultDestination", skip_serializing_if = "std::ops::Not::not")]
    pub default_destination: bool,
}

/// An address selector. Exactly one of `cidr`, `not` and `vpc_subnet` must be set.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct PeeringEntryIp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<String>,
    #[serde(rename = "vpcSubnet", skip_serializing_if = "Option::is_none")]
    pub vpc_subnet: Option<String>,
    /// Optional port list refining the selector, e.g. `80,443,3000-3100`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

/// A translated-address selector. Exactly one of `cidr` and `not` must be set.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct PeeringEntryAs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

/// NAT mode. `stateful` and `stateless` are mutually exclusive.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct PeeringNat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateful: Option<PeeringStatefulNat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateless: Option<PeeringStatelessNat>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct PeeringStatefulNat {
    #[serde(rename = "idleTimeout", skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<Duration>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct PeeringStatelessNat {}

impl PeeringNat {
    #[must_use]
    pub fn stateless() -> Self {
        Self {
            stateful: None,
            stateless: Some(PeeringStatelessNat {}),
        }
    }

    #[must_use]
    pub fn stateful(idle_timeout: std::time::Duration) -> Self {
        Self {
            stateful: Some(PeeringStatefulNat {
                idle_timeout: Some(Duration::from(idle_timeout)),
            }),
            stateless: None,
        }
    }
}

impl PeeringStatefulNat {
    /// Tell if the idle timeout is set to a negative duration, which is never legal
    #[must_use]
    pub fn has_negative_idle_timeout(&self) -> bool {
        self.idle_timeout.is_some_and(|t| t.is_negative())
    }

    /// The magnitude of the configured idle timeout, if any. Zero counts as not configured.
    #[must_use]
    pub fn configured_idle_timeout(&self) -> Option<std::time::Duration> {
        self.idle_timeout
            .map(std::time::Duration::from)
            .filter(|t| !t.is_zero())
    }
}

impl Defaultable for PeeringEntryExpose {
    fn defaulted(&self) -> Self {
        let mut expose = self.clone();
        if !expose.r#as.is_empty() && expose.nat.is_none() {
            trace!("Expose block with translated prefixes and no NAT mode, using stateless NAT");
            expose.nat = Some(PeeringNat::stateless());
        }
        if let Some(stateful) = expose.nat.as_mut().and_then(|nat| nat.stateful.as_mut())
            && stateful.configured_idle_timeout().is_none()
        {
            stateful.idle_timeout = Some(Duration::from(DEFAULT_STATEFUL_IDLE_TIMEOUT));
        }
        expose
    }
}

impl Defaultable for PeeringSpec {
    fn defaulted(&self) -> Self {
        let gateway_group = if self.gateway_group.is_empty() && !self.peering.is_empty() {
            DEFAULT_GATEWAY_GROUP.to_owned()
        } else {
            self.gateway_group.clone()
        };
        let peering = self
            .peering
            .iter()
            .map(|(vpc, entry)| {
                let expose = entry.expose.iter().map(Defaultable::defaulted).collect();
                (vpc.clone(), PeeringEntry { expose })
            })
            .collect();
        PeeringSpec {
            gateway_group,
            peering,
        }
    }
}

impl Defaultable for Peering {
    /// Populate one selection label per tenant, replacing labels left by tenants that are no
    /// longer part of the peering. Other labels are preserved.
    fn defaulted(&self) -> Self {
        let mut metadata = self.metadata.clone();
        let mut labels = metadata.labels.take().unwrap_or_default();
        labels.retain(|key, _| !key.starts_with(LABEL_VPC_PREFIX));
        for vpc in self.spec.peering.keys() {
            labels.insert(list_label_vpc(vpc), LABEL_VALUE_TRUE.to_owned());
        }
        metadata.labels = Some(labels);
        Peering {
            metadata,
            spec: self.spec.defaulted(),
        }
    }
}

impl Peering {
    /// Tell if the peering involves tenant `vpc`
    #[must_use]
    pub fn references_vpc(&self, vpc: &str) -> bool {
        self.spec.peering.contains_key(vpc)
    }
}
