// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The `VPCInfo` custom resource: the subnet catalog of one tenant.
//! It is produced by the fabric once the tenant network is provisioned and is read-only here.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::defaults::Defaultable;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "gateway.githedgehog.com",
    version = "v1alpha1",
    kind = "VPCInfo",
    root = "VpcInfo",
    plural = "vpcinfoes",
    status = "VpcInfoStatus",
    namespaced
)]
#[kube(derive = "PartialEq")]
#[kube(derive = "Default")]
#[serde(default)]
pub struct VpcInfoSpec {
    /// Subnets keyed by subnet name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub subnets: BTreeMap<String, VpcInfoSubnet>,
    pub vni: u32,
    /// Optional VRF name. A predictable name is generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vrf: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct VpcInfoSubnet {
    pub cidr: String,
    /// Explicit gateway address. The first address of the subnet is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    pub vni: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(default)]
pub struct VpcInfoStatus {
    /// Fabric-wide identifier, assigned when the tenant network is ready
    #[serde(rename = "internalID", skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
}

impl VpcInfoStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.internal_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// A `VPCInfo` as embedded in the `GatewayAgent`: its spec and status, flattened.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct VpcInfoData {
    #[serde(flatten)]
    pub spec: VpcInfoSpec,
    #[serde(flatten)]
    pub status: VpcInfoStatus,
}

impl VpcInfo {
    /// A `VPCInfo` may only be used once the fabric has provisioned the tenant network.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status.as_ref().is_some_and(VpcInfoStatus::is_ready)
    }

    /// Snapshot spec and status for embedding into an agent spec
    #[must_use]
    pub fn data(&self) -> VpcInfoData {
        VpcInfoData {
            spec: self.spec.clone(),
            status: self.status.clone().unwrap_or_default(),
        }
    }
}

impl Defaultable for VpcInfo {
    fn defaulted(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::utils::load_crd_from_str;
    use pretty_assertions::assert_eq;

    #[test]
    fn readiness() {
        let mut vpc = VpcInfo::new("vpc-1", VpcInfoSpec::default());
        assert!(!vpc.is_ready());
        vpc.status = Some(VpcInfoStatus {
            internal_id: Some(String::new()),
        });
        assert!(!vpc.is_ready());
        vpc.status = Some(VpcInfoStatus {
            internal_id: Some("vpc-0001".to_string()),
        });
        assert!(vpc.is_ready());
    }

    #[test]
    fn embedded_data_is_flat() {
        let yaml = "
vni: 100
subnets:
  subnet-1:
    cidr: 10.0.1.0/24
    vni: 101
internalID: vpc-0001
";
        let data: VpcInfoData = load_crd_from_str(yaml).unwrap();
        assert_eq!(data.spec.vni, 100);
        assert_eq!(data.spec.subnets["subnet-1"].cidr, "10.0.1.0/24");
        assert_eq!(data.status.internal_id.as_deref(), Some("vpc-0001"));
        assert!(data.status.is_ready());
    }
}
