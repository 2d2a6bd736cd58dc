// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The `GatewayGroup` custom resource: a named scope for gateway address uniqueness.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::defaults::Defaultable;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "gateway.githedgehog.com",
    version = "v1alpha1",
    kind = "GatewayGroup",
    plural = "gatewaygroups",
    namespaced
)]
#[kube(derive = "PartialEq")]
#[kube(derive = "Default")]
pub struct GatewayGroupSpec {}

impl Defaultable for GatewayGroup {
    fn defaulted(&self) -> Self {
        self.clone()
    }
}
