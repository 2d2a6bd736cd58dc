// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Read-only access to the other intent objects known to the caller.

use k8s_intf::{Gateway, GatewayGroup, Peering, VpcInfo};

/// Lists all objects of a kind visible in the caller's scope.
///
/// Implementations are read-only snapshots. Validation never writes through them, and
/// when none is available only self-contained checks run.
pub trait SiblingLookup {
    fn gateways(&self) -> &[Gateway];
    fn gateway_groups(&self) -> &[GatewayGroup];
    fn peerings(&self) -> &[Peering];
    fn vpc_infos(&self) -> &[VpcInfo];

    /// Tell if a gateway group exists. The default group always does.
    fn group_exists(&self, name: &str) -> bool {
        name == k8s_intf::defaults::DEFAULT_GATEWAY_GROUP
            || self
                .gateway_groups()
                .iter()
                .any(|g| g.metadata.name.as_deref() == Some(name))
    }

    fn vpc_info(&self, name: &str) -> Option<&VpcInfo> {
        self.vpc_infos()
            .iter()
            .find(|v| v.metadata.name.as_deref() == Some(name))
    }
}
