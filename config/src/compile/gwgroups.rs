// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::collections::BTreeMap;

use k8s_intf::GatewayAgentGroup;
use net::strings::parse_address_v4;
use wire::{GatewayGroup, GatewayGroupMember};

use crate::errors::CompileError;

/// Gateway groups sorted by name, members sorted by priority then name. Members are reached
/// through their tunnel address, which is always IPv4.
pub fn build_gw_groups(
    groups: &BTreeMap<String, GatewayAgentGroup>,
) -> Result<Vec<GatewayGroup>, CompileError> {
    groups
        .iter()
        .map(|(name, group)| {
            let mut members = group
                .members
                .iter()
                .map(|member| {
                    let address = parse_address_v4(&member.vtep_ip).map_err(|e| {
                        CompileError::InvalidDataplaneConfig(format!(
                            "gateway group {name} member {}: invalid VTEP IP {}: {e}",
                            member.name, member.vtep_ip
                        ))
                    })?;
                    Ok(GatewayGroupMember {
                        name: member.name.clone(),
                        priority: member.priority,
                        ipaddress: address.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, CompileError>>()?;
            members.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
            Ok(GatewayGroup {
                name: name.clone(),
                members,
            })
        })
        .collect()
}
