// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Assemble the agent object of a gateway: its own spec, the catalogs of ready tenants, the
//! peerings it implements and the members of its groups.

use std::collections::BTreeMap;

use k8s_intf::{
    Gateway, GatewayAgent, GatewayAgentGroup, GatewayAgentGroupMember, GatewayAgentSpec,
    GatewaySpec, Peering, VpcInfo,
};
use tracing::{debug, info};

use crate::errors::AgentError;
use crate::validation::peering::effective_group;

/// Version stamped on every agent spec, so that upgrading the controller changes the spec
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

fn priority_in(spec: &GatewaySpec, group: &str) -> u32 {
    spec.groups
        .iter()
        .find(|g| g.name == group)
        .map_or(0, |g| g.priority)
}

/// Members of every group `gateway` belongs to, taken from `gateways`. The gateway itself is
/// always a member of its groups, listed or not.
fn build_groups(
    name: &str,
    gateway: &GatewaySpec,
    gateways: &[Gateway],
) -> BTreeMap<String, GatewayAgentGroup> {
    let others = gateways
        .iter()
        .filter_map(|gw| Some((gw.metadata.name.as_deref()?, &gw.spec)))
        .filter(|(other, _)| *other != name);
    let everyone: Vec<(&str, &GatewaySpec)> =
        std::iter::once((name, gateway)).chain(others).collect();

    gateway
        .group_names()
        .map(|group| {
            let members = everyone
                .iter()
                .filter(|(_, spec)| spec.in_group(group))
                .map(|(member, spec)| GatewayAgentGroupMember {
                    name: (*member).to_string(),
                    priority: priority_in(spec, group),
                    vtep_ip: spec.vtep_ip.clone(),
                })
                .collect();
            (group.to_string(), GatewayAgentGroup { members })
        })
        .collect()
}

/// Build the agent spec of `gateway`.
///
/// All tenant catalogs must be ready, otherwise the caller is expected to try again later.
/// Peerings of groups the gateway is not part of are left out, and so are peerings of tenants
/// with no catalog.
pub fn build_agent_spec(
    gateway: &Gateway,
    gateways: &[Gateway],
    vpc_infos: &[VpcInfo],
    peerings: &[Peering],
) -> Result<GatewayAgentSpec, AgentError> {
    let name = gateway
        .metadata
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(AgentError::MissingName)?;

    let mut vpcs = BTreeMap::new();
    for vpc in vpc_infos {
        let vpc_name = vpc.metadata.name.clone().unwrap_or_default();
        if !vpc.is_ready() {
            info!("VPCInfo {vpc_name} not ready, retrying");
            return Err(AgentError::NotReady(vpc_name));
        }
        vpcs.insert(vpc_name, vpc.data());
    }

    let mut selected = BTreeMap::new();
    for peering in peerings {
        let peering_name = peering.metadata.name.clone().unwrap_or_default();
        let group = effective_group(&peering.spec);
        if !gateway.spec.in_group(group) {
            debug!("Peering {peering_name} belongs to group {group}, skipping for gateway {name}");
            continue;
        }
        if let Some(missing) = peering.spec.peering.keys().find(|vpc| !vpcs.contains_key(*vpc)) {
            info!("Peered VPC {missing} not found, skipping peering {peering_name}");
            continue;
        }
        selected.insert(peering_name, peering.spec.clone());
    }

    debug!(
        "Agent spec for {name}: {} VPCs, {} peerings",
        vpcs.len(),
        selected.len()
    );
    Ok(GatewayAgentSpec {
        agent_version: AGENT_VERSION.to_string(),
        gateway: gateway.spec.clone(),
        vpcs,
        peerings: selected,
        groups: build_groups(name, &gateway.spec, gateways),
    })
}

/// Build the agent object of `gateway`, named and namespaced after it.
pub fn build_agent(
    gateway: &Gateway,
    gateways: &[Gateway],
    vpc_infos: &[VpcInfo],
    peerings: &[Peering],
) -> Result<GatewayAgent, AgentError> {
    let spec = build_agent_spec(gateway, gateways, vpc_infos, peerings)?;
    let name = gateway.metadata.name.as_deref().ok_or(AgentError::MissingName)?;
    let mut agent = GatewayAgent::new(name, spec);
    agent.metadata.namespace.clone_from(&gateway.metadata.namespace);
    Ok(agent)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use k8s_intf::{
        GatewayGroupMembership, PeeringEntry, PeeringEntryExpose, PeeringEntryIp, PeeringSpec,
        VpcInfoSpec, VpcInfoStatus,
    };
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn gateway(name: &str, vtep: &str, groups: &[(&str, u32)]) -> Gateway {
        let mut gw = Gateway::new(
            name,
            GatewaySpec {
                protocol_ip: "172.30.8.1/32".to_string(),
                vtep_ip: vtep.to_string(),
                ..Default::default()
            },
        );
        gw.metadata.namespace = Some("fab".to_string());
        gw.spec.groups = groups
            .iter()
            .map(|(name, priority)| GatewayGroupMembership {
                name: (*name).to_string(),
                priority: *priority,
            })
            .collect();
        gw
    }

    fn vpc_info(name: &str, ready: bool) -> VpcInfo {
        let mut vpc = VpcInfo::new(
            name,
            VpcInfoSpec {
                vni: 100,
                ..Default::default()
            },
        );
        vpc.status = Some(VpcInfoStatus {
            internal_id: ready.then(|| format!("{name}-id")),
        });
        vpc
    }

    fn peering(name: &str, group: &str, vpcs: &[&str]) -> Peering {
        let expose = PeeringEntryExpose {
            ips: vec![PeeringEntryIp {
                cidr: Some("10.0.0.0/24".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut spec = PeeringSpec {
            gateway_group: group.to_string(),
            ..Default::default()
        };
        for vpc in vpcs {
            spec.peering.insert(
                (*vpc).to_string(),
                PeeringEntry {
                    expose: vec![expose.clone()],
                },
            );
        }
        Peering::new(name, spec)
    }

    #[test]
    fn not_ready_vpc_fails() {
        let gw = gateway("gw-1", "172.30.12.1/32", &[]);
        let vpcs = [vpc_info("vpc-1", true), vpc_info("vpc-2", false)];
        assert_eq!(
            build_agent_spec(&gw, &[], &vpcs, &[]),
            Err(AgentError::NotReady("vpc-2".to_string()))
        );
    }

    #[test]
    #[traced_test]
    fn peerings_with_missing_vpcs_are_skipped() {
        let gw = gateway("gw-1", "172.30.12.1/32", &[]);
        let vpcs = [vpc_info("vpc-1", true), vpc_info("vpc-2", true)];
        let peerings = [
            peering("vpc-1--vpc-2", "", &["vpc-1", "vpc-2"]),
            peering("vpc-1--vpc-3", "", &["vpc-1", "vpc-3"]),
        ];
        let spec = build_agent_spec(&gw, &[], &vpcs, &peerings).unwrap();
        assert_eq!(spec.agent_version, AGENT_VERSION);
        assert_eq!(spec.vpcs.len(), 2);
        assert_eq!(spec.vpcs["vpc-1"].status.internal_id.as_deref(), Some("vpc-1-id"));
        let names: Vec<_> = spec.peerings.keys().collect();
        assert_eq!(names, vec!["vpc-1--vpc-2"]);
        assert!(logs_contain("Peered VPC vpc-3 not found, skipping peering vpc-1--vpc-3"));
    }

    #[test]
    fn peerings_of_other_groups_are_skipped() {
        let gw = gateway("gw-1", "172.30.12.1/32", &[("edge", 0)]);
        let vpcs = [vpc_info("vpc-1", true), vpc_info("vpc-2", true)];
        let peerings = [
            peering("default-peering", "", &["vpc-1", "vpc-2"]),
            peering("edge-peering", "edge", &["vpc-1", "vpc-2"]),
        ];
        let spec = build_agent_spec(&gw, &[], &vpcs, &peerings).unwrap();
        let names: Vec<_> = spec.peerings.keys().collect();
        assert_eq!(names, vec!["edge-peering"]);
    }

    #[test]
    fn group_members() {
        let gw1 = gateway("gw-1", "172.30.12.1/32", &[]);
        let gw2 = gateway("gw-2", "172.30.12.2/32", &[("default", 1), ("edge", 0)]);
        let gw3 = gateway("gw-3", "172.30.12.3/32", &[("edge", 0)]);
        let gateways = [gw1.clone(), gw2.clone(), gw3];

        let spec = build_agent_spec(&gw1, &gateways, &[], &[]).unwrap();
        assert_eq!(spec.groups.len(), 1);
        assert_eq!(
            spec.groups["default"].members,
            vec![
                GatewayAgentGroupMember {
                    name: "gw-1".to_string(),
                    priority: 0,
                    vtep_ip: "172.30.12.1/32".to_string(),
                },
                GatewayAgentGroupMember {
                    name: "gw-2".to_string(),
                    priority: 1,
                    vtep_ip: "172.30.12.2/32".to_string(),
                },
            ]
        );

        let spec = build_agent_spec(&gw2, &gateways, &[], &[]).unwrap();
        let groups: Vec<_> = spec.groups.keys().collect();
        assert_eq!(groups, vec!["default", "edge"]);
        let edge: Vec<_> = spec.groups["edge"].members.iter().map(|m| &m.name).collect();
        assert_eq!(edge, vec!["gw-2", "gw-3"]);
    }

    #[test]
    fn agent_object_follows_gateway() {
        let gw = gateway("gw-1", "172.30.12.1/32", &[]);
        let agent = build_agent(&gw, &[], &[], &[]).unwrap();
        assert_eq!(agent.metadata.name.as_deref(), Some("gw-1"));
        assert_eq!(agent.metadata.namespace.as_deref(), Some("fab"));
        assert_eq!(agent.spec.gateway, gw.spec);

        let unnamed = Gateway::new("", GatewaySpec::default());
        assert_eq!(
            build_agent(&unnamed, &[], &[], &[]).unwrap_err(),
            AgentError::MissingName
        );
    }
}
