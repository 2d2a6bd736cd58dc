// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use bolero::{Driver, TypeGenerator};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::ops::Bound;

use crate::agent::GatewayAgentSpec;
use crate::bolero::LegalValue;
use crate::bolero::support::DisjointV4Allocator;
use crate::gateway::GatewaySpec;
use crate::peering::{
    PeeringEntry, PeeringEntryAs, PeeringEntryExpose, PeeringEntryIp, PeeringNat, PeeringSpec,
    PeeringStatefulNat,
};
use crate::vpcinfo::{VpcInfoData, VpcInfoSpec, VpcInfoStatus, VpcInfoSubnet};

// This is not exhaustive as it does not generate all possible time
// strings, just 0 to 2*3600 seconds
impl TypeGenerator for LegalValue<PeeringNat> {
    fn generate<D: Driver>(d: &mut D) -> Option<Self> {
        if d.produce::<bool>()? {
            let secs = d.gen_u64(Bound::Included(&0), Bound::Included(&(2 * 3600)))?;
            let idle_timeout = (secs > 0).then(|| std::time::Duration::from_secs(secs).into());
            Some(LegalValue(PeeringNat {
                stateful: Some(PeeringStatefulNat { idle_timeout }),
                stateless: None,
            }))
        } else {
            Some(LegalValue(PeeringNat::stateless()))
        }
    }
}

fn ports<D: Driver>(d: &mut D) -> Option<Option<String>> {
    Some(d.produce::<bool>()?.then(|| "80,443,3000-3100".to_string()))
}

/// One expose block per subnet of `vpc`, exposed either by reference or by literal prefix,
/// possibly translated to a prefix taken from `nat_pool`.
fn generate_exposes<D: Driver>(
    d: &mut D,
    vpc: &VpcInfoSpec,
    nat_pool: &mut DisjointV4Allocator,
) -> Option<Vec<PeeringEntryExpose>> {
    let mut exposes = Vec::with_capacity(vpc.subnets.len() + 1);
    for (name, subnet) in &vpc.subnets {
        let ip = if d.produce::<bool>()? {
            PeeringEntryIp {
                vpc_subnet: Some(name.clone()),
                ports: ports(d)?,
                ..Default::default()
            }
        } else {
            PeeringEntryIp {
                cidr: Some(subnet.cidr.clone()),
                ports: ports(d)?,
                ..Default::default()
            }
        };
        let mut expose = PeeringEntryExpose {
            ips: vec![ip],
            ..Default::default()
        };
        if d.produce::<bool>()? {
            expose.r#as.push(PeeringEntryAs {
                cidr: Some(nat_pool.next_cidr(24)),
                ..Default::default()
            });
            if d.produce::<bool>()? {
                expose.nat = Some(d.produce::<LegalValue<PeeringNat>>()?.take());
            }
        }
        exposes.push(expose);
    }
    if d.gen_u8(Bound::Included(&0), Bound::Included(&3))? == 0 {
        exposes.push(PeeringEntryExpose {
            default_destination: true,
            ..Default::default()
        });
    }
    Some(exposes)
}

/// A legal agent spec: a legal gateway, two to six ready tenants with disjoint subnets,
/// and peerings between disjoint pairs of tenants, so that no two expose blocks overlap.
impl TypeGenerator for LegalValue<GatewayAgentSpec> {
    fn generate<D: Driver>(d: &mut D) -> Option<Self> {
        let gateway = d.produce::<LegalValue<GatewaySpec>>()?.take();
        let mut subnet_pool = DisjointV4Allocator::new(Ipv4Addr::new(10, 0, 0, 0));
        let mut nat_pool = DisjointV4Allocator::new(Ipv4Addr::new(100, 0, 0, 0));

        let num_vpcs = d.gen_u32(Bound::Included(&2), Bound::Included(&6))?;
        let mut vpcs = BTreeMap::new();
        for i in 0..num_vpcs {
            let vni = 100 * (i + 1);
            let num_subnets = d.gen_u32(Bound::Included(&1), Bound::Included(&2))?;
            let subnets = (0..num_subnets)
                .map(|j| {
                    let subnet = VpcInfoSubnet {
                        cidr: subnet_pool.next_cidr(24),
                        gateway: None,
                        vni: vni + j + 1,
                    };
                    (format!("subnet-{j}"), subnet)
                })
                .collect();
            let data = VpcInfoData {
                spec: VpcInfoSpec {
                    subnets,
                    vni,
                    vrf: None,
                },
                status: VpcInfoStatus {
                    internal_id: Some(format!("vpc-{i:04}")),
                },
            };
            vpcs.insert(format!("vpc-{i}"), data);
        }

        let names: Vec<String> = vpcs.keys().cloned().collect();
        let mut peerings = BTreeMap::new();
        for pair in names.chunks_exact(2) {
            if !d.produce::<bool>()? {
                continue;
            }
            let mut peering = BTreeMap::new();
            for vpc in pair {
                let expose = generate_exposes(d, &vpcs[vpc].spec, &mut nat_pool)?;
                peering.insert(vpc.clone(), PeeringEntry { expose });
            }
            peerings.insert(
                format!("{}--{}", pair[0], pair[1]),
                PeeringSpec {
                    gateway_group: String::new(),
                    peering,
                },
            );
        }

        Some(LegalValue(GatewayAgentSpec {
            agent_version: "v0.0.0-test".to_string(),
            gateway,
            vpcs,
            peerings,
            groups: BTreeMap::new(),
        }))
    }
}
