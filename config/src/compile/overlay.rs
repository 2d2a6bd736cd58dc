// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tenants and peerings of the overlay. Subnet references are resolved against the tenant's
//! catalog, so that the dataplane only ever sees literal prefixes.

use std::collections::BTreeMap;

use k8s_intf::defaults::DEFAULT_STATEFUL_IDLE_TIMEOUT;
use k8s_intf::{
    GatewayAgentSpec, PeeringEntryAs, PeeringEntryExpose, PeeringEntryIp, PeeringSpec,
    VpcInfoData, VpcInfoSpec,
};
use wire::{
    Expose, Nat, Overlay, PeeringAs, PeeringEntryFor, PeeringIps, PeeringRule, Vpc, VpcPeering,
};

use crate::errors::{CompileError, InvalidError};
use crate::selectors::{AsSelector, IpSelector, parse_ports};
use crate::validation::peering::check_nat;

/// Pass a port list through once it is known to be well formed
fn ports(ports: Option<&String>) -> Result<Option<String>, InvalidError> {
    Ok(if parse_ports(ports)?.is_empty() {
        None
    } else {
        ports.cloned()
    })
}

fn resolve_ip(
    ip: &PeeringEntryIp,
    catalog: Option<&VpcInfoSpec>,
) -> Result<PeeringIps, InvalidError> {
    let rule = match IpSelector::try_from(ip)? {
        IpSelector::Cidr(prefix) => PeeringRule::Cidr(prefix.to_string()),
        IpSelector::Not(prefix) => PeeringRule::Not(prefix.to_string()),
        IpSelector::Subnet(subnet) => {
            let cidr = catalog
                .and_then(|c| c.subnets.get(&subnet))
                .ok_or_else(|| {
                    InvalidError::UnknownReference(format!("VPC subnet {subnet} not found"))
                })?;
            PeeringRule::Cidr(cidr.cidr.clone())
        }
    };
    Ok(PeeringIps {
        rule,
        ports: ports(ip.ports.as_ref())?,
    })
}

fn resolve_as(r#as: &PeeringEntryAs) -> Result<PeeringAs, InvalidError> {
    let rule = match AsSelector::try_from(r#as)? {
        AsSelector::Cidr(prefix) => PeeringRule::Cidr(prefix.to_string()),
        AsSelector::Not(prefix) => PeeringRule::Not(prefix.to_string()),
    };
    Ok(PeeringAs {
        rule,
        ports: ports(r#as.ports.as_ref())?,
    })
}

/// NAT mode of an expose block. Only blocks translating their addresses get one, stateless
/// unless stateful translation is asked for.
pub(crate) fn resolve_nat(expose: &PeeringEntryExpose) -> Result<Option<Nat>, InvalidError> {
    if let Some(nat) = &expose.nat {
        check_nat(nat)?;
    }
    if expose.r#as.is_empty() {
        return Ok(None);
    }
    let nat = match expose.nat.as_ref().and_then(|nat| nat.stateful.as_ref()) {
        Some(stateful) => Nat::Stateful {
            idle_timeout_secs: stateful
                .configured_idle_timeout()
                .unwrap_or(DEFAULT_STATEFUL_IDLE_TIMEOUT)
                .as_secs(),
        },
        None => Nat::Stateless,
    };
    Ok(Some(nat))
}

pub(crate) fn build_expose(
    expose: &PeeringEntryExpose,
    catalog: Option<&VpcInfoSpec>,
) -> Result<Expose, InvalidError> {
    if expose.default_destination {
        if !expose.ips.is_empty() || !expose.r#as.is_empty() || expose.nat.is_some() {
            return Err(InvalidError::NotAllowed(
                "default destination expose cannot have ips, as or nat".to_string(),
            ));
        }
        return Ok(Expose {
            default: true,
            ..Default::default()
        });
    }
    if expose.ips.is_empty() {
        return Err(InvalidError::NotAllowed(
            "expose must have at least one ip".to_string(),
        ));
    }
    Ok(Expose {
        ips: expose
            .ips
            .iter()
            .map(|ip| resolve_ip(ip, catalog))
            .collect::<Result<_, _>>()?,
        r#as: expose.r#as.iter().map(resolve_as).collect::<Result<_, _>>()?,
        nat: resolve_nat(expose)?,
        default: false,
    })
}

/// Tenant descriptors sorted by name
#[must_use]
pub fn build_vpcs(vpcs: &BTreeMap<String, VpcInfoData>) -> Vec<Vpc> {
    vpcs.iter()
        .map(|(name, data)| Vpc {
            name: name.clone(),
            id: data.status.internal_id.clone().unwrap_or_default(),
            vni: data.spec.vni,
        })
        .collect()
}

pub fn build_peering(
    name: &str,
    peering: &PeeringSpec,
    vpcs: &BTreeMap<String, VpcInfoData>,
) -> Result<VpcPeering, CompileError> {
    let mut entries = Vec::with_capacity(peering.peering.len());
    for (vpc, entry) in &peering.peering {
        let catalog = vpcs.get(vpc).map(|data| &data.spec);
        let expose = entry
            .expose
            .iter()
            .enumerate()
            .map(|(index, expose)| {
                build_expose(expose, catalog).map_err(|e| {
                    CompileError::from(e.within(&format!(
                        "peering {name} vpc {vpc} expose #{index}"
                    )))
                })
            })
            .collect::<Result<_, _>>()?;
        entries.push(PeeringEntryFor {
            vpc: vpc.clone(),
            expose,
        });
    }
    Ok(VpcPeering {
        name: name.to_string(),
        r#for: entries,
    })
}

/// The overlay of an agent spec. Maps keyed by name keep tenants, peerings and the entries of
/// each peering sorted.
pub fn build_overlay(spec: &GatewayAgentSpec) -> Result<Overlay, CompileError> {
    Ok(Overlay {
        vpcs: build_vpcs(&spec.vpcs),
        peerings: spec
            .peerings
            .iter()
            .map(|(name, peering)| build_peering(name, peering, &spec.vpcs))
            .collect::<Result<_, _>>()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use k8s_intf::{
        Peering, PeeringEntry, PeeringNat, PeeringStatefulNat, VpcInfoStatus, VpcInfoSubnet,
    };
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ip_cidr(cidr: &str) -> PeeringEntryIp {
        PeeringEntryIp {
            cidr: Some(cidr.to_string()),
            ..Default::default()
        }
    }

    fn translated(nat: Option<PeeringNat>) -> PeeringEntryExpose {
        PeeringEntryExpose {
            ips: vec![ip_cidr("10.0.1.0/24")],
            r#as: vec![PeeringEntryAs {
                cidr: Some("192.168.1.0/24".to_string()),
                ..Default::default()
            }],
            nat,
            ..Default::default()
        }
    }

    fn catalog() -> VpcInfoSpec {
        let mut spec = VpcInfoSpec {
            vni: 100,
            ..Default::default()
        };
        spec.subnets.insert(
            "subnet-1".to_string(),
            VpcInfoSubnet {
                cidr: "10.0.1.0/24".to_string(),
                gateway: None,
                vni: 101,
            },
        );
        spec
    }

    #[test]
    fn as_without_nat_is_stateless() {
        let expose = build_expose(&translated(None), None).unwrap();
        assert_eq!(expose.nat, Some(Nat::Stateless));
        let expose = build_expose(&translated(Some(PeeringNat::stateless())), None).unwrap();
        assert_eq!(expose.nat, Some(Nat::Stateless));
    }

    #[test]
    fn stateful_idle_timeout() {
        let nat = PeeringNat::stateful(Duration::from_secs(5 * 60));
        let expose = build_expose(&translated(Some(nat)), None).unwrap();
        assert_eq!(
            expose.nat,
            Some(Nat::Stateful {
                idle_timeout_secs: 300
            })
        );

        // zero timeout gets the default
        let nat = PeeringNat {
            stateful: Some(PeeringStatefulNat { idle_timeout: None }),
            stateless: None,
        };
        let expose = build_expose(&translated(Some(nat)), None).unwrap();
        assert_eq!(
            expose.nat,
            Some(Nat::Stateful {
                idle_timeout_secs: DEFAULT_STATEFUL_IDLE_TIMEOUT.as_secs()
            })
        );
    }

    #[test]
    fn no_as_no_nat() {
        let mut expose = translated(Some(PeeringNat::stateful(Duration::from_secs(60))));
        expose.r#as.clear();
        assert_eq!(build_expose(&expose, None).unwrap().nat, None);
    }

    #[test]
    fn both_nat_modes_fail() {
        let mut nat = PeeringNat::stateful(Duration::from_secs(60));
        nat.stateless = PeeringNat::stateless().stateless;
        assert!(matches!(
            build_expose(&translated(Some(nat.clone())), None),
            Err(InvalidError::NotAllowed(_))
        ));
        // even without any translated prefix
        let mut expose = translated(Some(nat));
        expose.r#as.clear();
        assert!(build_expose(&expose, None).is_err());
    }

    #[test]
    fn subnet_references() {
        let expose = PeeringEntryExpose {
            ips: vec![PeeringEntryIp {
                vpc_subnet: Some("subnet-1".to_string()),
                ports: Some("80,443".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let compiled = build_expose(&expose, Some(&catalog())).unwrap();
        assert_eq!(
            compiled.ips,
            vec![PeeringIps {
                rule: PeeringRule::Cidr("10.0.1.0/24".to_string()),
                ports: Some("80,443".to_string()),
            }]
        );

        let mut unknown = expose.clone();
        unknown.ips[0].vpc_subnet = Some("subnet-2".to_string());
        assert!(matches!(
            build_expose(&unknown, Some(&catalog())),
            Err(InvalidError::UnknownReference(_))
        ));
        assert!(build_expose(&expose, None).is_err());
    }

    #[test]
    fn default_destination() {
        let expose = PeeringEntryExpose {
            default_destination: true,
            ..Default::default()
        };
        let compiled = build_expose(&expose, None).unwrap();
        assert!(compiled.default);
        assert!(compiled.ips.is_empty());

        let mut with_ips = expose.clone();
        with_ips.ips.push(ip_cidr("10.0.1.0/24"));
        assert!(build_expose(&with_ips, None).is_err());

        let mut with_nat = expose;
        with_nat.nat = Some(PeeringNat::stateless());
        assert!(build_expose(&with_nat, None).is_err());
    }

    #[test]
    fn empty_expose_fails() {
        assert!(matches!(
            build_expose(&PeeringEntryExpose::default(), None),
            Err(InvalidError::NotAllowed(_))
        ));
    }

    #[test]
    fn peering_errors_name_the_block() {
        let mut peering = PeeringSpec::default();
        peering.peering.insert(
            "vpc-1".to_string(),
            PeeringEntry {
                expose: vec![PeeringEntryExpose::default()],
            },
        );
        let err = build_peering("vpc-1--vpc-2", &peering, &BTreeMap::new()).unwrap_err();
        let CompileError::InvalidDataplaneConfig(msg) = err;
        assert!(msg.contains("peering vpc-1--vpc-2 vpc vpc-1 expose #0"), "{msg}");
    }

    #[test]
    fn negative_idle_timeout_fails() {
        let negative: Peering = k8s_intf::load_crd_from_str(
            "
apiVersion: gateway.githedgehog.com/v1alpha1
kind: Peering
metadata:
  name: vpc-1--vpc-2
spec:
  peering:
    vpc-1:
      expose:
        - ips:
            - cidr: 10.0.1.0/24
          as:
            - cidr: 192.168.1.0/24
          nat:
            stateful:
              idleTimeout: -5m
",
        )
        .unwrap();
        let expose = &negative.spec.peering["vpc-1"].expose[0];
        assert!(matches!(
            build_expose(expose, None),
            Err(InvalidError::Malformed(_))
        ));
        let err = build_peering("vpc-1--vpc-2", &negative.spec, &BTreeMap::new()).unwrap_err();
        let CompileError::InvalidDataplaneConfig(msg) = err;
        assert!(msg.contains("idleTimeout"), "{msg}");
    }

    #[test]
    fn vpcs_carry_internal_id() {
        let mut vpcs = BTreeMap::new();
        vpcs.insert(
            "vpc-2".to_string(),
            VpcInfoData {
                spec: catalog(),
                status: VpcInfoStatus::default(),
            },
        );
        vpcs.insert(
            "vpc-1".to_string(),
            VpcInfoData {
                spec: catalog(),
                status: VpcInfoStatus {
                    internal_id: Some("vpc-0001".to_string()),
                },
            },
        );
        let compiled = build_vpcs(&vpcs);
        assert_eq!(compiled[0].name, "vpc-1");
        assert_eq!(compiled[0].id, "vpc-0001");
        assert_eq!(compiled[1].id, "");
    }
}
