// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use k8s_intf::defaults::DEFAULT_GATEWAY_GROUP;
use k8s_intf::{Peering, PeeringEntryExpose, PeeringNat, PeeringSpec};
use tracing::debug;

use crate::errors::{InvalidError, ValidationResult};
use crate::selectors::{AsSelector, IpSelector, parse_ports};
use crate::siblings::SiblingLookup;
use crate::validation::Validate;
use crate::validation::overlap::{
    check_disjoint, check_disjoint_within, gateway_claims, peering_claims,
    sibling_peering_claims,
};

/// The group a peering is implemented by. Peerings not yet defaulted use the default group.
pub(crate) fn effective_group(spec: &PeeringSpec) -> &str {
    if spec.gateway_group.is_empty() {
        DEFAULT_GATEWAY_GROUP
    } else {
        &spec.gateway_group
    }
}

pub(crate) fn check_nat(nat: &PeeringNat) -> ValidationResult {
    if nat.stateful.is_some() && nat.stateless.is_some() {
        return Err(InvalidError::NotAllowed(
            "NAT cannot be both stateful and stateless".to_string(),
        ));
    }
    if let Some(stateful) = nat.stateful.as_ref()
        && stateful.has_negative_idle_timeout()
    {
        let timeout = stateful
            .idle_timeout
            .map(|t| t.to_string())
            .unwrap_or_default();
        return Err(InvalidError::Malformed(format!(
            "nat.stateful.idleTimeout must not be negative: {timeout}"
        )));
    }
    Ok(())
}

/// Field combinations and selector shapes of a single expose block
pub(crate) fn check_expose(expose: &PeeringEntryExpose) -> ValidationResult {
    if expose.default_destination {
        if !expose.ips.is_empty() || !expose.r#as.is_empty() || expose.nat.is_some() {
            return Err(InvalidError::NotAllowed(
                "a default destination cannot have ips, as or nat".to_string(),
            ));
        }
        return Ok(());
    }
    if expose.ips.is_empty() {
        return Err(InvalidError::NotAllowed(
            "expose must have at least one ip selector or be a default destination".to_string(),
        ));
    }
    for ip in &expose.ips {
        IpSelector::try_from(ip)?;
        parse_ports(ip.ports.as_ref())?;
    }
    for r#as in &expose.r#as {
        AsSelector::try_from(r#as)?;
        parse_ports(r#as.ports.as_ref())?;
    }
    if let Some(nat) = &expose.nat {
        check_nat(nat)?;
    }
    Ok(())
}

fn check_shape(name: &str, spec: &PeeringSpec) -> ValidationResult {
    if spec.peering.len() < 2 {
        return Err(InvalidError::NotAllowed(format!(
            "peering {name} must bind at least two VPCs"
        )));
    }
    for (vpc, entry) in &spec.peering {
        for (index, expose) in entry.expose.iter().enumerate() {
            check_expose(expose)
                .map_err(|e| e.within(&format!("peering {name} vpc {vpc} expose #{index}")))?;
        }
    }
    Ok(())
}

/// Address space of this peering against itself, the other peerings of its group and
/// every gateway.
fn check_overlaps(
    name: &str,
    spec: &PeeringSpec,
    siblings: &dyn SiblingLookup,
) -> ValidationResult {
    let ours = peering_claims(name, spec, Some(siblings))?;
    check_disjoint_within(&ours)?;

    let group = effective_group(spec);
    for other in siblings.peerings() {
        let other_name = other.metadata.name.as_deref().unwrap_or_default();
        if other_name == name || effective_group(&other.spec) != group {
            continue;
        }
        check_disjoint(&ours, &sibling_peering_claims(other_name, &other.spec, siblings))?;
    }
    for gateway in siblings.gateways() {
        let gateway_name = gateway.metadata.name.as_deref().unwrap_or_default();
        check_disjoint(&ours, &gateway_claims(gateway_name, &gateway.spec))?;
    }
    Ok(())
}

/// Validate a peering spec. Without siblings, subnet references, the target group and
/// overlaps are not checked.
pub fn validate_peering_spec(
    name: &str,
    spec: &PeeringSpec,
    siblings: Option<&dyn SiblingLookup>,
) -> ValidationResult {
    check_shape(name, spec)?;
    let Some(siblings) = siblings else {
        // still catch overlaps between the blocks of this peering
        return check_disjoint_within(&peering_claims(name, spec, None)?);
    };
    let group = effective_group(spec);
    if !siblings.group_exists(group) {
        return Err(InvalidError::UnknownReference(format!(
            "gateway group {group} does not exist"
        )));
    }
    check_overlaps(name, spec, siblings)
}

impl Validate for Peering {
    fn validate(&self, siblings: Option<&dyn SiblingLookup>) -> ValidationResult {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        validate_peering_spec(name, &self.spec, siblings)
            .inspect_err(|e| debug!("Rejecting peering {name}: {e}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::siblings::fake::FakeSiblings;
    use k8s_intf::defaults::Defaultable;
    use k8s_intf::{
        GatewaySpec, PeeringEntry, PeeringEntryAs, PeeringEntryIp, PeeringStatelessNat, VpcInfo,
        VpcInfoSpec, VpcInfoStatus, VpcInfoSubnet,
    };
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn cidr(cidr: &str) -> PeeringEntryIp {
        PeeringEntryIp {
            cidr: Some(cidr.to_string()),
            ..Default::default()
        }
    }

    fn as_cidr(cidr: &str) -> PeeringEntryAs {
        PeeringEntryAs {
            cidr: Some(cidr.to_string()),
            ..Default::default()
        }
    }

    fn exposing(ips: &[&str]) -> PeeringEntryExpose {
        PeeringEntryExpose {
            ips: ips.iter().map(|c| cidr(c)).collect(),
            ..Default::default()
        }
    }

    fn peering(name: &str, entries: Vec<(&str, Vec<PeeringEntryExpose>)>) -> Peering {
        let spec = PeeringSpec {
            gateway_group: String::new(),
            peering: entries
                .into_iter()
                .map(|(vpc, expose)| (vpc.to_string(), PeeringEntry { expose }))
                .collect(),
        };
        Peering::new(name, spec).defaulted()
    }

    fn generate(name: &str, f: impl FnOnce(&mut PeeringSpec)) -> Peering {
        let mut p = peering(
            name,
            vec![
                ("vpc-1", vec![exposing(&["10.0.1.0/24"])]),
                ("vpc-2", vec![exposing(&["10.0.2.0/24"])]),
            ],
        );
        f(&mut p.spec);
        p.defaulted()
    }

    fn base() -> FakeSiblings {
        let mut siblings = FakeSiblings::default().with_group("default");
        siblings.peerings.push(peering(
            "base",
            vec![
                ("vpc-1", vec![exposing(&["10.0.0.0/24"])]),
                ("vpc-45", vec![exposing(&["10.45.0.0/24"])]),
            ],
        ));
        siblings
    }

    #[test]
    fn no_nat() {
        let p = peering(
            "p",
            vec![
                ("vpc1", vec![exposing(&["10.0.1.0/24"])]),
                ("vpc2", vec![exposing(&["10.0.2.0/24"])]),
            ],
        );
        assert_eq!(p.validate(None), Ok(()));
        assert_eq!(p.spec.gateway_group, "default");
    }

    #[test]
    fn multiple_items_in_ips() {
        let mut both = cidr("10.0.1.0/24");
        both.not = Some("10.0.1.1/32".to_string());
        let p = peering(
            "p",
            vec![
                (
                    "vpc1",
                    vec![PeeringEntryExpose {
                        ips: vec![both],
                        ..Default::default()
                    }],
                ),
                ("vpc2", vec![exposing(&["10.0.2.0/24"])]),
            ],
        );
        assert!(matches!(p.validate(None), Err(InvalidError::NotAllowed(_))));
    }

    #[test]
    fn multiple_items_in_as() {
        let mut both = as_cidr("192.168.1.0/24");
        both.not = Some("192.168.1.1/32".to_string());
        let p = peering(
            "p",
            vec![
                (
                    "vpc1",
                    vec![PeeringEntryExpose {
                        ips: vec![cidr("10.0.1.0/24")],
                        r#as: vec![both],
                        ..Default::default()
                    }],
                ),
                ("vpc2", vec![exposing(&["10.0.2.0/24"])]),
            ],
        );
        assert!(matches!(p.validate(None), Err(InvalidError::NotAllowed(_))));
    }

    #[test]
    fn nat_modes() {
        let with_nat = |nat: Option<PeeringNat>| PeeringEntryExpose {
            ips: vec![cidr("10.0.1.0/24")],
            r#as: vec![as_cidr("192.168.1.0/24")],
            nat,
            default_destination: false,
        };
        let other = ("vpc2", vec![exposing(&["10.0.2.0/24"])]);

        for nat in [
            None,
            Some(PeeringNat::stateless()),
            Some(PeeringNat::stateful(Duration::from_secs(180))),
            Some(PeeringNat {
                stateful: Some(k8s_intf::PeeringStatefulNat { idle_timeout: None }),
                stateless: None,
            }),
        ] {
            let p = peering("p", vec![("vpc1", vec![with_nat(nat)]), other.clone()]);
            assert_eq!(p.validate(None), Ok(()));
        }

        let mut both = PeeringNat::stateful(Duration::from_secs(60));
        both.stateless = Some(PeeringStatelessNat {});
        let p = peering("p", vec![("vpc1", vec![with_nat(Some(both))]), other]);
        assert!(matches!(p.validate(None), Err(InvalidError::NotAllowed(_))));
    }

    #[test]
    fn negative_idle_timeout() {
        let yaml = "
apiVersion: gateway.githedgehog.com/v1alpha1
kind: Peering
metadata:
  name: vpc1--vpc2
spec:
  peering:
    vpc1:
      expose:
        - ips:
            - cidr: 10.0.1.0/24
          as:
            - cidr: 192.168.1.0/24
          nat:
            stateful:
              idleTimeout: -5m
    vpc2:
      expose:
        - ips:
            - cidr: 10.0.2.0/24
";
        let p = k8s_intf::load_crd_from_str::<Peering>(yaml)
            .unwrap()
            .defaulted();
        // defaulting leaves the value for validation to reject
        let stateful = p.spec.peering["vpc1"].expose[0].nat.as_ref().unwrap().stateful.as_ref();
        assert!(stateful.unwrap().has_negative_idle_timeout());

        let err = p.validate(None).unwrap_err();
        assert!(matches!(err, InvalidError::Malformed(_)));
        let msg = err.to_string();
        assert!(msg.contains("vpc vpc1 expose #0"), "{msg}");
        assert!(msg.contains("idleTimeout must not be negative"), "{msg}");
    }

    #[test]
    fn default_destination() {
        let cases = [
            (
                "default with nothing else",
                PeeringEntryExpose {
                    default_destination: true,
                    ..Default::default()
                },
                false,
            ),
            (
                "default with IP",
                PeeringEntryExpose {
                    ips: vec![cidr("10.0.1.0/24")],
                    default_destination: true,
                    ..Default::default()
                },
                true,
            ),
            (
                "default with As",
                PeeringEntryExpose {
                    r#as: vec![as_cidr("10.0.1.0/24")],
                    default_destination: true,
                    ..Default::default()
                },
                true,
            ),
            (
                "default with NAT",
                PeeringEntryExpose {
                    nat: Some(PeeringNat::stateless()),
                    default_destination: true,
                    ..Default::default()
                },
                true,
            ),
            ("IP with no default", exposing(&["10.0.1.0/24"]), false),
            (
                "no default and no IP",
                PeeringEntryExpose {
                    r#as: vec![as_cidr("10.0.1.0/24")],
                    ..Default::default()
                },
                true,
            ),
            ("nothing at all", PeeringEntryExpose::default(), true),
        ];
        for (name, expose, error) in cases {
            let mut spec = PeeringSpec {
                gateway_group: "default".to_string(),
                ..Default::default()
            };
            spec.peering
                .insert("vpc1".into(), PeeringEntry { expose: vec![expose] });
            spec.peering.insert(
                "vpc2".into(),
                PeeringEntry {
                    expose: vec![exposing(&["10.10.1.0/24"])],
                },
            );
            let p = Peering::new("p", spec);
            assert_eq!(p.validate(None).is_err(), error, "{name}");
        }
    }

    #[test]
    fn ports_are_checked() {
        let mut ip = cidr("10.0.1.0/24");
        ip.ports = Some("80,443,3000-3100,".to_string());
        let p = peering(
            "p",
            vec![
                (
                    "vpc1",
                    vec![PeeringEntryExpose {
                        ips: vec![ip],
                        ..Default::default()
                    }],
                ),
                ("vpc2", vec![exposing(&["10.0.2.0/24"])]),
            ],
        );
        assert!(matches!(p.validate(None), Err(InvalidError::Malformed(_))));
    }

    #[test]
    fn single_vpc_is_not_a_peering() {
        let p = peering("p", vec![("vpc1", vec![exposing(&["10.0.1.0/24"])])]);
        assert!(matches!(p.validate(None), Err(InvalidError::NotAllowed(_))));
    }

    #[test]
    fn cidr_overlap() {
        let siblings = base();

        assert_eq!(generate("no-overlap", |_| {}).validate(Some(&siblings)), Ok(()));

        let ip_clash = generate("ip-clash", |spec| {
            spec.peering.get_mut("vpc-1").unwrap().expose = vec![exposing(&["10.0.0.0/24"])];
        });
        assert!(matches!(
            ip_clash.validate(Some(&siblings)),
            Err(InvalidError::Overlap(_))
        ));

        let nat_clash = generate("nat-clash", |spec| {
            spec.peering.get_mut("vpc-1").unwrap().expose = vec![PeeringEntryExpose {
                ips: vec![cidr("10.0.50.0/25")],
                r#as: vec![as_cidr("10.0.0.0/25")],
                ..Default::default()
            }];
        });
        assert!(matches!(
            nat_clash.validate(Some(&siblings)),
            Err(InvalidError::Overlap(_))
        ));

        let use_default = generate("use-default", |spec| {
            spec.peering.get_mut("vpc-1").unwrap().expose = vec![PeeringEntryExpose {
                default_destination: true,
                ..Default::default()
            }];
        });
        assert_eq!(use_default.validate(Some(&siblings)), Ok(()));
    }

    #[test]
    fn overlap_within_a_peering() {
        let p = generate("p", |spec| {
            spec.peering.get_mut("vpc-2").unwrap().expose = vec![exposing(&["10.0.1.128/25"])];
        });
        assert!(matches!(p.validate(None), Err(InvalidError::Overlap(_))));

        // the same block may repeat itself
        let p = generate("p", |spec| {
            spec.peering.get_mut("vpc-2").unwrap().expose =
                vec![exposing(&["10.0.2.0/24", "10.0.2.0/25"])];
        });
        assert_eq!(p.validate(None), Ok(()));
    }

    #[test]
    fn other_groups_do_not_clash() {
        let mut siblings = base().with_group("blue");
        siblings.peerings[0].spec.gateway_group = "blue".to_string();
        let clash = generate("ip-clash", |spec| {
            spec.peering.get_mut("vpc-1").unwrap().expose = vec![exposing(&["10.0.0.0/24"])];
        });
        assert_eq!(clash.validate(Some(&siblings)), Ok(()));
    }

    #[test]
    fn unknown_group() {
        let p = generate("p", |spec| spec.gateway_group = "blue".to_string());
        assert!(matches!(
            p.validate(Some(&base())),
            Err(InvalidError::UnknownReference(_))
        ));
        assert_eq!(p.validate(None), Ok(()));
    }

    #[test]
    fn gateway_address_space() {
        let mut siblings = base();
        siblings.gateways.push(k8s_intf::Gateway::new(
            "gw-1",
            GatewaySpec {
                protocol_ip: "10.0.2.1/32".to_string(),
                vtep_ip: "172.30.12.1/32".to_string(),
                ..Default::default()
            },
        ));
        assert!(matches!(
            generate("p", |_| {}).validate(Some(&siblings)),
            Err(InvalidError::Overlap(_))
        ));
    }

    #[test]
    fn subnet_references() {
        let mut siblings = base();
        let mut subnets = std::collections::BTreeMap::new();
        subnets.insert(
            "subnet-1".to_string(),
            VpcInfoSubnet {
                cidr: "10.0.1.0/24".to_string(),
                gateway: None,
                vni: 101,
            },
        );
        let mut catalog = VpcInfo::new(
            "vpc-1",
            VpcInfoSpec {
                subnets,
                vni: 100,
                vrf: None,
            },
        );
        catalog.status = Some(VpcInfoStatus {
            internal_id: Some("vpc-0001".to_string()),
        });
        siblings.vpc_infos.push(catalog);
        let by_ref = |subnet: &str| {
            let subnet = subnet.to_string();
            generate("p", move |spec| {
                spec.peering.get_mut("vpc-1").unwrap().expose = vec![PeeringEntryExpose {
                    ips: vec![PeeringEntryIp {
                        vpc_subnet: Some(subnet),
                        ..Default::default()
                    }],
                    ..Default::default()
                }];
            })
        };
        assert_eq!(by_ref("subnet-1").validate(Some(&siblings)), Ok(()));
        assert!(matches!(
            by_ref("subnet-2").validate(Some(&siblings)),
            Err(InvalidError::UnknownReference(_))
        ));
        // the catalog is needed to resolve the reference
        assert_eq!(by_ref("subnet-2").validate(None), Ok(()));

        // and it must be ready
        siblings.vpc_infos[0].status = Some(VpcInfoStatus { internal_id: None });
        let err = by_ref("subnet-1").validate(Some(&siblings)).unwrap_err();
        assert!(matches!(err, InvalidError::NotReady(_)), "{err}");
        assert_eq!(err.class(), "not-ready");
    }
}
