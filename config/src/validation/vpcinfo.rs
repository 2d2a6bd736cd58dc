// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use k8s_intf::{VpcInfo, VpcInfoSpec};
use net::strings::parse_address;
use net::{Prefix, Vni};

use crate::errors::{InvalidError, ValidationResult};
use crate::siblings::SiblingLookup;
use crate::validation::Validate;

/// Subnets of a tenant: IPv4, pairwise disjoint, with legal VNIs and a gateway inside the
/// subnet when one is given.
pub fn validate_vpcinfo_spec(name: &str, spec: &VpcInfoSpec) -> ValidationResult {
    Vni::new(spec.vni).map_err(|e| InvalidError::Malformed(format!("VPC {name}: {e}")))?;

    let mut prefixes: Vec<(&str, Prefix)> = Vec::with_capacity(spec.subnets.len());
    for (subnet_name, subnet) in &spec.subnets {
        let location = format!("VPC {name} subnet {subnet_name}");
        let prefix = subnet
            .cidr
            .parse::<Prefix>()
            .map_err(|e| InvalidError::Malformed(format!("{location}: {e}")))?;
        if !prefix.is_ipv4() {
            return Err(InvalidError::Malformed(format!(
                "{location}: {prefix} is not an IPv4 prefix"
            )));
        }
        Vni::new(subnet.vni).map_err(|e| InvalidError::Malformed(format!("{location}: {e}")))?;
        if let Some(gateway) = subnet.gateway.as_deref().filter(|g| !g.is_empty()) {
            let address = parse_address(gateway).map_err(|e| {
                InvalidError::Malformed(format!("{location}: gateway '{gateway}': {e}"))
            })?;
            if !prefix.covers(&Prefix::from(address)) {
                return Err(InvalidError::NotAllowed(format!(
                    "{location}: gateway {address} is outside of {prefix}"
                )));
            }
        }
        if let Some((other, _)) = prefixes.iter().find(|(_, p)| p.overlaps(&prefix)) {
            return Err(InvalidError::Overlap(format!(
                "{location}: {prefix} overlaps subnet {other}"
            )));
        }
        prefixes.push((subnet_name, prefix));
    }
    Ok(())
}

impl Validate for VpcInfo {
    fn validate(&self, _siblings: Option<&dyn SiblingLookup>) -> ValidationResult {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        validate_vpcinfo_spec(name, &self.spec)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use k8s_intf::VpcInfoSubnet;

    fn vpc(subnets: &[(&str, &str, Option<&str>, u32)]) -> VpcInfo {
        let subnets = subnets
            .iter()
            .map(|(name, cidr, gateway, vni)| {
                let subnet = VpcInfoSubnet {
                    cidr: (*cidr).to_string(),
                    gateway: gateway.map(str::to_string),
                    vni: *vni,
                };
                ((*name).to_string(), subnet)
            })
            .collect();
        VpcInfo::new(
            "vpc-1",
            VpcInfoSpec {
                subnets,
                vni: 100,
                vrf: None,
            },
        )
    }

    #[test]
    fn legal_catalog() {
        let v = vpc(&[
            ("subnet-1", "10.0.1.0/24", Some("10.0.1.1"), 101),
            ("subnet-2", "10.0.2.0/24", None, 102),
        ]);
        assert_eq!(v.validate(None), Ok(()));
    }

    #[test]
    fn rejected_catalogs() {
        let cases = [
            vpc(&[("s", "10.0.1.0/33", None, 101)]),
            vpc(&[("s", "10.0.1.1/24", None, 101)]),
            vpc(&[("s", "2001:db8::/64", None, 101)]),
            vpc(&[("s", "10.0.1.0/24", None, 0)]),
            vpc(&[("s", "10.0.1.0/24", None, 1 << 24)]),
            vpc(&[("s", "10.0.1.0/24", Some("10.0.2.1"), 101)]),
            vpc(&[("s", "10.0.1.0/24", Some("bogus"), 101)]),
            vpc(&[
                ("s1", "10.0.0.0/16", None, 101),
                ("s2", "10.0.1.0/24", None, 102),
            ]),
        ];
        for v in cases {
            assert!(v.validate(None).is_err(), "{:?}", v.spec);
        }
        let mut zero_vni = vpc(&[]);
        zero_vni.spec.vni = 0;
        assert!(zero_vni.validate(None).is_err());
    }
}
