// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Address space claimed by peerings and gateways, and the pairwise disjointness check
//! between claims.

use k8s_intf::{GatewaySpec, PeeringEntryExpose, PeeringSpec, VpcInfo};
use net::Prefix;
use tracing::debug;

use crate::errors::{InvalidError, ValidationResult};
use crate::selectors::{AsSelector, IpSelector};
use crate::siblings::SiblingLookup;

/// Where a claim comes from. Claims from the same origin never conflict with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Origin {
    Expose {
        peering: String,
        vpc: String,
        index: usize,
    },
    Gateway(String),
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Expose {
                peering,
                vpc,
                index,
            } => write!(f, "peering {peering} vpc {vpc} expose #{index}"),
            Origin::Gateway(name) => write!(f, "gateway {name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claim {
    pub origin: Origin,
    pub prefix: Prefix,
}

/// Resolve a subnet reference through the tenant's catalog. A tenant with no catalog yet
/// contributes nothing. A catalog that is not ready, or that misses the subnet, is an error.
fn resolve_subnet(
    vpc: &str,
    subnet: &str,
    catalog: Option<&VpcInfo>,
) -> Result<Option<Prefix>, InvalidError> {
    let Some(catalog) = catalog else {
        debug!("No VPCInfo for {vpc} yet, subnet {subnet} does not claim any address");
        return Ok(None);
    };
    if !catalog.is_ready() {
        return Err(InvalidError::NotReady(format!(
            "VPCInfo {vpc} is not ready, cannot resolve subnet {subnet}"
        )));
    }
    let cidr = catalog.spec.subnets.get(subnet).ok_or_else(|| {
        InvalidError::UnknownReference(format!("subnet {subnet} does not exist in VPC {vpc}"))
    })?;
    cidr.cidr
        .parse::<Prefix>()
        .map(Some)
        .map_err(|e| InvalidError::Malformed(format!("subnet {subnet} of VPC {vpc}: {e}")))
}

/// The prefixes claimed by one expose block. Exclusions and default destinations claim
/// nothing.
pub(crate) fn expose_claims(
    vpc: &str,
    expose: &PeeringEntryExpose,
    catalog: Option<&VpcInfo>,
) -> Result<Vec<Prefix>, InvalidError> {
    if expose.default_destination {
        return Ok(vec![]);
    }
    let mut prefixes = Vec::with_capacity(expose.ips.len() + expose.r#as.len());
    for ip in &expose.ips {
        match IpSelector::try_from(ip)? {
            IpSelector::Cidr(prefix) => prefixes.push(prefix),
            IpSelector::Subnet(subnet) => {
                prefixes.extend(resolve_subnet(vpc, &subnet, catalog)?);
            }
            IpSelector::Not(_) => {}
        }
    }
    for r#as in &expose.r#as {
        if let AsSelector::Cidr(prefix) = AsSelector::try_from(r#as)? {
            prefixes.push(prefix);
        }
    }
    Ok(prefixes)
}

/// All claims of a peering.
pub(crate) fn peering_claims(
    name: &str,
    spec: &PeeringSpec,
    siblings: Option<&dyn SiblingLookup>,
) -> Result<Vec<Claim>, InvalidError> {
    let mut claims = Vec::new();
    for (vpc, entry) in &spec.peering {
        let catalog = siblings.and_then(|s| s.vpc_info(vpc));
        for (index, expose) in entry.expose.iter().enumerate() {
            let origin = Origin::Expose {
                peering: name.to_string(),
                vpc: vpc.clone(),
                index,
            };
            let prefixes =
                expose_claims(vpc, expose, catalog).map_err(|e| e.within(&origin.to_string()))?;
            claims.extend(prefixes.into_iter().map(|prefix| Claim {
                origin: origin.clone(),
                prefix,
            }));
        }
    }
    Ok(claims)
}

/// Claims of objects already admitted. Those that no longer resolve are skipped.
pub(crate) fn sibling_peering_claims(
    name: &str,
    spec: &PeeringSpec,
    siblings: &dyn SiblingLookup,
) -> Vec<Claim> {
    peering_claims(name, spec, Some(siblings)).unwrap_or_else(|e| {
        debug!("Ignoring address space of peering {name}: {e}");
        vec![]
    })
}

/// Protocol, tunnel and interface addresses of a gateway. Interface addresses claim their
/// whole subnet.
pub(crate) fn gateway_claims(name: &str, spec: &GatewaySpec) -> Vec<Claim> {
    let addresses = [spec.protocol_ip.as_str(), spec.vtep_ip.as_str()]
        .into_iter()
        .chain(
            spec.interfaces
                .values()
                .flat_map(|iface| iface.ips.iter().map(String::as_str)),
        );
    addresses
        .filter_map(|address| match Prefix::parse_host(address) {
            Ok(prefix) => Some(Claim {
                origin: Origin::Gateway(name.to_string()),
                prefix: prefix.network(),
            }),
            Err(e) => {
                debug!("Ignoring address of gateway {name}: {e}");
                None
            }
        })
        .collect()
}

fn conflict(ours: &Claim, theirs: &Claim) -> InvalidError {
    InvalidError::Overlap(format!(
        "{} prefix {} overlaps {} prefix {}",
        ours.origin, ours.prefix, theirs.origin, theirs.prefix
    ))
}

/// Check that claims of distinct origins within `ours` are disjoint.
pub(crate) fn check_disjoint_within(ours: &[Claim]) -> ValidationResult {
    for (i, left) in ours.iter().enumerate() {
        for right in &ours[i + 1..] {
            if left.origin != right.origin && left.prefix.overlaps(&right.prefix) {
                return Err(conflict(left, right));
            }
        }
    }
    Ok(())
}

/// Check that no claim of `ours` overlaps a claim of `theirs`.
pub(crate) fn check_disjoint(ours: &[Claim], theirs: &[Claim]) -> ValidationResult {
    for left in ours {
        if let Some(right) = theirs.iter().find(|r| left.prefix.overlaps(&r.prefix)) {
            return Err(conflict(left, right));
        }
    }
    Ok(())
}
