// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::collections::BTreeSet;
use std::net::IpAddr;

use k8s_intf::{Gateway, GatewayLogs, GatewaySpec};
use net::{Asn, Mac, Prefix};
use tracing::debug;

use crate::compile::{IF_LOOPBACK, IF_VTEP};
use crate::errors::{InvalidError, ValidationResult};
use crate::siblings::SiblingLookup;
use crate::validation::Validate;
use crate::validation::overlap::{check_disjoint, gateway_claims, sibling_peering_claims};

/// Parse a protocol or tunnel address: an IPv4 /32 outside of the loopback range
pub(crate) fn host_address(field: &str, value: &str) -> Result<Prefix, InvalidError> {
    let prefix = Prefix::parse_host(value)
        .map_err(|e| InvalidError::Malformed(format!("{field}: {e}")))?;
    if !prefix.is_ipv4() {
        return Err(InvalidError::Malformed(format!(
            "{field}: {value} is not an IPv4 prefix"
        )));
    }
    if !prefix.is_host() {
        return Err(InvalidError::Malformed(format!(
            "{field}: {value} is not a /32 prefix"
        )));
    }
    if prefix.is_loopback() {
        return Err(InvalidError::NotAllowed(format!(
            "{field}: {value} is a loopback address"
        )));
    }
    Ok(prefix)
}

fn check_vtep_mac(value: &str) -> ValidationResult {
    let mac = value
        .parse::<Mac>()
        .map_err(|e| InvalidError::Malformed(format!("vtepMAC: {e}")))?;
    if mac.is_zero() {
        return Err(InvalidError::NotAllowed(format!(
            "vtepMAC: {value} is all zeros"
        )));
    }
    if mac.is_multicast() {
        return Err(InvalidError::NotAllowed(format!(
            "vtepMAC: {value} is a multicast address"
        )));
    }
    Ok(())
}

/// Smallest MTU an IPv4 link must support
const MIN_MTU: u32 = 68;
/// Largest MTU of the fabric links
const MAX_MTU: u32 = 9216;

fn check_mtu(what: &str, mtu: u32) -> ValidationResult {
    if !(MIN_MTU..=MAX_MTU).contains(&mtu) {
        return Err(InvalidError::Malformed(format!(
            "{what}: MTU {mtu} is out of range {MIN_MTU}-{MAX_MTU}"
        )));
    }
    Ok(())
}

fn check_interfaces(spec: &GatewaySpec) -> ValidationResult {
    if spec.interfaces.is_empty() {
        return Err(InvalidError::NotAllowed(
            "Gateway must have at least one interface".to_string(),
        ));
    }
    for (name, iface) in &spec.interfaces {
        if name == IF_LOOPBACK || name == IF_VTEP {
            return Err(InvalidError::NotAllowed(format!(
                "interface name {name} is reserved"
            )));
        }
        check_mtu(&format!("interface {name}"), iface.mtu)?;
        for ip in &iface.ips {
            Prefix::parse_host(ip)
                .map_err(|e| InvalidError::Malformed(format!("interface {name}: {e}")))?;
        }
    }
    Ok(())
}

fn check_neighbors(spec: &GatewaySpec) -> ValidationResult {
    if spec.neighbors.is_empty() {
        return Err(InvalidError::NotAllowed(
            "Gateway must have at least one BGP neighbor".to_string(),
        ));
    }
    for neighbor in &spec.neighbors {
        neighbor.ip.parse::<IpAddr>().map_err(|e| {
            InvalidError::Malformed(format!("neighbor address '{}': {e}", neighbor.ip))
        })?;
        Asn::new(neighbor.asn)
            .map_err(|e| InvalidError::Malformed(format!("neighbor {}: {e}", neighbor.ip)))?;
    }
    Ok(())
}

fn check_level(what: &str, level: &str) -> ValidationResult {
    tracectl::level_from_name(level)
        .map(|_| ())
        .map_err(|e| InvalidError::Malformed(format!("{what}: {e}")))
}

fn check_logs(logs: &GatewayLogs) -> ValidationResult {
    if let Some(default) = logs.default.as_deref()
        && !default.is_empty()
    {
        check_level("default log level", default)?;
    }
    for (tag, level) in &logs.tags {
        check_level(&format!("log level of tag {tag}"), level)?;
    }
    Ok(())
}

fn check_memberships(spec: &GatewaySpec) -> ValidationResult {
    let mut seen = BTreeSet::new();
    for group in &spec.groups {
        if group.name.is_empty() {
            return Err(InvalidError::Malformed(
                "gateway group name must not be empty".to_string(),
            ));
        }
        if !seen.insert(group.name.as_str()) {
            return Err(InvalidError::NotAllowed(format!(
                "duplicate membership in gateway group {}",
                group.name
            )));
        }
    }
    Ok(())
}

/// Protocol and tunnel addresses must not be used by any other gateway of a common group.
fn check_sibling_gateways(
    name: &str,
    spec: &GatewaySpec,
    ours: [Prefix; 2],
    siblings: &dyn SiblingLookup,
) -> ValidationResult {
    for sibling in siblings.gateways() {
        let sibling_name = sibling.metadata.name.as_deref().unwrap_or_default();
        if sibling_name == name || !sibling.spec.group_names().any(|g| spec.in_group(g)) {
            continue;
        }
        for theirs in [&sibling.spec.protocol_ip, &sibling.spec.vtep_ip] {
            let Ok(theirs) = Prefix::parse_host(theirs) else {
                debug!("Ignoring unparsable address {theirs} of gateway {sibling_name}");
                continue;
            };
            if let Some(clash) = ours.iter().find(|p| p.addr() == theirs.addr()) {
                return Err(InvalidError::Overlap(format!(
                    "address {clash} is already used by gateway {sibling_name}"
                )));
            }
        }
    }
    Ok(())
}

fn validate_gateway(
    name: &str,
    spec: &GatewaySpec,
    siblings: Option<&dyn SiblingLookup>,
) -> ValidationResult {
    let protocol = host_address("protocolIP", &spec.protocol_ip)?;
    let vtep = host_address("vtepIP", &spec.vtep_ip)?;
    check_vtep_mac(&spec.vtep_mac)?;
    check_mtu("vtepMTU", spec.vtep_mtu)?;
    Asn::new(spec.asn).map_err(|e| InvalidError::Malformed(format!("asn: {e}")))?;
    check_interfaces(spec)?;
    check_neighbors(spec)?;
    check_logs(&spec.logs)?;
    check_memberships(spec)?;

    let Some(siblings) = siblings else {
        return Ok(());
    };
    for group in spec.group_names() {
        if !siblings.group_exists(group) {
            return Err(InvalidError::UnknownReference(format!(
                "gateway group {group} does not exist"
            )));
        }
    }
    check_sibling_gateways(name, spec, [protocol, vtep], siblings)?;

    let ours = gateway_claims(name, spec);
    for peering in siblings.peerings() {
        let peering_name = peering.metadata.name.as_deref().unwrap_or_default();
        check_disjoint(
            &ours,
            &sibling_peering_claims(peering_name, &peering.spec, siblings),
        )?;
    }
    Ok(())
}

impl Validate for Gateway {
    fn validate(&self, siblings: Option<&dyn SiblingLookup>) -> ValidationResult {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        validate_gateway(name, &self.spec, siblings)
            .inspect_err(|e| debug!("Rejecting gateway {name}: {e}"))
    }
}
