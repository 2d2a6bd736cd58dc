// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Typed views of the union-like address selectors of expose blocks.

use k8s_intf::{PeeringEntryAs, PeeringEntryIp};
use net::{PortRange, Prefix, parse_port_list};

use crate::errors::InvalidError;

/// An IP selector of an expose block, with exactly one arm set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpSelector {
    Cidr(Prefix),
    Not(Prefix),
    /// Name of a subnet in the tenant's catalog
    Subnet(String),
}

/// A translated-address selector. Subnet references are not allowed on this side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsSelector {
    Cidr(Prefix),
    Not(Prefix),
}

/// An empty string counts as not set
fn arm(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn parse_cidr(what: &str, cidr: &str) -> Result<Prefix, InvalidError> {
    cidr.parse::<Prefix>()
        .map_err(|e| InvalidError::Malformed(format!("{what} CIDR: {e}")))
}

/// Parse the optional port list refining a selector
pub(crate) fn parse_ports(ports: Option<&String>) -> Result<Vec<PortRange>, InvalidError> {
    match arm(ports) {
        None => Ok(vec![]),
        Some(ports) => parse_port_list(ports)
            .map_err(|e| InvalidError::Malformed(format!("port list '{ports}': {e}"))),
    }
}

impl TryFrom<&PeeringEntryIp> for IpSelector {
    type Error = InvalidError;

    fn try_from(ip: &PeeringEntryIp) -> Result<Self, Self::Error> {
        match (
            arm(ip.cidr.as_ref()),
            arm(ip.vpc_subnet.as_ref()),
            arm(ip.not.as_ref()),
        ) {
            (None, None, None) => Err(InvalidError::NotAllowed(
                "Expose ip object must specify subnet, cidr, or not".to_string(),
            )),
            (Some(cidr), None, None) => Ok(IpSelector::Cidr(parse_cidr("Expose ip", cidr)?)),
            (None, None, Some(not)) => Ok(IpSelector::Not(parse_cidr("Expose ip not", not)?)),
            (None, Some(subnet), None) => Ok(IpSelector::Subnet(subnet.to_string())),
            _ => Err(InvalidError::NotAllowed(
                "Expose ip object must specify exactly one of subnet, cidr, or not".to_string(),
            )),
        }
    }
}

impl TryFrom<&PeeringEntryAs> for AsSelector {
    type Error = InvalidError;

    fn try_from(r#as: &PeeringEntryAs) -> Result<Self, Self::Error> {
        match (arm(r#as.cidr.as_ref()), arm(r#as.not.as_ref())) {
            (None, None) => Err(InvalidError::NotAllowed(
                "Expose as object must specify cidr or not".to_string(),
            )),
            (Some(cidr), None) => Ok(AsSelector::Cidr(parse_cidr("Expose as", cidr)?)),
            (None, Some(not)) => Ok(AsSelector::Not(parse_cidr("Expose as not", not)?)),
            (Some(_), Some(_)) => Err(InvalidError::NotAllowed(
                "Expose as object must specify either cidr or not, not both".to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ip(cidr: Option<&str>, not: Option<&str>, subnet: Option<&str>) -> PeeringEntryIp {
        PeeringEntryIp {
            cidr: cidr.map(str::to_string),
            not: not.map(str::to_string),
            vpc_subnet: subnet.map(str::to_string),
            ports: None,
        }
    }

    #[test]
    fn ip_selector_single_arm() {
        assert_eq!(
            IpSelector::try_from(&ip(Some("10.0.1.0/24"), None, None)),
            Ok(IpSelector::Cidr("10.0.1.0/24".parse().unwrap()))
        );
        assert_eq!(
            IpSelector::try_from(&ip(None, Some("10.0.1.1/32"), None)),
            Ok(IpSelector::Not("10.0.1.1/32".parse().unwrap()))
        );
        assert_eq!(
            IpSelector::try_from(&ip(None, None, Some("subnet-1"))),
            Ok(IpSelector::Subnet("subnet-1".to_string()))
        );
        // empty strings count as unset
        assert_eq!(
            IpSelector::try_from(&ip(Some("10.0.1.0/24"), Some(""), Some(""))),
            Ok(IpSelector::Cidr("10.0.1.0/24".parse().unwrap()))
        );
    }

    #[test]
    fn ip_selector_rejects_zero_or_many_arms() {
        for bad in [
            ip(None, None, None),
            ip(Some(""), None, None),
            ip(Some("10.0.1.0/24"), Some("10.0.1.1/32"), None),
            ip(Some("10.0.1.0/24"), None, Some("subnet-1")),
            ip(None, Some("10.0.1.1/32"), Some("subnet-1")),
            ip(Some("10.0.1.0/24"), Some("10.0.1.1/32"), Some("subnet-1")),
        ] {
            assert!(
                matches!(IpSelector::try_from(&bad), Err(InvalidError::NotAllowed(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn selector_cidrs_must_be_canonical() {
        assert!(matches!(
            IpSelector::try_from(&ip(Some("10.0.1.1/24"), None, None)),
            Err(InvalidError::Malformed(_))
        ));
        let r#as = PeeringEntryAs {
            cidr: Some("192.168.1.256/24".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            AsSelector::try_from(&r#as),
            Err(InvalidError::Malformed(_))
        ));
    }

    #[test]
    fn as_selector_arms() {
        let both = PeeringEntryAs {
            cidr: Some("192.168.1.0/24".to_string()),
            not: Some("192.168.1.1/32".to_string()),
            ports: None,
        };
        assert!(matches!(
            AsSelector::try_from(&both),
            Err(InvalidError::NotAllowed(_))
        ));
        let not = PeeringEntryAs {
            not: Some("192.168.1.1/32".to_string()),
            ..Default::default()
        };
        assert_eq!(
            AsSelector::try_from(&not),
            Ok(AsSelector::Not("192.168.1.1/32".parse().unwrap()))
        );
    }

    #[test]
    fn port_lists() {
        assert_eq!(parse_ports(None), Ok(vec![]));
        assert_eq!(parse_ports(Some(&String::new())), Ok(vec![]));
        assert_eq!(parse_ports(Some(&"80, 443".to_string())).unwrap().len(), 2);
        assert!(parse_ports(Some(&"80,".to_string())).is_err());
    }
}
