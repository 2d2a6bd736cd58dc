// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IP prefixes and the set relations between them.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt::Display;
use std::net::IpAddr;
use std::str::FromStr;

/// An IPv4 or IPv6 prefix.
///
/// A [`Prefix`] built through [`FromStr`] is canonical: its host bits are zero. Interface
/// addresses, which carry host bits, are built with [`Prefix::parse_host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(IpNet);

/// Errors which may occur when parsing a [`Prefix`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixError {
    #[error("invalid prefix '{0}': {1}")]
    Invalid(String, String),
    #[error("invalid prefix '{0}': host bits are set")]
    HostBitsSet(String),
}

impl Prefix {
    /// Build a [`Prefix`] from an [`IpNet`] as is.
    #[must_use]
    pub fn new(net: IpNet) -> Self {
        Self(net)
    }

    /// Parse an interface-style `address/length` string. Host bits are allowed and kept.
    ///
    /// # Errors
    ///
    /// Fails with [`PrefixError::Invalid`] if the string is not an address with a mask length.
    pub fn parse_host(s: &str) -> Result<Self, PrefixError> {
        s.parse::<IpNet>()
            .map(Prefix)
            .map_err(|e| PrefixError::Invalid(s.to_owned(), e.to_string()))
    }

    #[must_use]
    pub fn ipnet(&self) -> IpNet {
        self.0
    }

    /// The address part of the prefix, host bits included
    #[must_use]
    pub fn addr(&self) -> IpAddr {
        self.0.addr()
    }

    /// The mask length
    #[must_use]
    pub fn length(&self) -> u8 {
        self.0.prefix_len()
    }

    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        matches!(self.0, IpNet::V4(_))
    }

    /// Tell if this prefix designates a single address (/32 for IPv4, /128 for IPv6)
    #[must_use]
    pub fn is_host(&self) -> bool {
        self.0.prefix_len() == self.0.max_prefix_len()
    }

    #[must_use]
    pub fn is_loopback(&self) -> bool {
        self.0.addr().is_loopback()
    }

    /// The canonical form of this prefix, with host bits cleared
    #[must_use]
    pub fn network(&self) -> Prefix {
        Prefix(self.0.trunc())
    }

    /// Tell if every address of `other` is within `self`. Prefixes of distinct families never
    /// cover each other.
    #[must_use]
    pub fn covers(&self, other: &Prefix) -> bool {
        self.0.trunc().contains(&other.0.trunc())
    }

    /// Tell if two prefixes have at least one address in common.
    #[must_use]
    pub fn overlaps(&self, other: &Prefix) -> bool {
        self.covers(other) || other.covers(self)
    }

    /// The set of addresses common to both prefixes, if any. Two prefixes either nest or are
    /// disjoint, so the intersection is always the longer of the two.
    #[must_use]
    pub fn intersection(&self, other: &Prefix) -> Option<Prefix> {
        if self.covers(other) {
            Some(other.network())
        } else if other.covers(self) {
            Some(self.network())
        } else {
            None
        }
    }
}

impl FromStr for Prefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = Prefix::parse_host(s)?;
        if prefix.network() != prefix {
            return Err(PrefixError::HostBitsSet(s.to_owned()));
        }
        Ok(prefix)
    }
}

impl From<IpNet> for Prefix {
    fn from(net: IpNet) -> Self {
        Prefix(net)
    }
}

impl From<Ipv4Net> for Prefix {
    fn from(net: Ipv4Net) -> Self {
        Prefix(IpNet::V4(net))
    }
}

impl From<Ipv6Net> for Prefix {
    fn from(net: Ipv6Net) -> Self {
        Prefix(IpNet::V6(net))
    }
}

impl From<IpAddr> for Prefix {
    fn from(addr: IpAddr) -> Self {
        Prefix(IpNet::from(addr))
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use super::Prefix;
    use bolero::{Driver, TypeGenerator};
    use ipnet::Ipv4Net;
    use std::net::Ipv4Addr;
    use std::ops::Bound;

    /// Generates canonical IPv4 prefixes
    impl TypeGenerator for Prefix {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            let addr = Ipv4Addr::from(driver.produce::<u32>()?);
            let len = driver.gen_u8(Bound::Included(&0), Bound::Included(&32))?;
            let net = Ipv4Net::new(addr, len).ok()?;
            Some(Prefix::from(net.trunc()))
        }
    }
}
