// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Mac address type and logic.

use std::fmt::Display;
use std::str::FromStr;

/// A [MAC Address] type.
///
/// `Mac` is a transparent wrapper around `[u8; 6]` which provides a
/// small collection of methods and type safety.
///
/// [MAC Address]: https://en.wikipedia.org/wiki/MAC_address
#[must_use]
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mac(pub [u8; 6]);

impl From<[u8; 6]> for Mac {
    fn from(value: [u8; 6]) -> Self {
        Mac(value)
    }
}

impl From<Mac> for [u8; 6] {
    fn from(value: Mac) -> Self {
        value.0
    }
}

impl AsRef<[u8; 6]> for Mac {
    fn as_ref(&self) -> &[u8; 6] {
        &self.0
    }
}

impl Mac {
    /// The broadcast `Mac`
    pub const BROADCAST: Mac = Mac([u8::MAX; 6]);
    /// The zero `Mac`.
    ///
    /// `ZERO` is illegal as a tunnel endpoint `Mac`.
    pub const ZERO: Mac = Mac([0; 6]);

    /// Returns true iff the binary representation of the [`Mac`] is exclusively zeros.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self == &Mac::ZERO
    }

    /// Returns true iff the least significant bit of the first octet of the [`Mac`] is one.
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// Returns true iff the least significant bit of the first octet of the [`Mac`] is zero.
    #[must_use]
    pub fn is_unicast(&self) -> bool {
        !self.is_multicast()
    }

    /// Returns true iff the [`Mac`] may be used as the source of frames,
    /// that is, it is unicast and not zero.
    #[must_use]
    pub fn is_valid_src(&self) -> bool {
        !self.is_zero() && self.is_unicast()
    }
}

/// Errors which may occur when parsing a [`Mac`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacParseError {
    /// The string does not have exactly six octets.
    #[error("invalid mac address '{0}': expected 6 octets, found {1}")]
    InvalidLength(String, usize),
    /// An octet is not made of two hexadecimal digits.
    #[error("invalid mac address '{0}': bad octet '{1}'")]
    InvalidOctet(String, String),
}

impl FromStr for Mac {
    type Err = MacParseError;

    /// Parse a colon-separated (or dash-separated) mac address such as `ca:fe:ba:be:00:01`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = if s.contains('-') { '-' } else { ':' };
        let octets: Vec<&str> = s.split(sep).collect();
        if octets.len() != 6 {
            return Err(MacParseError::InvalidLength(s.to_owned(), octets.len()));
        }
        let mut mac = [0u8; 6];
        for (byte, octet) in mac.iter_mut().zip(octets) {
            if octet.len() != 2 || !octet.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(MacParseError::InvalidOctet(s.to_owned(), octet.to_owned()));
            }
            *byte = u8::from_str_radix(octet, 16)
                .map_err(|_| MacParseError::InvalidOctet(s.to_owned(), octet.to_owned()))?;
        }
        Ok(Mac(mac))
    }
}

impl Display for Mac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use super::Mac;
    use bolero::{Driver, TypeGenerator};

    impl TypeGenerator for Mac {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            Some(Mac(driver.produce()?))
        }
    }
}
