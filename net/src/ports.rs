// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Port lists, as used to refine address selectors.
//!
//! A port list is a comma-separated list of tokens, each token being either a single port or a
//! `lo-hi` range. Whitespace around tokens and around the hyphen is ignored. Port 0 is not a legal
//! port. The empty string stands for "all ports".

use std::fmt::Display;
use std::str::FromStr;

/// A non-empty range of ports, both ends included.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortRange {
    start: u16,
    end: u16,
}

/// Errors which may occur when parsing a port list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortRangeError {
    #[error("empty port token")]
    Empty,
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("port {0} out of range (1-65535)")]
    OutOfRange(u64),
    #[error("invalid port range: {0} > {1}")]
    InvalidRange(u16, u16),
}

fn parse_port(token: &str) -> Result<u16, PortRangeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(PortRangeError::Empty);
    }
    let port = token
        .parse::<u64>()
        .map_err(|_| PortRangeError::InvalidPort(token.to_owned()))?;
    match u16::try_from(port) {
        Ok(0) | Err(_) => Err(PortRangeError::OutOfRange(port)),
        Ok(port) => Ok(port),
    }
}

impl PortRange {
    /// Build a [`PortRange`] from its first and last ports.
    ///
    /// # Errors
    ///
    /// Fails if either port is zero or if `start` is greater than `end`.
    pub fn new(start: u16, end: u16) -> Result<Self, PortRangeError> {
        if start == 0 || end == 0 {
            return Err(PortRangeError::OutOfRange(0));
        }
        if start > end {
            return Err(PortRangeError::InvalidRange(start, end));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> u16 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u16 {
        self.end
    }

    #[must_use]
    pub fn overlaps(&self, other: &PortRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl FromStr for PortRange {
    type Err = PortRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((lo, hi)) => PortRange::new(parse_port(lo)?, parse_port(hi)?),
            None => {
                let port = parse_port(s)?;
                PortRange::new(port, port)
            }
        }
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parse a port list into its ranges. The empty (or blank) string yields no ranges.
///
/// # Errors
///
/// Fails on the first token which is not a legal port or port range, including the empty
/// token left by a trailing comma.
pub fn parse_port_list(ports: &str) -> Result<Vec<PortRange>, PortRangeError> {
    if ports.trim().is_empty() {
        return Ok(vec![]);
    }
    ports.split(',').map(str::parse::<PortRange>).collect()
}

/// Check that a port list is well-formed.
///
/// # Errors
///
/// See [`parse_port_list`].
pub fn validate_ports(ports: &str) -> Result<(), PortRangeError> {
    parse_port_list(ports).map(|_| ())
}
