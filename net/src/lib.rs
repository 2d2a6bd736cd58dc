// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Address, identifier and port-list primitives shared by the gateway control plane

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

pub mod asn;
pub mod mac;
pub mod ports;
pub mod prefix;
pub mod strings;
pub mod vni;

pub use asn::{Asn, InvalidAsn};
pub use mac::{Mac, MacParseError};
pub use ports::{PortRange, PortRangeError, parse_port_list, validate_ports};
pub use prefix::{Prefix, PrefixError};
pub use vni::{InvalidVni, Vni};
