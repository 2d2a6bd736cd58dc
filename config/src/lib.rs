// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Admission and compilation of gateway intent.
//!
//! Intent objects are first defaulted (see [`k8s_intf::Defaultable`]), then checked with
//! [`Validate`]. The objects relevant to one gateway are gathered into an agent spec with
//! [`build_agent_spec`], which [`compile`] turns into the message handed to the dataplane.

#![deny(clippy::all, clippy::pedantic)]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::missing_errors_doc)]

pub mod agent;
pub mod compile;
pub mod errors;
pub mod selectors;
pub mod siblings;
pub mod validation;

pub use agent::{AGENT_VERSION, build_agent, build_agent_spec};
pub use compile::{compile, compile_spec};
pub use errors::{AgentError, CompileError, InvalidError, ValidationResult};
pub use selectors::{AsSelector, IpSelector};
pub use siblings::SiblingLookup;
pub use validation::Validate;
