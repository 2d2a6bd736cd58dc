// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Admission checks for intent objects.

pub mod gateway;
pub mod gwgroup;
pub(crate) mod overlap;
pub mod peering;
pub mod vpcinfo;

use crate::errors::ValidationResult;
use crate::siblings::SiblingLookup;

pub use peering::validate_peering_spec;
pub use vpcinfo::validate_vpcinfo_spec;

/// Admission check of an intent object, run after defaulting.
///
/// Checks short-circuit on the first failure. With `siblings` set to `None` only the
/// self-contained checks run.
pub trait Validate {
    fn validate(&self, siblings: Option<&dyn SiblingLookup>) -> ValidationResult;
}
