// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use k8s_intf::GatewayGroup;

use crate::errors::{InvalidError, ValidationResult};
use crate::siblings::SiblingLookup;
use crate::validation::Validate;

impl Validate for GatewayGroup {
    fn validate(&self, _siblings: Option<&dyn SiblingLookup>) -> ValidationResult {
        match self.metadata.name.as_deref() {
            None | Some("") => Err(InvalidError::Malformed(
                "gateway group must have a name".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}
