// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Canonical defaults for intent objects.

use std::time::Duration;

/// Name of the gateway group that exists implicitly
pub const DEFAULT_GATEWAY_GROUP: &str = "default";

/// Idle timeout of stateful NAT sessions when none is configured
pub const DEFAULT_STATEFUL_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Log level of a gateway when none is configured
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Prefix of the per-tenant selection labels set on peerings
pub const LABEL_VPC_PREFIX: &str = "vpc.gateway.githedgehog.com/";

/// Value of a per-tenant selection label
pub const LABEL_VALUE_TRUE: &str = "true";

/// Name of the label that selects the peerings which reference tenant `vpc`
#[must_use]
pub fn list_label_vpc(vpc: &str) -> String {
    format!("{LABEL_VPC_PREFIX}{vpc}")
}

/// Intent objects that have canonical defaults for their optional fields.
///
/// Defaulting never alters the object it is applied to; it produces a new, fully
/// populated value. Applying defaults to a defaulted object yields an equal object.
pub trait Defaultable: Sized {
    #[must_use]
    fn defaulted(&self) -> Self;
}
