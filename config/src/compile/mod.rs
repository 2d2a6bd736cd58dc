// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Build the dataplane configuration message from a gateway agent spec.
//!
//! The output only depends on the input: every list is sorted, so that two builds from the
//! same agent compare equal and callers can detect changes by comparing messages.

pub mod device;
pub mod gwgroups;
pub mod overlay;
pub mod underlay;

use k8s_intf::{GatewayAgent, GatewayAgentSpec};
use tracing::{debug, info};
use wire::GatewayConfig;

use crate::errors::CompileError;

/// Loopback interface carrying the tunnel address
pub const IF_LOOPBACK: &str = "lo";
/// Tunnel endpoint interface
pub const IF_VTEP: &str = "vtep";
/// The only routing domain of the underlay
pub const DEFAULT_VRF: &str = "default";

/// Build the configuration of the gateway named `hostname`, tagged with `generation`.
pub fn compile_spec(
    hostname: &str,
    generation: i64,
    spec: &GatewayAgentSpec,
) -> Result<GatewayConfig, CompileError> {
    debug!("Building dataplane config for {hostname}, generation {generation}");
    let underlay = underlay::build_underlay(&spec.gateway)?;
    let device = device::build_device(hostname, &spec.gateway.logs)?;
    let overlay = overlay::build_overlay(spec)?;
    let gw_groups = gwgroups::build_gw_groups(&spec.groups)?;

    info!(
        "Built dataplane config for {hostname} generation {generation}: {} neighbors, {} VPCs, {} peerings, {} gateway groups",
        underlay
            .vrfs
            .iter()
            .map(|vrf| vrf.router.neighbors.len())
            .sum::<usize>(),
        overlay.vpcs.len(),
        overlay.peerings.len(),
        gw_groups.len()
    );

    Ok(GatewayConfig {
        generation,
        device,
        underlay,
        overlay,
        gw_groups,
    })
}

/// Build the configuration of the gateway an agent object is for. The object name is the
/// gateway hostname and its generation tags the message.
pub fn compile(agent: &GatewayAgent) -> Result<GatewayConfig, CompileError> {
    let hostname = agent
        .metadata
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            CompileError::InvalidDataplaneConfig("gateway agent has no name".to_string())
        })?;
    compile_spec(
        hostname,
        agent.metadata.generation.unwrap_or_default(),
        &agent.spec,
    )
}
