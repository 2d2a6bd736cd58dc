// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::net::IpAddr;

use k8s_intf::GatewaySpec;
use net::Prefix;
use wire::{
    BgpAf, BgpNeighbor, IfRole, IfType, Interface, Ipv4Unicast, L2VpnEvpn, RouterConfig, Underlay,
    UpdateSource, Vrf,
};

use crate::compile::{DEFAULT_VRF, IF_LOOPBACK, IF_VTEP};
use crate::errors::CompileError;

/// Loopback and VTEP interfaces carrying the tunnel address, followed by one fabric-facing
/// Ethernet interface per configured interface, sorted by name.
#[must_use]
pub fn build_interfaces(gw: &GatewaySpec) -> Vec<Interface> {
    let mut interfaces = vec![
        Interface {
            name: IF_LOOPBACK.to_string(),
            ipaddrs: vec![gw.vtep_ip.clone()],
            iftype: IfType::Loopback,
            role: IfRole::Fabric,
            macaddr: None,
            mtu: None,
        },
        Interface {
            name: IF_VTEP.to_string(),
            ipaddrs: vec![gw.vtep_ip.clone()],
            iftype: IfType::Vtep,
            role: IfRole::Fabric,
            macaddr: Some(gw.vtep_mac.clone()),
            mtu: Some(gw.vtep_mtu),
        },
    ];
    interfaces.extend(gw.interfaces.iter().map(|(name, iface)| Interface {
        name: name.clone(),
        ipaddrs: iface.ips.clone(),
        iftype: IfType::Ethernet,
        role: IfRole::Fabric,
        macaddr: None,
        mtu: Some(iface.mtu),
    }));
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    interfaces
}

/// BGP neighbors sorted by address. Sessions are sourced from the named local interface.
pub fn build_neighbors(gw: &GatewaySpec) -> Result<Vec<BgpNeighbor>, CompileError> {
    let mut neighbors = gw
        .neighbors
        .iter()
        .map(|neigh| {
            let address = neigh.ip.parse::<IpAddr>().map_err(|e| {
                CompileError::InvalidDataplaneConfig(format!(
                    "invalid neighbor IP {}: {e}",
                    neigh.ip
                ))
            })?;
            Ok(BgpNeighbor {
                address: address.to_string(),
                remote_asn: neigh.asn.to_string(),
                af_activate: vec![BgpAf::Ipv4Unicast, BgpAf::L2vpnEvpn],
                update_source: Some(UpdateSource::Interface(neigh.source.clone())),
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;
    neighbors.sort_by(|a, b| a.address.cmp(&b.address));
    Ok(neighbors)
}

pub fn build_router(gw: &GatewaySpec, router_id: IpAddr) -> Result<RouterConfig, CompileError> {
    Ok(RouterConfig {
        asn: gw.asn.to_string(),
        router_id: router_id.to_string(),
        neighbors: build_neighbors(gw)?,
        ipv4_unicast: Ipv4Unicast {
            networks: vec![gw.vtep_ip.clone()],
            redistribute_connected: false,
            redistribute_static: false,
        },
        l2vpn_evpn: L2VpnEvpn {
            advertise_all_vni: true,
        },
    })
}

/// A single routing domain, the default one, holding every interface and the router.
pub fn build_underlay(gw: &GatewaySpec) -> Result<Underlay, CompileError> {
    let protocol = Prefix::parse_host(&gw.protocol_ip).map_err(|e| {
        CompileError::InvalidDataplaneConfig(format!("invalid ProtocolIP {}: {e}", gw.protocol_ip))
    })?;
    Ok(Underlay {
        vrfs: vec![Vrf {
            name: DEFAULT_VRF.to_string(),
            interfaces: build_interfaces(gw),
            router: build_router(gw, protocol.addr())?,
        }],
    })
}
