// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use bolero::{Driver, TypeGenerator};
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::bolero::LegalValue;
use crate::gateway::{GatewayBgpNeighbor, GatewayInterface, GatewayLogs, GatewaySpec};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warning", "info", "debug", "trace"];

fn log_level<D: Driver>(d: &mut D) -> Option<String> {
    let idx = d.gen_usize(Bound::Included(&0), Bound::Excluded(&LOG_LEVELS.len()))?;
    Some(LOG_LEVELS[idx].to_string())
}

impl TypeGenerator for LegalValue<GatewayLogs> {
    fn generate<D: Driver>(d: &mut D) -> Option<Self> {
        let default = if d.produce::<bool>()? {
            Some(log_level(d)?)
        } else {
            None
        };
        let num_tags = d.gen_usize(Bound::Included(&0), Bound::Included(&3))?;
        let mut tags = BTreeMap::new();
        for i in 0..num_tags {
            tags.insert(format!("tag-{i}"), log_level(d)?);
        }
        Some(LegalValue(GatewayLogs { default, tags }))
    }
}

/// Legal gateways live in 172.30.0.0/16: protocol addresses in 172.30.8.0/24, tunnel addresses
/// in 172.30.12.0/24 and fabric links in 172.30.128.0/24.
impl TypeGenerator for LegalValue<GatewaySpec> {
    fn generate<D: Driver>(d: &mut D) -> Option<Self> {
        let host = d.gen_u8(Bound::Included(&1), Bound::Included(&254))?;
        let asn = d.gen_u32(Bound::Included(&64512), Bound::Included(&65534))?;
        let num_ifaces = d.gen_u8(Bound::Included(&1), Bound::Included(&3))?;

        let mut interfaces = BTreeMap::new();
        let mut neighbors = Vec::new();
        for i in 0..num_ifaces {
            let kernel = format!("eth{i}");
            interfaces.insert(
                format!("port{i}"),
                GatewayInterface {
                    kernel: Some(kernel.clone()),
                    ips: vec![format!("172.30.128.{}/31", 2 * i + 1)],
                    mtu: d.gen_u32(Bound::Included(&1500), Bound::Included(&9000))?,
                },
            );
            neighbors.push(GatewayBgpNeighbor {
                source: kernel,
                ip: format!("172.30.128.{}", 2 * i),
                asn: asn + 1,
            });
        }

        Some(LegalValue(GatewaySpec {
            protocol_ip: format!("172.30.8.{host}/32"),
            vtep_ip: format!("172.30.12.{host}/32"),
            vtep_mac: format!("ca:fe:ba:be:00:{host:02x}"),
            vtep_mtu: d.gen_u32(Bound::Included(&1500), Bound::Included(&9000))?,
            asn,
            interfaces,
            neighbors,
            workers: None,
            logs: d.produce::<LegalValue<GatewayLogs>>()?.take(),
            groups: vec![],
        }))
    }
}
