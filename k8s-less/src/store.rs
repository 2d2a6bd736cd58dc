// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::SiblingLookup;
use k8s_intf::{Defaultable, Gateway, GatewayGroup, Peering, VpcInfo};
use kube_core::Resource;
use tracing::debug;

/// Any intent object a store can hold
#[derive(Debug, Clone, PartialEq)]
pub enum IntentObject {
    Gateway(Gateway),
    GatewayGroup(GatewayGroup),
    Peering(Peering),
    VpcInfo(VpcInfo),
}

impl IntentObject {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            IntentObject::Gateway(o) => name_of(o),
            IntentObject::GatewayGroup(o) => name_of(o),
            IntentObject::Peering(o) => name_of(o),
            IntentObject::VpcInfo(o) => name_of(o),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            IntentObject::Gateway(_) => "Gateway",
            IntentObject::GatewayGroup(_) => "GatewayGroup",
            IntentObject::Peering(_) => "Peering",
            IntentObject::VpcInfo(_) => "VPCInfo",
        }
    }
}

impl Defaultable for IntentObject {
    fn defaulted(&self) -> Self {
        match self {
            IntentObject::Gateway(o) => IntentObject::Gateway(o.defaulted()),
            IntentObject::GatewayGroup(o) => IntentObject::GatewayGroup(o.defaulted()),
            IntentObject::Peering(o) => IntentObject::Peering(o.defaulted()),
            IntentObject::VpcInfo(o) => IntentObject::VpcInfo(o.defaulted()),
        }
    }
}

/// In-memory snapshot of intent objects, standing in for the store when validating and
/// compiling outside of a cluster. Objects are kept sorted by name and a name is unique per
/// kind.
#[derive(Debug, Clone, Default)]
pub struct SiblingStore {
    gateways: Vec<Gateway>,
    groups: Vec<GatewayGroup>,
    peerings: Vec<Peering>,
    vpc_infos: Vec<VpcInfo>,
}

fn name_of<T: Resource>(object: &T) -> &str {
    object.meta().name.as_deref().unwrap_or_default()
}

/// Insert `object` in `list`, replacing the object of the same name if any
fn upsert<T: Resource>(list: &mut Vec<T>, object: T) {
    match list.binary_search_by(|o| name_of(o).cmp(name_of(&object))) {
        Ok(index) => list[index] = object,
        Err(index) => list.insert(index, object),
    }
}

impl SiblingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, replacing any object of the same kind and name
    pub fn insert(&mut self, object: IntentObject) {
        debug!("Storing {} {}", object.kind(), object.name());
        match object {
            IntentObject::Gateway(o) => upsert(&mut self.gateways, o),
            IntentObject::GatewayGroup(o) => upsert(&mut self.groups, o),
            IntentObject::Peering(o) => upsert(&mut self.peerings, o),
            IntentObject::VpcInfo(o) => upsert(&mut self.vpc_infos, o),
        }
    }

    #[must_use]
    pub fn with(mut self, object: IntentObject) -> Self {
        self.insert(object);
        self
    }

    /// The gateway named `name`, if known
    #[must_use]
    pub fn gateway(&self, name: &str) -> Option<&Gateway> {
        self.gateways.iter().find(|gw| name_of(*gw) == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.gateways.len() + self.groups.len() + self.peerings.len() + self.vpc_infos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default every object, as admission would have done before storing them
impl Defaultable for SiblingStore {
    fn defaulted(&self) -> Self {
        SiblingStore {
            gateways: self.gateways.iter().map(Defaultable::defaulted).collect(),
            groups: self.groups.iter().map(Defaultable::defaulted).collect(),
            peerings: self.peerings.iter().map(Defaultable::defaulted).collect(),
            vpc_infos: self.vpc_infos.iter().map(Defaultable::defaulted).collect(),
        }
    }
}

impl SiblingLookup for SiblingStore {
    fn gateways(&self) -> &[Gateway] {
        &self.gateways
    }
    fn gateway_groups(&self) -> &[GatewayGroup] {
        &self.groups
    }
    fn peerings(&self) -> &[Peering] {
        &self.peerings
    }
    fn vpc_infos(&self) -> &[VpcInfo] {
        &self.vpc_infos
    }
}
