// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::fs;
use std::path::{Path, PathBuf};

use k8s_intf::{Gateway, GatewayGroup, LoadError, Peering, VpcInfo, load_crd_from_file};
use kube_core::{Resource, TypeMeta};

use tracing::{debug, trace, warn};

use crate::store::{IntentObject, SiblingStore};

#[derive(Debug, thiserror::Error)]
pub enum KubelessError {
    #[error("Failed to read directory {0}: {1}")]
    ReadDir(String, std::io::Error),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Unknown kind {1} in {0}")]
    UnknownKind(String, String),
    #[error("Object in {0} has no name")]
    Unnamed(String),
}

/// Tell if a directory entry is worth loading. Text editors leave swap files and hidden
/// temporary files around, and only YAML and JSON files hold objects.
fn is_candidate(path: &Path) -> bool {
    let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
        return false;
    };
    if filename.contains(".sw") || filename.starts_with('.') {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ["yaml", "yml", "json"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn is_kind<K: Resource<DynamicType = ()>>(kind: &str) -> bool {
    K::kind(&()) == kind
}

/// Load one object from the file at `path`. Its kind is read from the object itself.
pub fn load_object(path: &Path) -> Result<IntentObject, KubelessError> {
    let name = path.display().to_string();
    let meta: TypeMeta = load_crd_from_file(path)?;
    let object = if is_kind::<Gateway>(&meta.kind) {
        IntentObject::Gateway(load_crd_from_file(path)?)
    } else if is_kind::<GatewayGroup>(&meta.kind) {
        IntentObject::GatewayGroup(load_crd_from_file(path)?)
    } else if is_kind::<Peering>(&meta.kind) {
        IntentObject::Peering(load_crd_from_file(path)?)
    } else if is_kind::<VpcInfo>(&meta.kind) {
        IntentObject::VpcInfo(load_crd_from_file(path)?)
    } else {
        return Err(KubelessError::UnknownKind(name, meta.kind));
    };
    if object.name().is_empty() {
        return Err(KubelessError::Unnamed(name));
    }
    Ok(object)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, KubelessError> {
    let read_err = |e| KubelessError::ReadDir(dir.display().to_string(), e);
    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    entries.sort();
    Ok(entries)
}

fn load_into(store: &mut SiblingStore, dir: &Path) -> Result<(), KubelessError> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            load_into(store, &path)?;
        } else if is_candidate(&path) {
            debug!("Loading {}...", path.display());
            store.insert(load_object(&path)?);
        } else {
            trace!("Ignoring {}", path.display());
        }
    }
    Ok(())
}

/// Build a store from every object found under `dir`. Objects may be laid out flat or in
/// subdirectories, in YAML or JSON. A later object replaces an earlier one of the same kind
/// and name, files being read in path order.
pub fn load_siblings_dir(dir: &Path) -> Result<SiblingStore, KubelessError> {
    let mut store = SiblingStore::new();
    load_into(&mut store, dir)?;
    if store.is_empty() {
        warn!("No objects found under {}", dir.display());
    } else {
        debug!("Loaded {} objects from {}", store.len(), dir.display());
    }
    Ok(store)
}
