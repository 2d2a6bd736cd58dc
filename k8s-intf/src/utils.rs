// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Utils to build intent objects from JSON / YAML text and files.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read CRD from file ({0}): {1}")]
    Read(String, std::io::Error),
    #[error("Failed to deserialize CRD from YAML ({0}): {1}")]
    Yaml(String, serde_yaml_ng::Error),
    #[error("Failed to deserialize CRD from JSON ({0}): {1}")]
    Json(String, serde_json::Error),
    #[error("Unsupported file extension {0}")]
    UnsupportedExtension(String),
    #[error("Missing file extension: {0}")]
    MissingExtension(String),
}

/// Deserialize an object from YAML or JSON text. JSON is accepted since YAML is a superset of it.
///
/// # Errors
/// Fails if the text cannot be deserialized into `T`.
pub fn load_crd_from_str<T: DeserializeOwned>(text: &str) -> Result<T, LoadError> {
    serde_yaml_ng::from_str(text).map_err(|e| LoadError::Yaml("<text>".to_string(), e))
}

fn load_crd_from_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let name = path.display().to_string();
    let yaml = fs::read_to_string(path).map_err(|e| LoadError::Read(name.clone(), e))?;
    serde_yaml_ng::from_str(&yaml).map_err(|e| LoadError::Yaml(name, e))
}

fn load_crd_from_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let name = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|e| LoadError::Read(name.clone(), e))?;
    serde_json::from_str(&json).map_err(|e| LoadError::Json(name, e))
}

/// Read the file at `path` and deserialize it into a `T`.
/// The file is assumed to contain an object in JSON (`.json`) or YAML (`.yaml`, `.yml`).
///
/// # Errors
/// This function may fail if the file does not exist or cannot be opened / read, or if the contents
/// cannot be deserialized.
pub fn load_crd_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            load_crd_from_yaml(path)
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_crd_from_json(path),
        Some(ext) => Err(LoadError::UnsupportedExtension(
            ext.to_string_lossy().into_owned(),
        )),
        None => Err(LoadError::MissingExtension(path.display().to_string())),
    }
}
