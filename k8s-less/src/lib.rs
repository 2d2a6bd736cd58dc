// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Support for k8s-less mode where intent objects are learnt from files instead of a store

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod local;
mod store;

pub use local::{KubelessError, load_object, load_siblings_dir};
pub use store::{IntentObject, SiblingStore};
