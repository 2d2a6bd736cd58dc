// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Error classes returned by validation, compilation and agent spec assembly.

use thiserror::Error;

/// An intent object was rejected. Callers match on the class, not on the message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidError {
    #[error("invalid object: malformed value: {0}")]
    Malformed(String),
    #[error("invalid object: not allowed: {0}")]
    NotAllowed(String),
    #[error("invalid object: address overlap: {0}")]
    Overlap(String),
    #[error("invalid object: unknown reference: {0}")]
    UnknownReference(String),
    #[error("invalid object: not ready: {0}")]
    NotReady(String),
}

impl InvalidError {
    /// Short name of the error class
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            InvalidError::Malformed(_) => "malformed",
            InvalidError::NotAllowed(_) => "not-allowed",
            InvalidError::Overlap(_) => "overlap",
            InvalidError::UnknownReference(_) => "unknown-reference",
            InvalidError::NotReady(_) => "not-ready",
        }
    }

    /// Prefix the message with the location of the offending field, keeping the class
    #[must_use]
    pub fn within(self, location: &str) -> Self {
        match self {
            InvalidError::Malformed(m) => InvalidError::Malformed(format!("{location}: {m}")),
            InvalidError::NotAllowed(m) => InvalidError::NotAllowed(format!("{location}: {m}")),
            InvalidError::Overlap(m) => InvalidError::Overlap(format!("{location}: {m}")),
            InvalidError::UnknownReference(m) => {
                InvalidError::UnknownReference(format!("{location}: {m}"))
            }
            InvalidError::NotReady(m) => InvalidError::NotReady(format!("{location}: {m}")),
        }
    }
}

/// A dataplane configuration could not be built from an agent spec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("invalid dataplane config: {0}")]
    InvalidDataplaneConfig(String),
}

impl From<InvalidError> for CompileError {
    fn from(e: InvalidError) -> Self {
        CompileError::InvalidDataplaneConfig(e.to_string())
    }
}

/// An agent spec could not be assembled for a gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("VPCInfo {0} is not ready")]
    NotReady(String),
    #[error("Gateway has no name")]
    MissingName,
}

pub type ValidationResult = Result<(), InvalidError>;
