// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Logging bootstrap for the gateway tools, and the log-level vocabulary shared by
//! intent objects and the dataplane configuration.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

// re-exports
pub use tracing_subscriber::filter::LevelFilter;

/// Level used when nothing else is configured
pub const DEFAULT_DEFAULT_LOGLEVEL: LevelFilter = LevelFilter::INFO;

/// Level names accepted in intent objects, from the least to the most verbose
pub const LEVEL_NAMES: [&str; 6] = ["off", "error", "warning", "info", "debug", "trace"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceCtlError {
    #[error("Invalid log level value: {0}")]
    UnknownLevel(String),
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Map a level name onto a [`LevelFilter`].
pub fn level_from_name(name: &str) -> Result<LevelFilter, TraceCtlError> {
    match name {
        "off" => Ok(LevelFilter::OFF),
        "error" => Ok(LevelFilter::ERROR),
        "warning" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        other => Err(TraceCtlError::UnknownLevel(other.to_string())),
    }
}

#[must_use]
pub fn level_name(level: LevelFilter) -> &'static str {
    if level == LevelFilter::OFF {
        "off"
    } else if level == LevelFilter::ERROR {
        "error"
    } else if level == LevelFilter::WARN {
        "warning"
    } else if level == LevelFilter::INFO {
        "info"
    } else if level == LevelFilter::DEBUG {
        "debug"
    } else {
        "trace"
    }
}

/// Install a global fmt subscriber writing to stderr. `RUST_LOG`, if set and valid,
/// takes precedence over `default`.
pub fn init(default: LevelFilter) -> Result<(), TraceCtlError> {
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| TraceCtlError::Init(e.to_string()))?;
    debug!("Tracing initialized with default level {}", level_name(default));
    Ok(())
}
