// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use k8s_intf::GatewayLogs;
use k8s_intf::defaults::DEFAULT_LOG_LEVEL;
use tracectl::LevelFilter;
use wire::{Device, LogLevel, PacketDriver, TracingConfig};

use crate::errors::CompileError;

fn wire_level(level: LevelFilter) -> LogLevel {
    if level == LevelFilter::ERROR {
        LogLevel::Error
    } else if level == LevelFilter::WARN {
        LogLevel::Warning
    } else if level == LevelFilter::INFO {
        LogLevel::Info
    } else if level == LevelFilter::DEBUG {
        LogLevel::Debug
    } else if level == LevelFilter::TRACE {
        LogLevel::Trace
    } else {
        LogLevel::Off
    }
}

fn levelstring_to_loglevel(value: &str) -> Result<LogLevel, CompileError> {
    tracectl::level_from_name(value)
        .map(wire_level)
        .map_err(|e| CompileError::InvalidDataplaneConfig(format!("logs: {e}")))
}

/// Tracing config of the dataplane. An unset default level is `info`.
pub fn build_tracing(logs: &GatewayLogs) -> Result<TracingConfig, CompileError> {
    let default = logs
        .default
        .as_deref()
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL);
    let mut config = TracingConfig {
        default: levelstring_to_loglevel(default)?,
        ..Default::default()
    };
    for (tag, level) in &logs.tags {
        config
            .taglevel
            .insert(tag.clone(), levelstring_to_loglevel(level)?);
    }
    Ok(config)
}

pub fn build_device(hostname: &str, logs: &GatewayLogs) -> Result<Device, CompileError> {
    Ok(Device {
        driver: PacketDriver::Kernel,
        hostname: hostname.to_string(),
        tracing: build_tracing(logs)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use k8s_intf::bolero::LegalValue;
    use pretty_assertions::assert_eq;

    fn test_levelstring_to_loglevel(level: &str) -> LogLevel {
        match level {
            "off" => LogLevel::Off,
            "error" => LogLevel::Error,
            "warning" => LogLevel::Warning,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            val => panic!("Invalid log level value: {val}"),
        }
    }

    #[test]
    fn test_tracing_config_conversion() {
        bolero::check!()
            .with_type::<LegalValue<GatewayLogs>>()
            .for_each(|logs| {
                let logs = logs.as_ref();
                let tc = build_tracing(logs).unwrap();
                let default = logs.default.as_deref().unwrap_or("info");
                assert_eq!(tc.default, test_levelstring_to_loglevel(default));
                assert_eq!(tc.taglevel.len(), logs.tags.len());
                for (tag, level) in &logs.tags {
                    assert_eq!(tc.taglevel[tag], test_levelstring_to_loglevel(level));
                }
            });
    }

    #[test]
    fn unset_default_is_info() {
        let tc = build_tracing(&GatewayLogs::default()).unwrap();
        assert_eq!(tc.default, LogLevel::Info);
        let logs = GatewayLogs {
            default: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(build_tracing(&logs).unwrap().default, LogLevel::Info);
    }

    #[test]
    fn unknown_level_fails() {
        let mut logs = GatewayLogs::default();
        logs.tags.insert("nat".to_string(), "verbose".to_string());
        assert!(matches!(
            build_tracing(&logs),
            Err(CompileError::InvalidDataplaneConfig(_))
        ));
    }

    #[test]
    fn kernel_driver() {
        let device = build_device("gw-1", &GatewayLogs::default()).unwrap();
        assert_eq!(device.driver, PacketDriver::Kernel);
        assert_eq!(device.hostname, "gw-1");
    }
}
