// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Command line of the validator

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Mode {
    /// Default then validate the object read from stdin
    Validate,
    /// Build the dataplane configuration of the object read from stdin
    Compile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Kind {
    Gateway,
    Gatewaygroup,
    Peering,
    Vpcinfo,
    /// A `GatewayAgent`, as built for a gateway
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Output {
    Yaml,
    Json,
}

#[derive(Debug, Parser)]
#[command(about = "Hedgehog Gateway intent validator", long_about = None)]
pub(crate) struct Cmdline {
    #[arg(long, value_enum, default_value = "validate", help = "What to do with the input")]
    pub mode: Mode,

    #[arg(long, value_enum, default_value = "agent", help = "Kind of the object read from stdin")]
    pub kind: Kind,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory holding the other intent objects (YAML or JSON), for cross-object checks"
    )]
    pub siblings: Option<PathBuf>,

    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warning",
        help = "Log level on stderr: off, error, warning, info, debug or trace"
    )]
    pub log_level: String,

    #[arg(long, value_enum, default_value = "yaml", help = "Format of the reply")]
    pub output: Output,
}
