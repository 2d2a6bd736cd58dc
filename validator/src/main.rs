// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! An intent validator. It runs the same defaulting, validation and compilation as the
//! gateway controller, on one object read as JSON or YAML from stdin, and produces a result
//! as a YAML (or JSON) string on stdout. Other objects of the fabric may be supplied as a
//! directory of files for cross-object checks.

#![deny(clippy::all)]
#![allow(clippy::result_large_err)]

mod cmdline;

use clap::Parser;
use config::{AgentError, InvalidError, SiblingLookup, Validate, build_agent, compile};
use k8s_intf::{
    Defaultable, Gateway, GatewayAgent, GatewayGroup, GatewayGroupSpec, LoadError, Peering, VpcInfo,
    load_crd_from_str,
};
use k8s_less::{IntentObject, SiblingStore, load_siblings_dir};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};
use wire::GatewayConfig;

use crate::cmdline::{Cmdline, Kind, Mode, Output};

/// The type representing an error when validating a request
#[derive(Debug)]
enum ValidateError {
    /// This type contains errors that may occur when using this tool.
    EnvironmentError(String),

    /// This type contains errors that may occur when deserializing from JSON or YAML.
    DeserializeError(String),

    /// This type contains errors that may occur if the metadata is incomplete or wrong.
    MetadataError(String),

    /// The object is well formed but was rejected. The user is responsible for these.
    Configuration(InvalidError),

    /// A tenant the object depends on is not provisioned yet. Retrying later may succeed.
    NotReady(String),

    /// A dataplane configuration could not be built.
    CompileError(String),
}

impl ValidateError {
    /// Provide a string indicating the type of error
    fn get_type(&self) -> &str {
        match self {
            ValidateError::EnvironmentError(_) => "Environment",
            ValidateError::DeserializeError(_) => "Deserialization",
            ValidateError::MetadataError(_) => "Metadata",
            ValidateError::Configuration(_) => "Configuration",
            ValidateError::NotReady(_) => "NotReady",
            ValidateError::CompileError(_) => "Compilation",
        }
    }

    fn get_msg(&self) -> String {
        match self {
            ValidateError::EnvironmentError(v)
            | ValidateError::DeserializeError(v)
            | ValidateError::MetadataError(v)
            | ValidateError::NotReady(v)
            | ValidateError::CompileError(v) => v.clone(),
            ValidateError::Configuration(e) => e.to_string(),
        }
    }

    fn get_context(&self) -> Option<String> {
        match self {
            ValidateError::Configuration(e) => Some(e.class().to_string()),
            _ => None,
        }
    }
}

impl From<AgentError> for ValidateError {
    fn from(e: AgentError) -> Self {
        match e {
            AgentError::NotReady(_) => ValidateError::NotReady(e.to_string()),
            AgentError::MissingName => ValidateError::MetadataError(e.to_string()),
        }
    }
}

impl From<&ValidateError> for ValidateReply {
    fn from(value: &ValidateError) -> Self {
        ValidateReply {
            success: false,
            errors: vec![ValidateErrorOut {
                r#type: value.get_type().to_owned(),
                message: value.get_msg(),
                context: value.get_context(),
            }],
            config: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ValidateErrorOut {
    r#type: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

/// The type representing the outcome of a validation request
#[derive(Debug, Serialize, Deserialize)]
struct ValidateReply {
    success: bool,
    errors: Vec<ValidateErrorOut>,
    /// The dataplane configuration, when compiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<GatewayConfig>,
}

impl ValidateReply {
    fn success(config: Option<GatewayConfig>) -> Self {
        Self {
            success: true,
            errors: vec![],
            config,
        }
    }
}

/// What was read from stdin
enum Input {
    Object(IntentObject),
    Agent(GatewayAgent),
}

fn deserialize<T: DeserializeOwned>(input: &str) -> Result<T, ValidateError> {
    load_crd_from_str(input).map_err(|e: LoadError| ValidateError::DeserializeError(e.to_string()))
}

/// Deserialize JSON/YAML text as an object of kind `kind`
fn parse_input(kind: Kind, input: &str) -> Result<Input, ValidateError> {
    let input = match kind {
        Kind::Gateway => Input::Object(IntentObject::Gateway(deserialize(input)?)),
        Kind::Gatewaygroup => Input::Object(IntentObject::GatewayGroup(deserialize(input)?)),
        Kind::Peering => Input::Object(IntentObject::Peering(deserialize(input)?)),
        Kind::Vpcinfo => Input::Object(IntentObject::VpcInfo(deserialize(input)?)),
        Kind::Agent => Input::Agent(deserialize(input)?),
    };
    let name = match &input {
        Input::Object(object) => object.name(),
        Input::Agent(agent) => agent.metadata.name.as_deref().unwrap_or_default(),
    };
    if name.is_empty() {
        return Err(ValidateError::MetadataError(
            "Missing object name".to_string(),
        ));
    }
    Ok(input)
}

/// Default then validate one object
fn validated<T: Defaultable + Validate>(
    object: &T,
    siblings: Option<&dyn SiblingLookup>,
) -> Result<T, ValidateError> {
    let object = object.defaulted();
    object
        .validate(siblings)
        .map_err(ValidateError::Configuration)?;
    Ok(object)
}

fn validate_object(
    object: &IntentObject,
    siblings: Option<&dyn SiblingLookup>,
) -> Result<(), ValidateError> {
    match object {
        IntentObject::Gateway(o) => validated(o, siblings).map(drop),
        IntentObject::GatewayGroup(o) => validated(o, siblings).map(drop),
        IntentObject::Peering(o) => validated(o, siblings).map(drop),
        IntentObject::VpcInfo(o) => validated(o, siblings).map(drop),
    }?;
    debug!("{} {} is valid", object.kind(), object.name());
    Ok(())
}

/// The objects an agent was assembled from, as far as they can be recovered from it, plus the
/// gateways and groups of the fabric when those were supplied. Tenants and peerings always come
/// from the agent.
fn agent_siblings(agent: &GatewayAgent, fabric: Option<&SiblingStore>) -> SiblingStore {
    let mut store = SiblingStore::new();
    if let Some(fabric) = fabric {
        for gateway in fabric.gateways() {
            store.insert(IntentObject::Gateway(gateway.clone()));
        }
        for group in fabric.gateway_groups() {
            store.insert(IntentObject::GatewayGroup(group.clone()));
        }
    }
    for (name, data) in &agent.spec.vpcs {
        let mut vpc = VpcInfo::new(name, data.spec.clone());
        vpc.status = Some(data.status.clone());
        store.insert(IntentObject::VpcInfo(vpc));
    }
    for (name, spec) in &agent.spec.peerings {
        store.insert(IntentObject::Peering(Peering::new(name, spec.clone())));
    }
    for name in agent.spec.groups.keys() {
        store.insert(IntentObject::GatewayGroup(GatewayGroup::new(
            name,
            GatewayGroupSpec {},
        )));
    }
    store
}

/// Validate everything an agent carries, then build its configuration
fn process_agent(
    agent: &GatewayAgent,
    fabric: Option<&SiblingStore>,
) -> Result<GatewayConfig, ValidateError> {
    let store = agent_siblings(agent, fabric);
    let name = agent.metadata.name.as_deref().unwrap_or_default();
    validated(&Gateway::new(name, agent.spec.gateway.clone()), Some(&store))?;
    for vpc in store.vpc_infos() {
        validated(vpc, Some(&store))?;
    }
    for peering in store.peerings() {
        validated(peering, Some(&store))?;
    }
    compile(agent).map_err(|e| ValidateError::CompileError(e.to_string()))
}

/// Validate or compile the object read from stdin
fn process(
    mode: Mode,
    kind: Kind,
    input: &str,
    siblings: Option<&SiblingStore>,
) -> Result<Option<GatewayConfig>, ValidateError> {
    let lookup = siblings.map(|s| s as &dyn SiblingLookup);
    match (mode, parse_input(kind, input)?) {
        (Mode::Validate, Input::Object(object)) => {
            validate_object(&object, lookup)?;
            Ok(None)
        }
        (Mode::Validate, Input::Agent(agent)) => {
            process_agent(&agent, siblings)?;
            Ok(None)
        }
        (Mode::Compile, Input::Agent(agent)) => process_agent(&agent, siblings).map(Some),
        (Mode::Compile, Input::Object(IntentObject::Gateway(gateway))) => {
            let Some(store) = siblings else {
                return Err(ValidateError::EnvironmentError(
                    "Compiling a gateway requires --siblings".to_string(),
                ));
            };
            let gateway = validated(&gateway, lookup)?;
            let agent = build_agent(
                &gateway,
                store.gateways(),
                store.vpc_infos(),
                store.peerings(),
            )?;
            info!(
                "Built agent for {}: {} VPCs, {} peerings",
                agent.metadata.name.as_deref().unwrap_or_default(),
                agent.spec.vpcs.len(),
                agent.spec.peerings.len()
            );
            compile(&agent)
                .map(Some)
                .map_err(|e| ValidateError::CompileError(e.to_string()))
        }
        (Mode::Compile, Input::Object(object)) => Err(ValidateError::EnvironmentError(format!(
            "Cannot compile a {}: only gateways and agents can be compiled",
            object.kind()
        ))),
    }
}

fn init_logging(level: &str) -> Result<(), ValidateError> {
    let level =
        tracectl::level_from_name(level).map_err(|e| ValidateError::EnvironmentError(e.to_string()))?;
    tracectl::init(level).map_err(|e| ValidateError::EnvironmentError(e.to_string()))
}

fn load_siblings(dir: &Path) -> Result<SiblingStore, ValidateError> {
    load_siblings_dir(dir)
        .map(|store| store.defaulted())
        .map_err(|e| ValidateError::EnvironmentError(e.to_string()))
}

fn run(cmd: &Cmdline) -> Result<Option<GatewayConfig>, ValidateError> {
    init_logging(&cmd.log_level)?;
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| ValidateError::EnvironmentError(format!("Failed to read from stdin: {e}")))?;
    let siblings = cmd.siblings.as_deref().map(load_siblings).transpose()?;
    process(cmd.mode, cmd.kind, &input, siblings.as_ref())
}

/// Build a validation reply to be output as YAML or JSON
fn build_reply(result: Result<Option<GatewayConfig>, ValidateError>) -> ValidateReply {
    match result {
        Ok(config) => ValidateReply::success(config),
        Err(e) => ValidateReply::from(&e),
    }
}

fn render(reply: &ValidateReply, output: Output) -> Result<String, String> {
    match output {
        Output::Yaml => serde_yaml_ng::to_string(reply).map_err(|e| e.to_string()),
        Output::Json => serde_json::to_string_pretty(reply).map_err(|e| e.to_string()),
    }
}

fn main() {
    let cmd = Cmdline::parse();
    let reply = build_reply(run(&cmd));
    match render(&reply, cmd.output) {
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("Failure serializing validation response: {e}"),
    }
}
