//! Shared command parameters for all CLI commands.
//!
//! Parameter names and argument builders used by more than one subcommand.

use clap::{value_parser, Arg, ArgAction};
use std::path::PathBuf;

// Resource commands
pub const COMMAND_GET: &str = "get";
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_EXPORT: &str = "export";
pub const COMMAND_ADD: &str = "add";
pub const COMMAND_DELETE: &str = "delete";
pub const COMMAND_TOKEN: &str = "token";

// Global parameters
pub const PARAMETER_SERVER: &str = "server";
pub const PARAMETER_USER: &str = "user";
pub const PARAMETER_TOKEN: &str = "token";
pub const PARAMETER_SAVE_TOKEN: &str = "save-token";
pub const PARAMETER_API_VERSION: &str = "api-version";
pub const PARAMETER_HTTPS: &str = "https";
pub const PARAMETER_VERBOSE: &str = "verbose";

// Command parameters
pub const PARAMETER_ENDPOINT: &str = "endpoint";
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_PARAM: &str = "param";
pub const PARAMETER_FIELD: &str = "field";
pub const PARAMETER_OUTPUT: &str = "output";
pub const PARAMETER_DATA: &str = "data";

pub fn server_parameter() -> Arg {
    Arg::new(PARAMETER_SERVER)
        .short('s')
        .long(PARAMETER_SERVER)
        .num_args(1)
        .env("MIGASFREE_SDK_SERVER")
        .global(true)
        .help("Server host, optionally with :port (defaults to the configuration file)")
}

pub fn user_parameter() -> Arg {
    Arg::new(PARAMETER_USER)
        .short('u')
        .long(PARAMETER_USER)
        .num_args(1)
        .global(true)
        .help("User name to authenticate as")
}

pub fn token_parameter() -> Arg {
    Arg::new(PARAMETER_TOKEN)
        .long(PARAMETER_TOKEN)
        .num_args(1)
        .env("MIGASFREE_SDK_TOKEN")
        .hide_env_values(true)
        .global(true)
        .help("API token; skips the token cache and the password prompt")
}

pub fn save_token_parameter() -> Arg {
    Arg::new(PARAMETER_SAVE_TOKEN)
        .long(PARAMETER_SAVE_TOKEN)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Save a newly obtained token in the user's token cache file")
}

pub fn api_version_parameter() -> Arg {
    Arg::new(PARAMETER_API_VERSION)
        .long(PARAMETER_API_VERSION)
        .num_args(1)
        .global(true)
        .value_parser(value_parser!(u32))
        .help("API version (defaults to the configuration file, then 1)")
}

pub fn https_parameter() -> Arg {
    Arg::new(PARAMETER_HTTPS)
        .long(PARAMETER_HTTPS)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Use HTTPS instead of HTTP")
}

pub fn verbose_parameter() -> Arg {
    Arg::new(PARAMETER_VERBOSE)
        .short('v')
        .long(PARAMETER_VERBOSE)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable verbose output for debugging")
}

pub fn endpoint_parameter() -> Arg {
    Arg::new(PARAMETER_ENDPOINT)
        .required(true)
        .help("Resource collection, e.g. computers or packages")
}

pub fn id_parameter() -> Arg {
    Arg::new(PARAMETER_ID)
        .long(PARAMETER_ID)
        .num_args(1)
        .value_parser(value_parser!(u64))
        .help("Resource ID")
}

/// Repeated `--param key=value` filter pairs
pub fn param_parameter() -> Arg {
    Arg::new(PARAMETER_PARAM)
        .short('p')
        .long(PARAMETER_PARAM)
        .num_args(1)
        .action(ArgAction::Append)
        .value_parser(parse_key_value)
        .help("Filter as key=value; may be repeated")
}

pub fn field_parameter() -> Arg {
    Arg::new(PARAMETER_FIELD)
        .short('f')
        .long(PARAMETER_FIELD)
        .num_args(1)
        .action(ArgAction::Append)
        .help("Column to export, dotted paths reach nested fields; may be repeated")
}

pub fn output_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT)
        .short('o')
        .long(PARAMETER_OUTPUT)
        .num_args(1)
        .default_value("output.csv")
        .value_parser(value_parser!(PathBuf))
        .help("CSV file to write")
}

pub fn data_parameter() -> Arg {
    Arg::new(PARAMETER_DATA)
        .short('d')
        .long(PARAMETER_DATA)
        .num_args(1)
        .required(true)
        .value_parser(parse_json)
        .help("Resource body as a JSON object")
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", value)),
    }
}

fn parse_json(value: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(value).map_err(|e| e.to_string())
}
