use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use migasfree_sdk::{
    client::RestClient,
    commands::{
        COMMAND_ADD, COMMAND_DELETE, COMMAND_EXPORT, COMMAND_GET, COMMAND_LIST, COMMAND_TOKEN,
        PARAMETER_API_VERSION, PARAMETER_DATA, PARAMETER_ENDPOINT, PARAMETER_FIELD,
        PARAMETER_HTTPS, PARAMETER_ID, PARAMETER_OUTPUT, PARAMETER_PARAM, PARAMETER_SAVE_TOKEN,
        PARAMETER_SERVER, PARAMETER_TOKEN, PARAMETER_USER,
    },
    error::ApiError,
    exit_codes::SdkExitCode,
    model::{Param, Params, Protocol},
};
use serde_json::Value;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Undefined or unsupported subcommand")]
    UnsupportedSubcommand(String),
    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),
    #[error("{0}")]
    ApiError(#[from] ApiError),
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> SdkExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) | CliError::MissingRequiredArgument(_) => {
                SdkExitCode::UsageError
            }
            CliError::JsonError(_) => SdkExitCode::DataError,
            CliError::ApiError(e) => match e {
                ApiError::Authentication { .. } | ApiError::Credential => SdkExitCode::AuthError,
                ApiError::NotFound => SdkExitCode::NotFound,
                ApiError::AmbiguousResult { .. } => SdkExitCode::DataError,
                ApiError::Transport(_) => SdkExitCode::NetworkError,
                ApiError::Configuration(_) => SdkExitCode::ConfigError,
                ApiError::Export(_) | ApiError::TokenCache(_) => SdkExitCode::CantCreate,
                _ => SdkExitCode::ApiError,
            },
        }
    }
}

fn required<'a>(sub_matches: &'a ArgMatches, name: &str) -> Result<&'a String, CliError> {
    sub_matches
        .get_one::<String>(name)
        .ok_or_else(|| CliError::MissingRequiredArgument(name.to_string()))
}

fn params(sub_matches: &ArgMatches) -> Params {
    sub_matches
        .get_many::<(String, String)>(PARAMETER_PARAM)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Build a client from the global options; the builder fills in the rest from the configuration file
fn build_client(sub_matches: &ArgMatches) -> Result<RestClient, CliError> {
    let mut builder = RestClient::builder();

    if let Some(server) = sub_matches.get_one::<String>(PARAMETER_SERVER) {
        builder = builder.server(server);
    }
    if let Some(user) = sub_matches.get_one::<String>(PARAMETER_USER) {
        builder = builder.user(user);
    }
    if let Some(token) = sub_matches.get_one::<String>(PARAMETER_TOKEN) {
        builder = builder.token(token);
    }
    if let Some(version) = sub_matches.get_one::<u32>(PARAMETER_API_VERSION) {
        builder = builder.api_version(*version);
    }
    if sub_matches.get_flag(PARAMETER_HTTPS) {
        builder = builder.protocol(Protocol::Https);
    }

    Ok(builder
        .save_token(sub_matches.get_flag(PARAMETER_SAVE_TOKEN))
        .build()?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn execute_command(matches: &ArgMatches) -> Result<(), CliError> {
    match matches.subcommand() {
        Some((COMMAND_GET, sub_matches)) => {
            let client = build_client(sub_matches)?;
            let endpoint = required(sub_matches, PARAMETER_ENDPOINT)?;
            let param = match sub_matches.get_one::<u64>(PARAMETER_ID) {
                Some(id) => Param::Id(*id),
                None => Param::Filter(params(sub_matches)),
            };
            print_json(&client.get(endpoint, param)?)
        }
        Some((COMMAND_LIST, sub_matches)) => {
            let client = build_client(sub_matches)?;
            let endpoint = required(sub_matches, PARAMETER_ENDPOINT)?;
            for element in client.filter(endpoint, params(sub_matches)) {
                println!("{}", serde_json::to_string(&element?)?);
            }
            Ok(())
        }
        Some((COMMAND_EXPORT, sub_matches)) => {
            let client = build_client(sub_matches)?;
            let endpoint = required(sub_matches, PARAMETER_ENDPOINT)?;
            let fields: Vec<String> = sub_matches
                .get_many::<String>(PARAMETER_FIELD)
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let output = sub_matches
                .get_one::<PathBuf>(PARAMETER_OUTPUT)
                .cloned()
                .unwrap_or_else(|| PathBuf::from("output.csv"));

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(format!("Exporting {}...", endpoint));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let result = client.export_csv(endpoint, params(sub_matches), &fields, &output);
            match result {
                Ok(rows) => {
                    spinner.finish_with_message(format!(
                        "Exported {} rows to {}",
                        rows,
                        output.display()
                    ));
                    Ok(())
                }
                Err(e) => {
                    spinner.abandon_with_message(format!("Export of {} failed", endpoint));
                    Err(e.into())
                }
            }
        }
        Some((COMMAND_ADD, sub_matches)) => {
            let client = build_client(sub_matches)?;
            let endpoint = required(sub_matches, PARAMETER_ENDPOINT)?;
            let data = sub_matches
                .get_one::<Value>(PARAMETER_DATA)
                .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_DATA.to_string()))?;
            print_json(&client.add(endpoint, data)?)
        }
        Some((COMMAND_DELETE, sub_matches)) => {
            let client = build_client(sub_matches)?;
            let endpoint = required(sub_matches, PARAMETER_ENDPOINT)?;
            let id = sub_matches
                .get_one::<u64>(PARAMETER_ID)
                .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_ID.to_string()))?;
            let response = client.delete(endpoint, *id)?;
            if !response.status().is_success() {
                return Err(ApiError::Http {
                    status: response.status().as_u16(),
                }
                .into());
            }
            Ok(())
        }
        Some((COMMAND_TOKEN, sub_matches)) => {
            let client = build_client(sub_matches)?;
            println!("{}", client.token_file()?.display());
            Ok(())
        }
        Some((other, _)) => Err(CliError::UnsupportedSubcommand(other.to_string())),
        None => Err(CliError::UnsupportedSubcommand("none".to_string())),
    }
}
