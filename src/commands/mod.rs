//! CLI command definitions and argument parsing.
//!
//! Defines the `migasfree-sdk` command line with clap's builder API. Each
//! subcommand maps onto one `RestClient` operation.

use clap::Command;

pub mod params;

pub use params::*;

/// Build the full command tree
pub fn cli_command() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(server_parameter())
        .arg(user_parameter())
        .arg(token_parameter())
        .arg(save_token_parameter())
        .arg(api_version_parameter())
        .arg(https_parameter())
        .arg(verbose_parameter())
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get a single resource by ID, or the only one matching the filters")
                .arg(endpoint_parameter())
                .arg(id_parameter())
                .arg(param_parameter().conflicts_with(PARAMETER_ID)),
        )
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List every resource matching the filters, one JSON document per line")
                .arg(endpoint_parameter())
                .arg(param_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_EXPORT)
                .about("Export resources matching the filters to a CSV file")
                .arg(endpoint_parameter())
                .arg(param_parameter())
                .arg(field_parameter())
                .arg(output_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_ADD)
                .about("Create a resource and print its ID")
                .arg(endpoint_parameter())
                .arg(data_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a resource by ID")
                .arg(endpoint_parameter())
                .arg(id_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_TOKEN)
                .about("Authenticate and print the path of the token cache file"),
        )
}
