use color_print::ceprintln;
use migasfree_sdk::commands::{cli_command, PARAMETER_VERBOSE};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::execute_command;

/// Main entry point for the program
fn main() {
    let matches = cli_command().get_matches();

    // Intialize the logging subsystem; --verbose wins over RUST_LOG
    let verbose = matches.get_flag(PARAMETER_VERBOSE)
        || matches
            .subcommand()
            .is_some_and(|(_, sub_matches)| sub_matches.get_flag(PARAMETER_VERBOSE));
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute_command(&matches) {
        ceprintln!("<r>ERROR:</r> {}", e);
        ::std::process::exit(e.exit_code().code());
    }
}
