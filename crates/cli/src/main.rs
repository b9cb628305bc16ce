//! Ferry CLI: offline diagnostics for the SQL pushdown adapter.
//!
//! # Commands
//!
//! - `dialects`: List registered SQL dialects and the properties they accept.
//! - `capabilities`: Show the capabilities a dialect reports, after exclusions.
//! - `map-type`: Map a remote column type into the canonical type system.
//! - `validate`: Check a virtual schema property file without touching the remote.

use clap::{Parser, Subcommand};
use ferry_error::{ErrorCategory, FerryError};
use owo_colors::OwoColorize;

mod commands;
mod exit_codes;
mod output;

use commands::MapTypeArgs;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Inspect Ferry dialects, capabilities and virtual schema properties", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (human, json, yaml)
    #[arg(long, global = true, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Log level (SEVERE .. FINEST, or error .. trace)
    #[arg(long, global = true, env = "FERRY_LOG_LEVEL", default_value = "WARNING")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered SQL dialects
    Dialects,
    /// Show the capabilities a dialect reports to the host
    Capabilities {
        /// Dialect name (case-insensitive)
        dialect: String,
        /// Comma-separated EXCLUDED_CAPABILITIES value
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Map a remote column type through a dialect's type mapper
    MapType(MapTypeArgs),
    /// Validate a virtual schema property file
    Validate {
        /// Path to the YAML property file
        #[arg(default_value = "schemas.yaml")]
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = ferry_common::telemetry::init_logging(Some(cli.log_level.as_str())) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    if let Err(e) = run_cli(&cli) {
        let exit_code = map_error_to_exit_code(&e);
        if cli.output.is_machine_readable() {
            let error = e.downcast_ref::<FerryError>().cloned();
            output::print_error(cli.output, &e.to_string(), exit_code, ErrorDetails { error }).ok();
        } else {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        std::process::exit(exit_code);
    }
}

#[derive(serde::Serialize)]
struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<FerryError>,
}

fn map_error_to_exit_code(e: &anyhow::Error) -> i32 {
    if let Some(ferry_err) = e.downcast_ref::<FerryError>() {
        return match ferry_err.category() {
            ErrorCategory::Connectivity => exit_codes::CONNECTION_ERROR,
            ErrorCategory::Config => exit_codes::CONFIG_ERROR,
            ErrorCategory::Query => exit_codes::QUERY_ERROR,
            ErrorCategory::Internal => exit_codes::GENERAL_ERROR,
            _ => exit_codes::GENERAL_ERROR,
        };
    }

    if e.downcast_ref::<std::io::Error>().is_some() {
        return exit_codes::USAGE_ERROR;
    }
    exit_codes::GENERAL_ERROR
}

fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Dialects => commands::dialects(cli.output),
        Commands::Capabilities { dialect, exclude } => {
            commands::capabilities(dialect, exclude.as_deref(), cli.output)
        }
        Commands::MapType(args) => commands::map_type(args, cli.output),
        Commands::Validate { file } => commands::validate(file, cli.output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ferry_error::ErrorCode;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_map_type_arguments() {
        let cli = Cli::try_parse_from([
            "ferry", "map-type", "oracle", "--jdbc-type", "-101", "--scale", "6", "--output", "json",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::MapType(args) => {
                assert_eq!(args.dialect, "oracle");
                assert_eq!(args.jdbc_type, -101);
                assert_eq!(args.scale, 6);
                assert_eq!(args.size, 0);
            }
            _ => panic!("expected map-type"),
        }
    }

    #[test]
    fn test_exit_codes_follow_error_category() {
        let config: anyhow::Error = FerryError::new(ErrorCode::UnknownDialect, "nope").into();
        assert_eq!(map_error_to_exit_code(&config), exit_codes::CONFIG_ERROR);

        let remote: anyhow::Error = FerryError::new(ErrorCode::ConnectionFailed, "down").into();
        assert_eq!(map_error_to_exit_code(&remote), exit_codes::CONNECTION_ERROR);

        let query: anyhow::Error = FerryError::new(ErrorCode::TableCountExceeded, "big").into();
        assert_eq!(map_error_to_exit_code(&query), exit_codes::QUERY_ERROR);

        let io: anyhow::Error =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(map_error_to_exit_code(&io), exit_codes::USAGE_ERROR);

        assert_eq!(
            map_error_to_exit_code(&anyhow::anyhow!("other")),
            exit_codes::GENERAL_ERROR
        );
    }
}
