//! Command-line interface definitions.
//!
//! Defines the CLI structure for the triarb application using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Triangular arbitrage scanner and executor
#[derive(Parser, Debug)]
#[command(name = "triarb")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scan loop against the configured venue
    Run(RunArgs),

    /// Scan once and print every triangle's yields
    Scan(ConfigPathArg),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `triarb config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Number of scan cycles, overriding `scan.num_scans`
    #[arg(long)]
    pub scans: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_scans_and_trailing_json() {
        let cli = Cli::parse_from(["triarb", "run", "--config", "a.toml", "--scans", "3", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.scans, Some(3));
                assert_eq!(args.config, PathBuf::from("a.toml"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_validate_defaults_path() {
        let cli = Cli::parse_from(["triarb", "config", "validate"]);
        match cli.command {
            Commands::Config(ConfigCommand::Validate(arg)) => {
                assert_eq!(arg.config, PathBuf::from("config.toml"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
