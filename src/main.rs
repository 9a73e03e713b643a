use clap::Parser;
use tokio::signal;
use tracing::info;

use triarb::adapter::inbound::cli::command::{Cli, Commands, ConfigCommand};
use triarb::adapter::inbound::cli::output::{self, OutputConfig};
use triarb::adapter::inbound::cli::{config, run, scan};
use triarb::error::Result;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    if let Err(e) = dispatch(cli.command).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => {
            tokio::select! {
                result = run::execute(&args) => result,
                _ = signal::ctrl_c() => {
                    info!("shutdown signal received");
                    Ok(())
                }
            }
        }
        Commands::Scan(arg) => scan::execute(&arg.config).await,
        Commands::Config(ConfigCommand::Validate(arg)) => config::execute_validate(&arg.config),
    }
}
