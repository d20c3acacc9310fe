mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use collab_exercises::config::ClientConfig;
use collab_exercises::error::ErrorCode;
use collab_exercises::gateway::Gateway;
use collab_exercises::session::FileSessionStore;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, CliError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}]: {e}", e.error_code());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::resolve(cli.api_url, cli.session_file)?;
    tracing::debug!(api_url = %config.api_url, session_file = %config.session_file.display(), "config resolved");

    let session = Arc::new(FileSessionStore::new(config.session_file));
    let gateway = Gateway::new(&config.api_url, session)?;
    cli::run(&gateway, cli.command).await
}
