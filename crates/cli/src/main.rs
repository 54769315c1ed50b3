//! Harbor CLI - session store and API tooling.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! harbor-cli migrate
//!
//! # Delete expired sessions (run from cron)
//! harbor-cli purge-sessions
//!
//! # Check the commerce API is reachable with the configured key
//! harbor-cli check-api
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "harbor-cli")]
#[command(author, version, about = "Harbor storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session table
    Migrate,
    /// Delete expired sessions
    PurgeSessions,
    /// Check the commerce API is reachable
    CheckApi,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await,
        Commands::PurgeSessions => commands::migrate::purge_expired().await,
        Commands::CheckApi => commands::api::check().await,
    }
}
