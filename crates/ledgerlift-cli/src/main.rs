//! LedgerLift CLI - statement ingestion pipeline
//!
//! Usage:
//!   ledgerlift process statement.csv   Parse + normalize into a session
//!   ledgerlift load <session-id>       Load a session into the store
//!   ledgerlift ingest statement.pdf    Process and load in one go
//!   ledgerlift serve --port 8000       Start the web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Process { file, ext } => {
            commands::cmd_process(&file, ext.as_deref(), &cli.data_dir)
        }
        Commands::Load { session_id } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_load(&db, &cli.data_dir, &session_id)
        }
        Commands::Ingest { file, ext } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_ingest(&db, &file, ext.as_deref(), &cli.data_dir)
        }
        Commands::Sessions => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_sessions(&db)
        }
        Commands::Clean { session, all } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_clean(&db, &cli.data_dir, session.as_deref(), all)
        }
        Commands::Serve { port, host } => {
            commands::cmd_serve(&cli.db, &cli.data_dir, &host, port).await
        }
    }
}
