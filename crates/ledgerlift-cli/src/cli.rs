//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// LedgerLift - Normalize and classify bank statements
#[derive(Parser)]
#[command(name = "ledgerlift")]
#[command(about = "Bank-statement normalization and classification pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, env = "LEDGERLIFT_DB", default_value = "ledgerlift.db", global = true)]
    pub db: PathBuf,

    /// Directory for per-session uploads and cleaned CSVs
    #[arg(long, default_value = "uploaded_data", global = true)]
    pub data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and normalize a statement into a session
    Process {
        /// Statement file (.csv, .xls, .xlsx, .pdf)
        file: PathBuf,

        /// Override the format (inferred from the extension if omitted)
        #[arg(short, long)]
        ext: Option<String>,
    },

    /// Load a processed session into the store
    Load {
        /// Session id from a previous `process`
        session_id: String,
    },

    /// Process and load a statement in one go
    Ingest {
        /// Statement file (.csv, .xls, .xlsx, .pdf)
        file: PathBuf,

        /// Override the format (inferred from the extension if omitted)
        #[arg(short, long)]
        ext: Option<String>,
    },

    /// List loaded sessions
    Sessions,

    /// Remove session data from the store and disk
    Clean {
        /// Session to remove
        #[arg(short, long)]
        session: Option<String>,

        /// Remove everything
        #[arg(long)]
        all: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
