//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};

use ledgerlift_core::{
    db::Database,
    models::SourceFormat,
    pipeline::{self, CLEANED_CSV_NAME},
};

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Resolve the format from --ext or the file extension
fn resolve_format(file: &Path, ext: Option<&str>) -> Result<SourceFormat> {
    let ext = match ext {
        Some(e) => e.to_string(),
        None => file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_string())
            .context("File has no extension; specify --ext")?,
    };
    SourceFormat::from_extension(&ext)
        .with_context(|| format!("Unsupported format: {} (expected csv, xls, xlsx, or pdf)", ext))
}

pub fn cmd_process(file: &Path, ext: Option<&str>, data_dir: &Path) -> Result<()> {
    let format = resolve_format(file, ext)?;

    println!("📄 Processing {} ({} format)...", file.display(), format);

    let outcome = pipeline::process_file(file, format, data_dir)
        .with_context(|| format!("Failed to process {}", file.display()))?;

    println!("✅ Processed {} rows", outcome.rows);
    println!("   Session: {}", outcome.session_id);
    println!("   Cleaned CSV: {}", outcome.csv_path.display());
    println!();
    println!("   Load it with: ledgerlift load {}", outcome.session_id);

    Ok(())
}

pub fn cmd_load(db: &Database, data_dir: &Path, session_id: &str) -> Result<()> {
    let csv_path = pipeline::session_dir(data_dir, session_id).join(CLEANED_CSV_NAME);
    if !csv_path.exists() {
        anyhow::bail!(
            "No processed data for session {} (expected {})",
            session_id,
            csv_path.display()
        );
    }

    println!("📥 Loading session {}...", session_id);

    let loaded = db
        .load_session(&csv_path, session_id)
        .context("Load failed")?;

    println!("✅ Loaded {} transactions", loaded);
    Ok(())
}

pub fn cmd_ingest(db: &Database, file: &Path, ext: Option<&str>, data_dir: &Path) -> Result<()> {
    let format = resolve_format(file, ext)?;

    println!("📄 Ingesting {} ({} format)...", file.display(), format);

    let outcome = pipeline::process_file(file, format, data_dir)
        .with_context(|| format!("Failed to process {}", file.display()))?;
    let loaded = db
        .load_session(&outcome.csv_path, &outcome.session_id)
        .context("Load failed")?;

    println!("✅ Ingest complete!");
    println!("   Session: {}", outcome.session_id);
    println!("   Normalized: {}", outcome.rows);
    println!("   Loaded: {}", loaded);

    Ok(())
}

pub fn cmd_sessions(db: &Database) -> Result<()> {
    let summaries = db.session_summaries()?;

    if summaries.is_empty() {
        println!("No sessions loaded.");
        return Ok(());
    }

    println!("{} session(s):", summaries.len());
    for s in summaries {
        let range = match (s.first_txn_date, s.last_txn_date) {
            (Some(first), Some(last)) => format!("{} → {}", first, last),
            _ => "-".to_string(),
        };
        println!("   {}  {} rows  {}", s.session_id, s.record_count, range);
    }

    Ok(())
}

pub fn cmd_clean(
    db: &Database,
    data_dir: &Path,
    session: Option<&str>,
    all: bool,
) -> Result<()> {
    let deleted = if all {
        pipeline::cleanup_all(db, data_dir).context("Cleanup failed")?
    } else if let Some(session_id) = session {
        pipeline::cleanup_session(db, data_dir, session_id).context("Cleanup failed")?
    } else {
        anyhow::bail!("Specify --session <id> or --all");
    };

    println!("✅ Cleanup completed ({} records removed)", deleted);
    Ok(())
}

pub async fn cmd_serve(db_path: &Path, data_dir: &Path, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting LedgerLift server...");
    println!("   Database: {}", db_path.display());
    println!("   Data dir: {}", data_dir.display());
    println!("   Listening: http://{}:{}", host, port);
    println!();
    println!("   Press Ctrl+C to stop");

    // A missing or unopenable store is fatal before any request
    let db = open_db(db_path)?;

    ledgerlift_server::serve(db, data_dir.to_path_buf(), host, port).await?;

    Ok(())
}
