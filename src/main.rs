// src/main.rs

mod config;
mod error;
mod export;
mod fields;
mod pdf_text;
mod report;
mod web;

use clap::{Parser, Subcommand};
use report::UploadedDoc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bill_extract")]
#[command(about = "Extract ship-to, order, phone, seller and SKU fields from PDF bills")]
struct Cli {
    /// Path to the TOML config (missing file means defaults)
    #[arg(short, long, global = true, default_value = "bill_extract.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the upload form (default)
    Serve,
    /// Extract from PDFs on disk and write a spreadsheet
    Extract {
        /// PDF files to process, in report order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output spreadsheet (defaults to the configured file name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::Config::load_or_default(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => web::serve(cfg).await,
        Commands::Extract { files, out } => {
            let out = out.unwrap_or_else(|| PathBuf::from(&cfg.export.file_name));
            extract_files(&cfg, &files, &out)
        }
    }
}

fn extract_files(
    cfg: &config::Config,
    files: &[PathBuf],
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut docs = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match std::fs::read(path) {
            Ok(bytes) => docs.push(UploadedDoc { name, bytes }),
            Err(e) => warn!(path = %path.display(), error = %e, "Cannot read file — skipping"),
        }
    }

    let report = report::process_batch(&docs, &cfg.fields);
    if report.is_empty() {
        warn!("No PDF documents were processed");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    export::save_xlsx(&report, &cfg.export.sheet_name, out)?;
    info!(rows = report.rows.len(), out = %out.display(), "Done");
    Ok(())
}
