// src/main.rs
mod utils;
mod source;
mod extractors;
mod storage;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use utils::AppError;
use extractors::{IssueExtractor, DEFAULT_TOC_MARKER};
use storage::StorageManager;

/// Environment variable consulted when `--marker` is not given
const TOC_MARKER_ENV: &str = "TOC_MARKER";

/// Command Line Interface for the journal issue TOC extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Issue to process (.pdf, pdftohtml .xml dump, or .json fragment dump)
    path: PathBuf,

    /// Literal text that opens the table of contents
    #[arg(short, long)]
    marker: Option<String>,

    /// pdftohtml binary used to read PDF files
    #[arg(long, default_value = "pdftohtml")]
    pdftohtml: String,

    /// Output directory for saved records (nothing is saved when omitted)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Debug mode - save TOC region text and annotated views
    #[arg(short, long)]
    debug: bool,
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // Usage errors (e.g. missing path) exit with 1
                let _ = e.print();
                std::process::exit(1);
            }
        },
    }
}

fn resolve_marker(args: &Args) -> String {
    if let Some(marker) = &args.marker {
        tracing::debug!("Using TOC marker '{}' from command-line argument", marker);
        return marker.clone();
    }
    match std::env::var(TOC_MARKER_ENV) {
        Ok(marker) if !marker.trim().is_empty() => {
            tracing::debug!("Using TOC marker '{}' from {}", marker, TOC_MARKER_ENV);
            marker
        }
        _ => DEFAULT_TOC_MARKER.to_string(),
    }
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = parse_args();
    tracing::info!("Starting processing for args: {:?}", args);

    let marker = resolve_marker(&args);
    if marker.trim().is_empty() {
        return Err(AppError::Config("TOC marker must not be empty".to_string()));
    }

    let document_stem = args
        .path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string();

    // 3. Open the document; it is released when `document` goes out of scope
    let document = source::open(&args.path, &args.pdftohtml)?;

    // 4. Run the extraction pipeline
    let extractor = IssueExtractor::new(&marker);
    let extraction = extractor.extract(&document)?;

    // 5. Debug artifacts
    if args.debug {
        let base = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("./output"));
        let debug_dir = base.join(&document_stem).join("debug");
        match utils::toc_debug::save_toc_debug(&debug_dir, extractor.toc(), &extraction) {
            Ok(paths) => tracing::info!("Saved {} debug artifacts to {}", paths.len(), debug_dir.display()),
            Err(e) => tracing::warn!("Failed to save debug artifacts: {}", e),
        }
    }

    // 6. Save records if an output directory was requested
    if let Some(output_dir) = &args.output_dir {
        let storage = StorageManager::new(output_dir)?;
        storage.save_records(&document_stem, &extraction)?;
        storage.save_metadata(&document_stem, &args.path, &extraction)?;
    }

    // 7. Print the records
    let records = serde_json::to_string_pretty(&extraction.records)
        .map_err(|e| AppError::Processing(format!("Failed to serialize records: {}", e)))?;
    println!("{}", records);

    tracing::info!(
        "Processing finished. Articles: {}, resolved: {}",
        extraction.records.len(),
        extraction.resolved_count()
    );

    Ok(())
}
