use clap::Parser;
use std::path::PathBuf;

/// Extract normalized text from every document under a directory.
///
/// Classifies files by suffix, extracts PDFs, spreadsheets, word and
/// plain-text documents, and reports a per-file outcome.
#[derive(Parser, Debug)]
#[command(name = "docsift", version, about)]
pub struct CliArgs {
    /// Root directory to scan recursively
    pub root: PathBuf,

    /// Page-range workers per PDF
    #[arg(long, env = "DOCSIFT_PDF_WORKERS")]
    pub workers: Option<usize>,

    /// Per-PDF worker timeout in seconds (0 disables it)
    #[arg(long, env = "DOCSIFT_WORKER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Keep image files in the batch and record them as skipped
    #[arg(
        long,
        env = "DOCSIFT_INCLUDE_IMAGES",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub include_images: bool,

    /// Directory where extracted text is staged for indexing
    #[arg(long, env = "DOCSIFT_STAGE_DIR")]
    pub stage_dir: Option<PathBuf>,

    /// Write the per-file records and summary as JSON to this path
    #[arg(long, env = "DOCSIFT_REPORT")]
    pub report: Option<PathBuf>,
}
