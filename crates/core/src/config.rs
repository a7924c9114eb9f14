use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DocsiftError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, DocsiftError> {
    match env_opt(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| DocsiftError::Config(format!("{key}={v} is not a valid value"))),
        None => Ok(default),
    }
}

fn env_bool(key: &str, default: bool) -> Result<bool, DocsiftError> {
    match env_opt(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(DocsiftError::Config(format!("{key}={v} is not a boolean"))),
        },
    }
}

// ── Suffix table ──────────────────────────────────────────────

/// Recognized file suffixes per kind. Built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixTable {
    pub pdf: Vec<String>,
    pub markdown: Vec<String>,
    pub image: Vec<String>,
    pub text: Vec<String>,
    pub word: Vec<String>,
    pub excel: Vec<String>,
}

fn suffixes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for SuffixTable {
    fn default() -> Self {
        Self {
            pdf: suffixes(&[".pdf"]),
            markdown: suffixes(&[".md"]),
            image: suffixes(&[".jpg", ".jpeg", ".png", ".bmp"]),
            text: suffixes(&[".txt", ".text"]),
            word: suffixes(&[".docx", ".doc"]),
            excel: suffixes(&[".xlsx", ".xls", ".csv"]),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

pub const DEFAULT_PDF_WORKERS: usize = 4;
pub const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub suffixes: SuffixTable,
    /// Page-range workers per PDF.
    pub pdf_workers: usize,
    /// Per-PDF worker deadline in seconds. Zero waits forever.
    pub worker_timeout_secs: u64,
    /// Keep image files in the batch (recorded as skipped).
    pub include_images: bool,
    /// Where extracted text is staged for the indexing stage.
    pub stage_dir: Option<PathBuf>,
    /// External command used for legacy `.doc` files.
    pub doc_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suffixes: SuffixTable::default(),
            pdf_workers: DEFAULT_PDF_WORKERS,
            worker_timeout_secs: DEFAULT_WORKER_TIMEOUT_SECS,
            include_images: false,
            stage_dir: None,
            doc_command: "antiword".to_string(),
        }
    }
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, DocsiftError> {
        let defaults = Self::default();
        let config = Self {
            suffixes: defaults.suffixes,
            pdf_workers: env_parse("DOCSIFT_PDF_WORKERS", DEFAULT_PDF_WORKERS)?,
            worker_timeout_secs: env_parse(
                "DOCSIFT_WORKER_TIMEOUT_SECS",
                DEFAULT_WORKER_TIMEOUT_SECS,
            )?,
            include_images: env_bool("DOCSIFT_INCLUDE_IMAGES", false)?,
            stage_dir: env_opt("DOCSIFT_STAGE_DIR").map(PathBuf::from),
            doc_command: env_or("DOCSIFT_DOC_COMMAND", &defaults.doc_command),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DocsiftError> {
        if self.doc_command.trim().is_empty() {
            return Err(DocsiftError::Config("doc_command must not be empty".into()));
        }
        Ok(())
    }

    /// Worker count with `0` resolved to a single worker.
    pub fn resolved_pdf_workers(&self) -> usize {
        self.pdf_workers.max(1)
    }

    pub fn worker_timeout(&self) -> Option<Duration> {
        if self.worker_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.worker_timeout_secs))
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  pdf:     workers={}, timeout={}s",
            self.resolved_pdf_workers(),
            self.worker_timeout_secs
        );
        tracing::info!("  images:  include={}", self.include_images);
        tracing::info!(
            "  stage:   dir={}",
            self.stage_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        );
        tracing::info!("  doc:     command={}", self.doc_command);
    }
}
