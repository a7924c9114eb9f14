//! Directory scan, per-file processing and the batch summary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use docsift_core::{Config, FileKind, FileRecord, Outcome, SuffixTable};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::document::Extractor;
use crate::stage::stage_text;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Cannot read root directory {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Walk `root` recursively and build one record per recognized file.
///
/// Unrecognized files are left out. Images are kept only when
/// `include_images` is set. Records are sorted by origin path.
pub fn scan(
    root: &Path,
    suffixes: &SuffixTable,
    include_images: bool,
) -> Result<Vec<FileRecord>, BatchError> {
    std::fs::read_dir(root).map_err(|source| BatchError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for entry in walkdir::WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };

        let kind = classify(file_name, suffixes);
        let keep = kind.is_extractable() || (include_images && kind == FileKind::Image);
        if !keep {
            continue;
        }
        let dir = entry.path().parent().unwrap_or(root);
        records.push(FileRecord::new(dir, file_name, kind));
    }

    records.sort_by(|a, b| a.origin_path.cmp(&b.origin_path));
    debug!(root = %root.display(), files = records.len(), "scan complete");
    Ok(records)
}

/// Success, skip and failure counts over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub skip: usize,
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "总计 {} 文件，成功 {} 个，跳过 {} 个，异常 {} 个",
            self.total, self.success, self.skip, self.failed
        )
    }
}

/// Count outcomes. Does not modify the records.
pub fn summarize(records: &[FileRecord]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: records.len(),
        ..BatchSummary::default()
    };
    for record in records {
        match record.outcome() {
            None | Some(Outcome::Success) => summary.success += 1,
            Some(Outcome::Skipped) => summary.skip += 1,
            Some(Outcome::Failed(_)) => summary.failed += 1,
        }
    }
    summary
}

/// Records of one batch run and their summary.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub records: Vec<FileRecord>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// One `<reason>,<copy_path>` line per file, then the totals.
    pub fn log(&self) {
        for record in &self.records {
            info!("{},{}", record.reason(), record.copy_path.display());
        }
        info!("{}", self.summary);
    }
}

/// Runs extraction over a directory tree, one file at a time.
pub struct BatchRunner {
    config: Config,
    extractor: Extractor,
}

impl BatchRunner {
    pub fn new(config: Config) -> Self {
        let extractor = Extractor::new(&config);
        Self { config, extractor }
    }

    pub fn with_extractor(config: Config, extractor: Extractor) -> Self {
        Self { config, extractor }
    }

    pub fn scan(&self, root: &Path) -> Result<Vec<FileRecord>, BatchError> {
        scan(root, &self.config.suffixes, self.config.include_images)
    }

    /// Extract one record and store its outcome. Never fails the batch.
    pub fn process(&self, record: &mut FileRecord) {
        let outcome = self.outcome_for(record);
        if let Err(e) = record.record_outcome(outcome) {
            warn!(error = %e, "keeping the first recorded outcome");
        }
    }

    fn outcome_for(&self, record: &mut FileRecord) -> Outcome {
        if !record.kind().is_extractable() {
            return Outcome::Skipped;
        }

        let text = match self.extractor.read_as(&record.origin_path, record.kind()) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %record.origin_path.display(), error = %e, "extraction failed");
                return Outcome::failed(e.to_string());
            }
        };

        if let Some(stage_dir) = &self.config.stage_dir {
            match stage_text(stage_dir, &record.origin_path, &text) {
                Ok(path) => record.copy_path = path,
                Err(e) => {
                    warn!(path = %record.origin_path.display(), error = %e, "staging failed");
                    return Outcome::failed(format!("stage: {e}"));
                }
            }
        }
        Outcome::Success
    }

    /// Scan `root`, process every file in order and summarize.
    pub fn run(&self, root: &Path) -> Result<BatchReport, BatchError> {
        let start = Instant::now();
        let mut records = self.scan(root)?;
        info!(root = %root.display(), files = records.len(), "starting batch");

        for record in &mut records {
            self.process(record);
        }

        let summary = summarize(&records);
        info!(
            "Batch finished in {:.1}s ({} files)",
            start.elapsed().as_secs_f64(),
            summary.total
        );
        Ok(BatchReport { records, summary })
    }
}
