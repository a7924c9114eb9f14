use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DocsiftError;
use crate::kind::FileKind;

/// Reason string reported for files that were deliberately not processed.
pub const SKIP_REASON: &str = "skip";

/// Reason reported for a failure that carried no message.
pub const UNKNOWN_FAILURE: &str = "unknown error";

/// Final result of processing one file. Set exactly once per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Skipped,
    Failed(String),
}

impl Outcome {
    /// Build a failure, substituting a placeholder for an empty reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason.trim().is_empty() {
            Outcome::Failed(UNKNOWN_FAILURE.to_string())
        } else {
            Outcome::Failed(reason)
        }
    }
}

/// One discovered file and its extraction outcome.
///
/// `kind` is fixed at construction. `outcome` stays `None` until the
/// extraction step records it; until then the record reads as successful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub root_dir: PathBuf,
    pub base_name: String,
    pub origin_path: PathBuf,
    /// Staged copy of the extracted text, filled by the staging step.
    pub copy_path: PathBuf,
    kind: FileKind,
    outcome: Option<Outcome>,
}

impl FileRecord {
    pub fn new(root_dir: &Path, file_name: &str, kind: FileKind) -> Self {
        let base_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_name)
            .to_string();
        Self {
            root_dir: root_dir.to_path_buf(),
            base_name,
            origin_path: root_dir.join(file_name),
            copy_path: PathBuf::new(),
            kind,
            outcome: None,
        }
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Record the processing outcome. A second call is rejected.
    pub fn record_outcome(&mut self, outcome: Outcome) -> Result<(), DocsiftError> {
        if self.outcome.is_some() {
            return Err(DocsiftError::OutcomeAlreadyRecorded(
                self.origin_path.display().to_string(),
            ));
        }
        self.outcome = Some(match outcome {
            Outcome::Failed(reason) => Outcome::failed(reason),
            other => other,
        });
        Ok(())
    }

    /// True unless the record was skipped or failed.
    pub fn state(&self) -> bool {
        matches!(self.outcome, None | Some(Outcome::Success))
    }

    /// Empty on success, `"skip"` when skipped, otherwise the failure cause.
    pub fn reason(&self) -> &str {
        match &self.outcome {
            None | Some(Outcome::Success) => "",
            Some(Outcome::Skipped) => SKIP_REASON,
            Some(Outcome::Failed(reason)) if reason.trim().is_empty() => UNKNOWN_FAILURE,
            Some(Outcome::Failed(reason)) => reason,
        }
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.base_name,
            self.copy_path.display(),
            self.state(),
            self.reason()
        )
    }
}
