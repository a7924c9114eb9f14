//! Staging of extracted text for the indexing stage.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Staged file name for an origin path: hex SHA-256 of the path plus `.text`.
pub fn staged_name(origin: &Path) -> String {
    let digest = Sha256::digest(origin.to_string_lossy().as_bytes());
    format!("{digest:x}.text")
}

/// Write `text` under `stage_dir` and return the staged path.
pub fn stage_text(stage_dir: &Path, origin: &Path, text: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(stage_dir)?;
    let path = stage_dir.join(staged_name(origin));
    fs::write(&path, text)?;
    Ok(path)
}
