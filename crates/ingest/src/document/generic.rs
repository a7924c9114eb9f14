use std::path::Path;

use docsift_core::FileKind;
use tracing::error;

use super::ExtractionError;

/// External document-to-text service for word-processor files.
pub trait DocumentTextService: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

fn read_plain(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    // Try UTF-8 first, fall back to lossy conversion
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Plain text and markdown are read as-is; word files go to `service`.
/// Other kinds produce empty text.
pub fn extract_generic(
    path: &Path,
    kind: FileKind,
    service: &dyn DocumentTextService,
) -> Result<String, ExtractionError> {
    match kind {
        FileKind::Markdown | FileKind::Text => read_plain(path),
        FileKind::Word => service.extract(path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "word extraction failed");
        }),
        _ => Ok(String::new()),
    }
}
