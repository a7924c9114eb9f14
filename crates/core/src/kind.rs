use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic file type, derived from a file name's suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Markdown,
    Text,
    Excel,
    Word,
    Image,
    Unknown,
}

impl FileKind {
    /// Kinds the pipeline extracts text from. Images are classified only.
    pub fn is_extractable(self) -> bool {
        !matches!(self, FileKind::Image | FileKind::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Markdown => "markdown",
            FileKind::Text => "text",
            FileKind::Excel => "excel",
            FileKind::Word => "word",
            FileKind::Image => "image",
            FileKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
