mod generic;
mod office;
pub mod pdf;
mod spreadsheet;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use docsift_core::{Config, FileKind, SuffixTable};
use thiserror::Error;

use crate::classify::classify;
use crate::normalize::normalize;

pub use generic::{extract_generic, DocumentTextService};
pub use office::OfficeTextService;
pub use pdf::{partition_pages, LopdfDecoder, PageRange, PdfDecoder, PdfDocument, PdfExtractor};
pub use spreadsheet::extract_spreadsheet;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("PDF worker failed on pages {range}: {message}")]
    PdfWorker { range: PageRange, message: String },
    #[error("PDF worker for pages {range} timed out after {timeout:?}")]
    WorkerTimeout { range: PageRange, timeout: Duration },
    #[error("Spreadsheet extraction failed: {0}")]
    Spreadsheet(String),
    #[error("Word extraction failed: {0}")]
    Word(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dispatches a file to the extractor for its kind and normalizes the text.
pub struct Extractor {
    suffixes: SuffixTable,
    pdf: PdfExtractor,
    documents: Arc<dyn DocumentTextService>,
}

impl Extractor {
    /// Extractor backed by `lopdf` and the built-in office text service.
    pub fn new(config: &Config) -> Self {
        Self::with_backends(
            config,
            Arc::new(LopdfDecoder),
            Arc::new(OfficeTextService::new(config.doc_command.clone())),
        )
    }

    pub fn with_backends(
        config: &Config,
        pdf_decoder: Arc<dyn PdfDecoder>,
        documents: Arc<dyn DocumentTextService>,
    ) -> Self {
        Self {
            suffixes: config.suffixes.clone(),
            pdf: PdfExtractor::new(
                pdf_decoder,
                config.resolved_pdf_workers(),
                config.worker_timeout(),
            ),
            documents,
        }
    }

    /// Classify `path` by its file name, then extract.
    pub fn read(&self, path: &Path) -> Result<String, ExtractionError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.read_as(path, classify(name, &self.suffixes))
    }

    /// Extract text for an already classified file. Kinds without an
    /// extractor yield empty text.
    pub fn read_as(&self, path: &Path, kind: FileKind) -> Result<String, ExtractionError> {
        let text = match kind {
            FileKind::Pdf => self.pdf.extract(path)?,
            FileKind::Excel => extract_spreadsheet(path)?,
            FileKind::Markdown | FileKind::Text | FileKind::Word => {
                extract_generic(path, kind, self.documents.as_ref())?
            }
            FileKind::Image | FileKind::Unknown => String::new(),
        };

        if text.is_empty() {
            Ok(text)
        } else {
            Ok(normalize(&text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct FailingWord;

    impl DocumentTextService for FailingWord {
        fn extract(&self, _path: &Path) -> Result<String, ExtractionError> {
            Err(ExtractionError::Word("not a zip archive".into()))
        }
    }

    fn extractor() -> Extractor {
        let config = Config::default();
        Extractor::with_backends(&config, Arc::new(LopdfDecoder), Arc::new(FailingWord))
    }

    #[test]
    fn markdown_is_read_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "hello\n\nworld").unwrap();
        assert_eq!(extractor().read(&path).unwrap(), "hello\nworld");
    }

    #[test]
    fn images_and_unknown_files_yield_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("c.png");
        let other = dir.path().join("d.bin");
        fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(&other, b"\x00\x01").unwrap();
        assert_eq!(extractor().read(&image).unwrap(), "");
        assert_eq!(extractor().read(&other).unwrap(), "");
    }

    #[test]
    fn word_failure_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        fs::write(&path, b"garbage").unwrap();
        let err = extractor().read(&path).unwrap_err();
        assert!(err.to_string().contains("not a zip archive"));
    }

    #[test]
    fn corrupt_pdf_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4 this is not really a pdf").unwrap();
        assert!(extractor().read(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extractor().read(&dir.path().join("gone.txt")).is_err());
    }
}
