//! Multi-format text extraction pipeline.
//!
//! Classifies files by suffix, extracts normalized text from PDFs,
//! spreadsheets, word-processor documents and plain text, and records a
//! per-file outcome for the downstream indexing stage.

pub mod batch;
pub mod classify;
pub mod document;
pub mod normalize;
pub mod stage;
pub mod table;

pub use batch::{scan, summarize, BatchError, BatchReport, BatchRunner, BatchSummary};
pub use classify::classify;
pub use document::{ExtractionError, Extractor};
pub use normalize::normalize;
pub use table::{serialize_table, TableBlock};
