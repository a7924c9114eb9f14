//! Parallel PDF text extraction.
//!
//! Pages are split into contiguous ranges, one per worker. Every worker
//! opens its own copy of the document, extracts text and tables for its
//! pages, and sends the result back tagged with its range index. The
//! parent reassembles results in range order, so output matches a
//! sequential page-by-page pass regardless of completion order.

mod decoder;
mod tables;


use std::fmt;
use std::ops::RangeInclusive;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::ExtractionError;
use crate::table::serialize_table;

pub use decoder::{LopdfDecoder, PdfDecoder, PdfDocument};
pub use tables::find_tables;

/// Contiguous 1-based inclusive page slice. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn pages(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// Split `1..=page_count` into `workers` ranges of `page_count / workers`
/// pages each; the last range takes the remainder. When there are fewer
/// pages than workers the leading ranges are empty.
pub fn partition_pages(page_count: usize, workers: usize) -> Vec<PageRange> {
    let workers = workers.max(1);
    let per_worker = page_count / workers;
    (0..workers)
        .map(|i| {
            let start = i * per_worker + 1;
            let end = if i + 1 < workers {
                (i + 1) * per_worker
            } else {
                page_count
            };
            PageRange { start, end }
        })
        .collect()
}

/// Text plus serialized tables for every page in `range`, in page order.
/// The document handle lives only for the duration of this call.
fn extract_range(
    decoder: &dyn PdfDecoder,
    path: &Path,
    range: PageRange,
) -> Result<String, ExtractionError> {
    let document = decoder.open(path)?;
    let mut text = String::new();
    for page in range.pages() {
        let page_text = document.page_text(page)?;
        text.push_str(&page_text);
        for table in find_tables(&page_text) {
            text.push_str(&serialize_table(&table));
        }
    }
    Ok(text)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// The earliest range still waiting for a result.
fn first_unfinished(slots: &[Option<String>], ranges: &[PageRange]) -> PageRange {
    slots
        .iter()
        .position(Option::is_none)
        .and_then(|i| ranges.get(i).copied())
        .unwrap_or(PageRange { start: 1, end: 0 })
}

type RangeResult = (usize, Result<String, ExtractionError>);

pub struct PdfExtractor {
    decoder: Arc<dyn PdfDecoder>,
    workers: usize,
    timeout: Option<Duration>,
}

impl PdfExtractor {
    pub fn new(decoder: Arc<dyn PdfDecoder>, workers: usize, timeout: Option<Duration>) -> Self {
        Self {
            decoder,
            workers: workers.max(1),
            timeout,
        }
    }

    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let page_count = panic::catch_unwind(AssertUnwindSafe(|| {
            self.decoder.open(path).map(|document| document.page_count())
        }))
        .unwrap_or_else(|payload| Err(ExtractionError::Pdf(panic_message(payload))))?;
        if page_count == 0 {
            debug!(path = %path.display(), "pdf has no pages");
            return Ok(String::new());
        }

        let start = Instant::now();
        let ranges = partition_pages(page_count, self.workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("pdf-worker-{i}"))
            .build()
            .map_err(|e| ExtractionError::Pdf(format!("failed to start worker pool: {e}")))?;

        let (tx, rx) = mpsc::channel::<RangeResult>();
        let mut slots: Vec<Option<String>> = vec![None; ranges.len()];
        let mut pending = 0usize;

        for (index, range) in ranges.iter().copied().enumerate() {
            if range.is_empty() {
                slots[index] = Some(String::new());
                continue;
            }
            pending += 1;
            let tx = tx.clone();
            let decoder = Arc::clone(&self.decoder);
            let path: PathBuf = path.to_path_buf();
            pool.spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    extract_range(decoder.as_ref(), &path, range)
                }))
                .unwrap_or_else(|payload| {
                    Err(ExtractionError::Pdf(panic_message(payload)))
                })
                .map_err(|e| ExtractionError::PdfWorker {
                    range,
                    message: e.to_string(),
                });
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let deadline = self.timeout.map(|t| Instant::now() + t);
        while pending > 0 {
            let received = match deadline {
                Some(deadline) => {
                    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok((index, Ok(text))) => {
                    debug!(range = %ranges[index], chars = text.len(), "pdf range done");
                    slots[index] = Some(text);
                    pending -= 1;
                }
                Ok((_, Err(e))) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(ExtractionError::WorkerTimeout {
                        range: first_unfinished(&slots, &ranges),
                        timeout: self.timeout.unwrap_or_default(),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ExtractionError::PdfWorker {
                        range: first_unfinished(&slots, &ranges),
                        message: "worker exited without a result".to_string(),
                    });
                }
            }
        }

        let text: String = slots.into_iter().flatten().collect();
        info!(
            path = %path.display(),
            pages = page_count,
            workers = self.workers,
            chars = text.len(),
            "extracted pdf in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(text)
    }
}
