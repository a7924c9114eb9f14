use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Operation;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::document::ExtractionError;

/// An open PDF. Dropping it releases the underlying handle.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Text of a 1-based page, one output line per visual line. Cells that
    /// sit apart on the same line are separated by tabs.
    fn page_text(&self, page_number: usize) -> Result<String, ExtractionError>;
}

/// Opens PDFs by path. Each caller gets its own independent document.
pub trait PdfDecoder: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, ExtractionError>;
}

/// Decoder backed by `lopdf`.
pub struct LopdfDecoder;

struct LopdfDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDecoder for LopdfDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, ExtractionError> {
        debug!(path = %path.display(), "opening pdf");
        let doc = Document::load(path).map_err(|e| ExtractionError::Pdf(e.to_string()))?;
        let pages = doc.get_pages();
        Ok(Box::new(LopdfDocument { doc, pages }))
    }
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> Result<String, ExtractionError> {
        let page_id = u32::try_from(page_number)
            .ok()
            .and_then(|n| self.pages.get(&n))
            .copied()
            .ok_or_else(|| ExtractionError::Pdf(format!("page {page_number} out of range")))?;
        let runs = collect_runs(&self.doc, page_id)
            .map_err(|e| ExtractionError::Pdf(format!("page {page_number}: {e}")))?;
        Ok(layout_text(runs))
    }
}

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH_EM: f32 = 0.5;
/// Horizontal gap that separates two cells.
const CELL_GAP_EM: f32 = 1.0;
/// Horizontal gap that separates two words.
const WORD_GAP_EM: f32 = 0.2;
/// Vertical distance under which two runs share a line.
const LINE_TOLERANCE_EM: f32 = 0.5;

/// Text shown by one operator, placed in page space.
#[derive(Debug, Clone)]
struct TextRun {
    x: f32,
    y: f32,
    size: f32,
    width: f32,
    text: String,
}

/// Text positioning state between `BT` and `ET`.
struct TextCursor {
    line_x: f32,
    line_y: f32,
    x: f32,
    y: f32,
    scale_x: f32,
    scale_y: f32,
    leading: f32,
    font_size: f32,
}

impl TextCursor {
    fn new() -> Self {
        Self {
            line_x: 0.0,
            line_y: 0.0,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            leading: 0.0,
            font_size: 1.0,
        }
    }

    fn begin_text(&mut self) {
        self.line_x = 0.0;
        self.line_y = 0.0;
        self.x = 0.0;
        self.y = 0.0;
        self.scale_x = 1.0;
        self.scale_y = 1.0;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_x += tx * self.scale_x;
        self.line_y += ty * self.scale_y;
        self.x = self.line_x;
        self.y = self.line_y;
    }

    fn set_matrix(&mut self, scale_x: f32, scale_y: f32, e: f32, f: f32) {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.line_x = e;
        self.line_y = f;
        self.x = e;
        self.y = f;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn effective_size(&self) -> f32 {
        let size = (self.font_size * self.scale_y).abs();
        if size > 0.0 {
            size
        } else {
            1.0
        }
    }

    fn show(&mut self, text: String, runs: &mut Vec<TextRun>) {
        if text.is_empty() {
            return;
        }
        let size = self.effective_size();
        let width = text.chars().count() as f32 * size * GLYPH_WIDTH_EM;
        runs.push(TextRun {
            x: self.x,
            y: self.y,
            size,
            width,
            text,
        });
        self.x += width;
    }
}

fn number(operation: &Operation, index: usize) -> f32 {
    operation
        .operands
        .get(index)
        .and_then(|o| o.as_float().ok())
        .unwrap_or(0.0)
}

fn decode_operands(encoding: Option<&str>, operands: &[Object], out: &mut String) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => out.push_str(&Document::decode_text(encoding, bytes)),
            Object::Array(items) => decode_operands(encoding, items, out),
            // large negative kerning is a word gap
            Object::Integer(_) | Object::Real(_) => {
                if operand.as_float().is_ok_and(|k| k < -100.0) {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Walk the page content stream and record every shown string with its
/// position.
fn collect_runs(doc: &Document, page_id: ObjectId) -> lopdf::Result<Vec<TextRun>> {
    let encodings: BTreeMap<Vec<u8>, &str> = doc
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let content = doc.get_and_decode_page_content(page_id)?;

    let mut runs = Vec::new();
    let mut cursor = TextCursor::new();
    let mut encoding: Option<&str> = None;

    for operation in &content.operations {
        let show_from = match operation.operator.as_str() {
            "BT" => {
                cursor.begin_text();
                None
            }
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name).copied());
                cursor.font_size = number(operation, 1);
                None
            }
            "TL" => {
                cursor.leading = number(operation, 0);
                None
            }
            "Td" => {
                cursor.move_line(number(operation, 0), number(operation, 1));
                None
            }
            "TD" => {
                cursor.leading = -number(operation, 1);
                cursor.move_line(number(operation, 0), number(operation, 1));
                None
            }
            "Tm" => {
                cursor.set_matrix(
                    number(operation, 0),
                    number(operation, 3),
                    number(operation, 4),
                    number(operation, 5),
                );
                None
            }
            "T*" => {
                cursor.next_line();
                None
            }
            "Tj" | "TJ" => Some(0),
            "'" => {
                cursor.next_line();
                Some(0)
            }
            "\"" => {
                cursor.next_line();
                Some(2)
            }
            _ => None,
        };

        if let Some(first) = show_from {
            let mut text = String::new();
            decode_operands(encoding, operation.operands.get(first..).unwrap_or(&[]), &mut text);
            cursor.show(text, &mut runs);
        }
    }
    Ok(runs)
}

/// Group runs into lines top to bottom, then lay each line out left to
/// right with a tab at every cell-sized gap.
fn layout_text(mut runs: Vec<TextRun>) -> String {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut lines: Vec<(f32, Vec<TextRun>)> = Vec::new();
    for run in runs {
        let tolerance = (run.size * LINE_TOLERANCE_EM).max(1.0);
        let same_line = lines
            .last()
            .is_some_and(|(y, _)| (y - run.y).abs() <= tolerance);
        if same_line {
            if let Some((_, line)) = lines.last_mut() {
                line.push(run);
                continue;
            }
        }
        lines.push((run.y, vec![run]));
    }

    let mut text = String::new();
    for (_, mut line) in lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
        let mut end: Option<f32> = None;
        for run in line {
            if let Some(prev_end) = end {
                let gap = run.x - prev_end;
                if gap >= run.size * CELL_GAP_EM {
                    text.push('\t');
                } else if gap > run.size * WORD_GAP_EM
                    && !text.ends_with(char::is_whitespace)
                    && !run.text.starts_with(char::is_whitespace)
                {
                    text.push(' ');
                }
            }
            text.push_str(&run.text);
            let run_end = run.x + run.width;
            end = Some(end.map_or(run_end, |e| e.max(run_end)));
        }
        text.push('\n');
    }
    text
}
