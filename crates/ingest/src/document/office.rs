//! Word-processor text extraction.
//!
//! `.docx` is read straight from the zip container. Legacy `.doc` is
//! handed to an external converter that prints text on stdout.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::Command;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use tracing::debug;
use zip::ZipArchive;

use super::generic::DocumentTextService;
use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

pub struct OfficeTextService {
    doc_command: String,
}

impl OfficeTextService {
    pub fn new(doc_command: impl Into<String>) -> Self {
        Self {
            doc_command: doc_command.into(),
        }
    }

    fn extract_doc(&self, path: &Path) -> Result<String, ExtractionError> {
        debug!(command = %self.doc_command, path = %path.display(), "running doc converter");
        let output = Command::new(&self.doc_command)
            .arg(path)
            .output()
            .map_err(|e| {
                ExtractionError::Word(format!("failed to run {}: {e}", self.doc_command))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Word(format!(
                "{} exited with {}: {}",
                self.doc_command,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DocumentTextService for OfficeTextService {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let is_docx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        if is_docx {
            extract_docx(path)
        } else {
            self.extract_doc(path)
        }
    }
}

fn read_zip_entry(path: &Path, name: &str) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| ExtractionError::Word(format!("not a docx container: {e}")))?;
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ExtractionError::Word(format!("missing {name}: {e}")))?;
    let mut buffer = Vec::new();
    entry.read_to_end(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let xml = read_zip_entry(path, DOCUMENT_PART)?;
    parse_document_xml(&xml)
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Text runs of a WordprocessingML body. Paragraph ends and breaks become
/// newlines, tabs stay tabs.
fn parse_document_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if local_name(e.name().as_ref()) == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text => {
                let value = t
                    .unescape()
                    .map_err(|e| ExtractionError::Word(format!("bad document xml: {e}")))?;
                text.push_str(&value);
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::Word(format!(
                    "bad document xml at {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
