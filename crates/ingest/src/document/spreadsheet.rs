use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use tracing::{debug, warn};

use super::ExtractionError;
use crate::table::{parse_cell, TableBlock};

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn read_csv(path: &Path) -> Result<Option<TableBlock>, ExtractionError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?
        .iter()
        .map(String::from)
        .collect();
    if header.is_empty() {
        return Ok(None);
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?;
        if record.len() > header.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            warn!(
                path = %path.display(),
                line,
                fields = record.len(),
                columns = header.len(),
                "dropping fields beyond the header"
            );
        }
        rows.push(record.iter().map(parse_cell).collect());
    }
    Ok(Some(TableBlock::from_header(&header, rows)))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        // workbooks store every number as a float
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(*f as i64),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// First worksheet only; its first row is the header.
fn read_workbook(path: &Path) -> Result<Option<TableBlock>, ExtractionError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(None);
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ExtractionError::Spreadsheet(format!("sheet '{sheet}': {e}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(None);
    };
    let header: Vec<String> = header.iter().map(header_name).collect();
    let body: Vec<Vec<Value>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    debug!(path = %path.display(), sheet = %sheet, "read worksheet");
    Ok(Some(TableBlock::from_header(&header, body)))
}

/// Load a CSV or workbook whole and serialize its rows as JSON lines,
/// leaving out columns that are empty in every row.
pub fn extract_spreadsheet(path: &Path) -> Result<String, ExtractionError> {
    let table = if is_csv(path) {
        read_csv(path)?
    } else {
        read_workbook(path)?
    };
    match table {
        Some(table) if !table.is_empty() => Ok(table.drop_empty_columns().to_json_lines()),
        _ => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn csv_drops_empty_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.csv");
        fs::write(&path, "name,unused,qty\nbolt,,4\nnut,,12\n").unwrap();
        let text = extract_spreadsheet(&path).unwrap();
        assert_eq!(text, "{\"name\":\"bolt\",\"qty\":4}\n{\"name\":\"nut\",\"qty\":12}");
        assert!(!text.contains("unused"));
    }

    #[test]
    fn csv_keeps_column_order_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        fs::write(&path, "z,a,m\n1,,x\n2,y,\n").unwrap();
        let text = extract_spreadsheet(&path).unwrap();
        assert_eq!(
            text,
            "{\"z\":1,\"a\":null,\"m\":\"x\"}\n{\"z\":2,\"a\":\"y\",\"m\":null}"
        );
    }

    #[test]
    fn overlong_csv_row_keeps_header_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.csv");
        fs::write(&path, "a,b\n1,2,3,4\n5,6\n").unwrap();
        let text = extract_spreadsheet(&path).unwrap();
        assert_eq!(text, "{\"a\":1,\"b\":2}\n{\"a\":5,\"b\":6}");
    }

    #[test]
    fn header_only_csv_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.csv");
        fs::write(&path, "a,b\n").unwrap();
        assert_eq!(extract_spreadsheet(&path).unwrap(), "");
    }

    #[test]
    fn empty_csv_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e.csv");
        fs::write(&path, "").unwrap();
        assert_eq!(extract_spreadsheet(&path).unwrap(), "");
    }

    fn inline_cell(reference: &str, text: &str) -> String {
        format!(r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#)
    }

    /// Minimal single-sheet `.xlsx` with inline strings.
    fn write_xlsx(path: &Path, rows: &[String]) {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let sheet = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows.iter()
                .enumerate()
                .map(|(i, cells)| format!(r#"<row r="{}">{cells}</row>"#, i + 1))
                .collect::<String>()
        );
        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Stock" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            ("xl/worksheets/sheet1.xml", sheet),
        ];

        let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
        for (name, body) in parts {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn workbook_first_row_is_header_and_empty_column_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.xlsx");
        let header = [
            inline_cell("A1", "item"),
            inline_cell("B1", "notes"),
            inline_cell("C1", "qty"),
            inline_cell("D1", "price"),
            inline_cell("E1", "in_stock"),
        ]
        .concat();
        let bolt = [
            inline_cell("A2", "bolt"),
            r#"<c r="C2"><v>4</v></c><c r="D2"><v>0.25</v></c><c r="E2" t="b"><v>1</v></c>"#.to_string(),
        ]
        .concat();
        let nut = [
            inline_cell("A3", "nut"),
            r#"<c r="C3"><v>12</v></c><c r="D3"><v>0.1</v></c><c r="E3" t="b"><v>0</v></c>"#.to_string(),
        ]
        .concat();
        write_xlsx(&path, &[header, bolt, nut]);

        let text = extract_spreadsheet(&path).unwrap();
        assert_eq!(
            text,
            "{\"item\":\"bolt\",\"qty\":4,\"price\":0.25,\"in_stock\":true}\n\
             {\"item\":\"nut\",\"qty\":12,\"price\":0.1,\"in_stock\":false}"
        );
        assert!(!text.contains("notes"));
    }

    #[test]
    fn unreadable_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, b"not a workbook").unwrap();
        let err = extract_spreadsheet(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Spreadsheet(_)));
    }

    #[test]
    fn uppercase_csv_suffix_uses_csv_reader() {
        assert!(is_csv(Path::new("DATA.CSV")));
        assert!(!is_csv(Path::new("data.xlsx")));
    }

    #[test]
    fn typed_cells_map_to_json() {
        assert_eq!(cell_value(&Data::Empty), Value::Null);
        assert_eq!(cell_value(&Data::Int(3)), Value::from(3));
        assert_eq!(cell_value(&Data::Float(4.0)), Value::from(4));
        assert_eq!(cell_value(&Data::Float(2.5)), Value::from(2.5));
        assert_eq!(cell_value(&Data::Bool(true)), Value::Bool(true));
        assert_eq!(cell_value(&Data::String(" ".into())), Value::Null);
        assert_eq!(cell_value(&Data::Float(f64::NAN)), Value::Null);
    }
}
