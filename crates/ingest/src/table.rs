//! Tabular data and its text form.
//!
//! Tables from PDFs and spreadsheets are serialized as JSON Lines, one
//! object per row with keys in column order, so they can be embedded in
//! the plain text handed to the indexing stage.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;

/// Token that marks an auto-generated placeholder column name.
pub const PLACEHOLDER_TOKEN: &str = "Col";

/// True for synthetic header names such as `Col3`.
pub fn is_placeholder(name: &str) -> bool {
    name.contains(PLACEHOLDER_TOKEN)
}

/// An extracted table before serialization.
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TableBlock {
    /// Build a table with the given column names. Short rows are padded
    /// with nulls, long rows truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Build a table from a raw header row. Blank header cells become
    /// `Col<n>` placeholders (1-based) and repeated names get `.1`, `.2`, …
    pub fn from_header(header: &[String], rows: Vec<Vec<Value>>) -> Self {
        let mut used: HashSet<String> = HashSet::new();
        let mut suffixes: HashMap<String, usize> = HashMap::new();
        let mut columns = Vec::with_capacity(header.len());
        for (i, raw) in header.iter().enumerate() {
            let base = match raw.trim() {
                "" => format!("{PLACEHOLDER_TOKEN}{}", i + 1),
                name => name.to_string(),
            };
            let mut name = base.clone();
            // checked against every name so far, literal or generated
            while used.contains(&name) {
                let n = suffixes.entry(base.clone()).or_insert(0);
                *n += 1;
                name = format!("{base}.{n}");
            }
            used.insert(name.clone());
            columns.push(name);
        }
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy of the table without columns that hold no value in any row.
    pub fn drop_empty_columns(&self) -> TableBlock {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&col| self.rows.iter().any(|row| !is_empty_cell(&row[col])))
            .collect();
        TableBlock {
            columns: keep.iter().map(|&c| self.columns[c].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&c| row[c].clone()).collect())
                .collect(),
        }
    }

    /// Column names joined with `_`, placeholders left out.
    pub fn title(&self) -> String {
        self.columns
            .iter()
            .filter(|name| !is_placeholder(name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Rows as ordered column -> value maps.
    pub fn row_maps(&self) -> Vec<IndexMap<&str, &Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter())
                    .collect()
            })
            .collect()
    }

    /// One JSON object per row, joined by newlines.
    pub fn to_json_lines(&self) -> String {
        self.row_maps()
            .iter()
            .map(|row| serde_json::to_string(row).unwrap_or_else(|_| "{}".to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Interpret a raw text cell: blank is null, integers and finite floats
/// are numbers, `true`/`false` are booleans, anything else stays text.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Title line followed by one JSON line per row, each newline-terminated.
/// Fully empty columns are dropped first.
pub fn serialize_table(table: &TableBlock) -> String {
    let table = table.drop_empty_columns();
    let mut out = table.title();
    out.push('\n');
    for row in table.row_maps() {
        out.push_str(&serde_json::to_string(&row).unwrap_or_else(|_| "{}".to_string()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_fully_empty_column() {
        let table = TableBlock::new(
            names(&["name", "notes", "age"]),
            vec![
                vec![json!("ann"), Value::Null, json!(31)],
                vec![json!("bob"), json!(""), json!(42)],
            ],
        );
        let out = serialize_table(&table);
        assert_eq!(
            out,
            "name_age\n{\"name\":\"ann\",\"age\":31}\n{\"name\":\"bob\",\"age\":42}\n"
        );
        assert!(!out.contains("notes"));
    }

    #[test]
    fn keeps_partially_filled_column() {
        let table = TableBlock::new(
            names(&["a", "b"]),
            vec![vec![json!(1), Value::Null], vec![json!(2), json!("x")]],
        );
        let lines = table.drop_empty_columns().to_json_lines();
        assert_eq!(lines, "{\"a\":1,\"b\":null}\n{\"a\":2,\"b\":\"x\"}");
    }

    #[test]
    fn placeholder_names_stay_out_of_title() {
        let table = TableBlock::from_header(
            &names(&["Region", "", "Total"]),
            vec![vec![json!("north"), json!("q1"), json!(10)]],
        );
        assert_eq!(table.columns(), &names(&["Region", "Col2", "Total"])[..]);
        assert_eq!(table.title(), "Region_Total");
        let out = serialize_table(&table);
        assert!(out.starts_with("Region_Total\n"));
        assert!(out.contains("\"Col2\":\"q1\""));
    }

    #[test]
    fn duplicate_headers_are_disambiguated() {
        let table = TableBlock::from_header(&names(&["x", "x", "x"]), vec![]);
        assert_eq!(table.columns(), &names(&["x", "x.1", "x.2"])[..]);
    }

    #[test]
    fn generated_names_never_collide_with_literal_ones() {
        let table = TableBlock::from_header(
            &names(&["x", "x", "x.1"]),
            vec![vec![json!(1), json!(2), json!(3)]],
        );
        assert_eq!(table.columns(), &names(&["x", "x.1", "x.1.1"])[..]);
        assert_eq!(table.to_json_lines(), "{\"x\":1,\"x.1\":2,\"x.1.1\":3}");

        let table = TableBlock::from_header(&names(&["x.1", "x", "x"]), vec![]);
        assert_eq!(table.columns(), &names(&["x.1", "x", "x.2"])[..]);
    }

    #[test]
    fn empty_table_serializes_to_title_only() {
        let table = TableBlock::new(names(&["a", "b"]), vec![]);
        assert_eq!(serialize_table(&table), "\n");
        assert_eq!(table.to_json_lines(), "");
    }

    #[test]
    fn serialization_is_stable() {
        let table = TableBlock::new(
            names(&["k", "v"]),
            vec![vec![json!("a"), json!(1.5)], vec![json!("b"), json!(true)]],
        );
        assert_eq!(serialize_table(&table), serialize_table(&table));
    }

    #[test]
    fn keeps_non_ascii_verbatim() {
        let table = TableBlock::new(names(&["城市"]), vec![vec![json!("上海")]]);
        assert_eq!(table.to_json_lines(), "{\"城市\":\"上海\"}");
    }

    #[test]
    fn pads_short_rows() {
        let table = TableBlock::new(names(&["a", "b"]), vec![vec![json!(1)]]);
        assert_eq!(table.rows()[0], vec![json!(1), Value::Null]);
    }

    #[test]
    fn parses_cells() {
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("  "), Value::Null);
        assert_eq!(parse_cell("12"), json!(12));
        assert_eq!(parse_cell("2.5"), json!(2.5));
        assert_eq!(parse_cell("true"), json!(true));
        assert_eq!(parse_cell("NaN"), json!("NaN"));
        assert_eq!(parse_cell("north"), json!("north"));
    }
}
