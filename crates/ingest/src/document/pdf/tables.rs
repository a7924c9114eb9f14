//! Table detection over decoded page text.
//!
//! A table is a run of at least two consecutive lines that split into the
//! same number of cells (two or more). Cells are separated by tabs or by
//! runs of two or more spaces. The first line of the run is the header.

use serde_json::Value;

use crate::table::{parse_cell, TableBlock};

const MIN_COLUMNS: usize = 2;
const MIN_LINES: usize = 2;

fn split_cells(line: &str) -> Vec<String> {
    // leading tabs mark blank cells, so only spaces are trimmed
    let line = line.trim_matches(|c: char| c == ' ' || c == '\r');
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split('\t')
        .flat_map(|field| {
            let parts: Vec<String> = field
                .split("  ")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            if parts.is_empty() {
                vec![String::new()]
            } else {
                parts
            }
        })
        .collect()
}

fn build_table(header: &[String], body: &[Vec<String>]) -> TableBlock {
    let rows: Vec<Vec<Value>> = body
        .iter()
        .map(|cells| cells.iter().map(|c| parse_cell(c)).collect())
        .collect();
    TableBlock::from_header(header, rows)
}

/// Find the tables on one page, in top-to-bottom order.
pub fn find_tables(page_text: &str) -> Vec<TableBlock> {
    let mut tables = Vec::new();
    let mut block: Vec<Vec<String>> = Vec::new();

    let mut flush = |block: &mut Vec<Vec<String>>| {
        if block.len() >= MIN_LINES {
            if let Some((header, body)) = block.split_first() {
                tables.push(build_table(header, body));
            }
        }
        block.clear();
    };

    for line in page_text.lines() {
        let cells = split_cells(line);
        if cells.len() < MIN_COLUMNS {
            flush(&mut block);
            continue;
        }
        if block.first().is_some_and(|first| first.len() != cells.len()) {
            flush(&mut block);
        }
        block.push(cells);
    }
    flush(&mut block);

    tables
}
