//! Statement file parsers: CSV, spreadsheet, and heuristic PDF extraction

use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use csv::ReaderBuilder;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::SourceFormat;

/// A loosely structured table straight from the source file.
///
/// The header row may be malformed or missing, and row widths can vary;
/// normalization deals with both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Promote the first row of an aggregate to the header
    fn from_rows(mut all_rows: Vec<Vec<String>>) -> Self {
        if all_rows.is_empty() {
            return Self::default();
        }
        let headers = all_rows.remove(0);
        Self {
            headers,
            rows: all_rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Index of a header by exact name, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Outcome of extracting one PDF page
#[derive(Debug)]
enum PageRows {
    /// Lines formed a consistent multi-column shape
    Table(Vec<Vec<String>>),
    /// Naive line splitting salvaged some rows
    Lines(Vec<Vec<String>>),
    /// Nothing tabular on this page
    Empty,
}

/// Parse a statement file into a [`RawTable`].
///
/// Dispatches on the source format. An empty extraction yields an empty
/// table, not an error; only an unreadable file or an unsupported
/// extension fails.
pub fn parse_file(path: &Path, format: SourceFormat) -> Result<RawTable> {
    match format {
        SourceFormat::Csv => parse_csv_file(path),
        SourceFormat::Xls | SourceFormat::Xlsx => parse_spreadsheet(path),
        SourceFormat::Pdf => parse_pdf(path),
    }
}

/// Convenience wrapper that detects the format from the file extension
pub fn parse_path(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = SourceFormat::from_extension(ext)
        .ok_or_else(|| Error::UnsupportedFormat(format!(".{}", ext)))?;
    parse_file(path, format)
}

/// Parse a CSV statement; first row is the header
fn parse_csv_file(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    debug!("Parsed {} CSV rows from {}", rows.len(), path.display());
    Ok(RawTable { headers, rows })
}

/// Parse the first sheet of an .xls/.xlsx workbook; first row is the header
fn parse_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| Error::Spreadsheet(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(result) => result.map_err(|e| Error::Spreadsheet(e.to_string()))?,
        None => return Ok(RawTable::default()),
    };

    let all_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    debug!(
        "Parsed {} spreadsheet rows from {}",
        all_rows.len().saturating_sub(1),
        path.display()
    );
    Ok(RawTable::from_rows(all_rows))
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => {
            // Whole numbers render without a trailing ".0" so downstream
            // cleaning sees "500" rather than "500.0"
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        DataType::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Heuristic PDF parser.
///
/// Page by page: attempt structured table extraction first; if a page
/// yields no table, fall back to splitting each text line on runs of
/// two or more whitespace characters, keeping only lines that split
/// into more than two parts. Rows are concatenated across pages and the
/// first aggregate row becomes the header.
fn parse_pdf(path: &Path) -> Result<RawTable> {
    let pages =
        pdf_extract::extract_text_by_pages(path).map_err(|e| Error::Pdf(e.to_string()))?;

    // Unwrap is safe: the pattern is a compile-time constant.
    let splitter = Regex::new(r"\s{2,}").unwrap();

    let mut all_rows: Vec<Vec<String>> = Vec::new();
    for (page_no, text) in pages.iter().enumerate() {
        match extract_page_rows(text, &splitter) {
            PageRows::Table(rows) => {
                debug!("page {}: structured table with {} rows", page_no + 1, rows.len());
                all_rows.extend(rows);
            }
            PageRows::Lines(rows) => {
                debug!("page {}: text fallback with {} rows", page_no + 1, rows.len());
                all_rows.extend(rows);
            }
            PageRows::Empty => {
                debug!("page {}: no tabular content", page_no + 1);
            }
        }
    }

    // Zero extractable rows is an empty result, not a failure
    Ok(RawTable::from_rows(all_rows))
}

/// Extract rows from one page of PDF text.
///
/// The structured pass looks for a dominant column shape: if at least
/// three lines split into the same number (>2) of whitespace-separated
/// cells, those lines are taken as a drawn table. Otherwise every line
/// that splits into more than two parts is kept as a fallback row.
fn extract_page_rows(text: &str, splitter: &Regex) -> PageRows {
    let split_lines: Vec<Vec<String>> = text
        .lines()
        .map(|line| {
            splitter
                .split(line.trim())
                .filter(|p| !p.is_empty())
                .map(|p| p.to_string())
                .collect()
        })
        .collect();

    // Modal column count among multi-column lines
    let mut counts = std::collections::HashMap::new();
    for parts in &split_lines {
        if parts.len() > 2 {
            *counts.entry(parts.len()).or_insert(0usize) += 1;
        }
    }
    let modal = counts.into_iter().max_by_key(|(_, n)| *n);

    if let Some((width, n)) = modal {
        if n >= 3 {
            let rows: Vec<Vec<String>> = split_lines
                .iter()
                .filter(|parts| parts.len() == width)
                .cloned()
                .collect();
            return PageRows::Table(rows);
        }
    }

    // Fallback: keep any line with more than two parts (noise filter)
    let rows: Vec<Vec<String>> = split_lines
        .into_iter()
        .filter(|parts| parts.len() > 2)
        .collect();

    if rows.is_empty() {
        PageRows::Empty
    } else {
        PageRows::Lines(rows)
    }
}
