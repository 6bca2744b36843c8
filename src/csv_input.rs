//! Raw CSV text into ordered headers and string-keyed rows.
//!
//! No semantic interpretation happens here: cells are trimmed strings, missing
//! trailing cells become empty strings and surplus cells are dropped. Empty
//! input yields an empty table rather than an error so every later stage can
//! treat "no columns" as an ordinary case.

use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

use crate::io_utils;

/// One parsed record, keyed by raw header in CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value for `header`, keeping the original
    /// position when the header already exists.
    pub fn set(&mut self, header: &str, value: impl Into<String>) {
        let value = value.into();
        match self.cells.iter_mut().find(|(key, _)| key == header) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((header.to_string(), value)),
        }
    }

    /// Cell text for `header`; unknown headers read as empty.
    pub fn get(&self, header: &str) -> &str {
        self.cells
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (key, value) in iter {
            row.set(key.as_ref(), value);
        }
        row
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Filtered copy restricted to `selected` headers (selection order,
    /// unknown names skipped) and at most `limit` rows.
    pub fn project(&self, selected: Option<&[String]>, limit: Option<usize>) -> CsvTable {
        let headers: Vec<String> = match selected {
            Some(names) if !names.is_empty() => {
                let mut picked: Vec<String> = Vec::with_capacity(names.len());
                for name in names {
                    if self.headers.contains(name) && !picked.contains(name) {
                        picked.push(name.clone());
                    } else if !self.headers.contains(name) {
                        debug!("Ignoring unknown column '{name}'");
                    }
                }
                picked
            }
            _ => self.headers.clone(),
        };
        let take = limit.unwrap_or(usize::MAX);
        let rows = self
            .rows
            .iter()
            .take(take)
            .map(|row| {
                headers
                    .iter()
                    .map(|h| (h.as_str(), row.get(h)))
                    .collect::<Row>()
            })
            .collect();
        CsvTable { headers, rows }
    }
}

pub fn parse_csv(text: &str, delimiter: u8) -> Result<CsvTable> {
    let cleaned = text.replace('\r', "");
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(cleaned.as_bytes());

    let mut records = reader.records();
    let Some(first) = records.next() else {
        return Ok(CsvTable::default());
    };
    let header_record = first.context("Reading header row")?;
    let raw_headers = header_record.iter().map(str::to_string).collect::<Vec<_>>();
    let mut headers: Vec<String> = Vec::with_capacity(raw_headers.len());
    for header in &raw_headers {
        if !headers.contains(header) {
            headers.push(header.clone());
        }
    }

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        rows.push(build_row(&raw_headers, &headers, &record));
    }
    debug!(
        "Parsed {} header(s) and {} row(s) with delimiter '{}'",
        headers.len(),
        rows.len(),
        crate::printable_delimiter(delimiter)
    );
    Ok(CsvTable { headers, rows })
}

/// Reads and parses a CSV file (or stdin for `-`), resolving the delimiter
/// from the extension and decoding with the requested encoding.
pub fn load_table(path: &Path, delimiter: Option<u8>, encoding: Option<&str>) -> Result<CsvTable> {
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let encoding = io_utils::resolve_encoding(encoding)?;
    let text = io_utils::read_text(path, encoding)?;
    parse_csv(&text, delimiter).with_context(|| format!("Parsing CSV from {path:?}"))
}

fn build_row(raw_headers: &[String], headers: &[String], record: &StringRecord) -> Row {
    let mut row: Row = headers.iter().map(|h| (h.as_str(), "")).collect();
    for (idx, header) in raw_headers.iter().enumerate() {
        row.set(header, record.get(idx).unwrap_or(""));
    }
    row
}
