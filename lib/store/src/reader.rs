//! Snapshot reader for the preprocessed client extract.
//!
//! The snapshot is a gzip-compressed CSV with a header row, one row per
//! client and all cells numeric. Empty cells, `NA` markers and infinities
//! come out as missing, the same cleanup the upstream pipeline applies
//! before imputation.

use credrisk_core::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parsed snapshot: header plus raw (pre-imputation) cells.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub columns: Vec<String>,
    pub records: Vec<Vec<Option<f64>>>,
}

/// Read a snapshot from `path`, transparently decompressing `.gz` files.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<RawSnapshot> {
    let path = path.as_ref();
    let file = File::open(path)?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        parse_csv(BufReader::new(GzDecoder::new(file)))
    } else {
        parse_csv(BufReader::new(file))
    }
}

fn parse_csv<R: Read>(input: R) -> Result<RawSnapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Dataset(format!("unreadable header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if columns.is_empty() {
        return Err(Error::Dataset("snapshot has no columns".to_string()));
    }

    let mut records = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::Dataset(format!("row {}: {e}", line + 1)))?;
        if record.len() != columns.len() {
            return Err(Error::DimensionMismatch {
                expected: columns.len(),
                actual: record.len(),
            });
        }
        let row = record
            .iter()
            .enumerate()
            .map(|(col, cell)| parse_cell(cell, line + 1, &columns[col]))
            .collect::<Result<_>>()?;
        records.push(row);
    }

    if records.is_empty() {
        return Err(Error::EmptyMatrix);
    }

    Ok(RawSnapshot { columns, records })
}

fn parse_cell(cell: &str, line: usize, column: &str) -> Result<Option<f64>> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = cell
        .parse()
        .map_err(|_| Error::Dataset(format!("row {line}, column {column}: bad number {cell:?}")))?;
    // Infinities are artifacts of upstream ratio features; treat as missing.
    if value.is_finite() {
        Ok(Some(value))
    } else {
        Ok(None)
    }
}
