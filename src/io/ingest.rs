//! Pantheon supernova table ingest.
//!
//! Accepts the light-curve parameter tables published with the Pantheon
//! sample (`#name zcmb zhel dz mb dmb ...`, whitespace separated) as well as
//! plain comma-separated exports of the same columns.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - no cosmology here: rows come out exactly as read

use std::collections::HashMap;
use std::path::Path;

use csv::StringRecord;

use crate::domain::SupernovaPoint;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub name: Option<String>,
    pub message: String,
}

/// Ingest output: parsed points + row errors.
#[derive(Debug, Clone)]
pub struct SupernovaData {
    pub points: Vec<SupernovaPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Accepted header names, first match wins.
const Z_COLUMNS: [&str; 2] = ["zcmb", "z"];
const MB_COLUMNS: [&str; 1] = ["mb"];
const MB_ERR_COLUMNS: [&str; 2] = ["dmb", "mb_err"];
const NAME_COLUMNS: [&str; 2] = ["name", "cid"];

/// Load a supernova table from `path`.
pub fn load_supernovae(path: &Path) -> Result<SupernovaData, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open table '{}': {e}", path.display())))?;
    parse_supernovae(&text)
}

/// Parse a supernova table from memory.
pub fn parse_supernovae(text: &str) -> Result<SupernovaData, AppError> {
    let comma_separated = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|header| header.contains(','));

    // The csv reader treats every delimiter as a field boundary, so runs of
    // spaces/tabs are collapsed first.
    let normalized;
    let (input, delimiter) = if comma_separated {
        (text, b',')
    } else {
        normalized = text
            .lines()
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");
        (normalized.as_str(), b' ')
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read table headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let columns = Columns {
        z: resolve_column(&header_map, &Z_COLUMNS)?,
        mb: resolve_column(&header_map, &MB_COLUMNS)?,
        mb_err: resolve_column(&header_map, &MB_ERR_COLUMNS)?,
        name: NAME_COLUMNS.iter().find_map(|n| header_map.get(*n).copied()),
    };

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    name: None,
                    message: format!("parse error: {e}"),
                });
                rows_read += 1;
                continue;
            }
        };
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows_read += 1;

        let name = columns
            .name
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("row{line}"));

        match parse_row(&record, &columns, name.clone()) {
            Ok(point) => points.push(point),
            Err(message) => {
                tracing::warn!(line, name = %name, %message, "skipping supernova row");
                row_errors.push(RowError {
                    line,
                    name: Some(name),
                    message,
                });
            }
        }
    }

    if points.is_empty() {
        return Err(AppError::new(3, "No valid supernova rows in table."));
    }

    tracing::info!(
        rows_read,
        rows_used = points.len(),
        skipped = row_errors.len(),
        "loaded supernova table"
    );

    Ok(SupernovaData {
        points,
        row_errors,
        rows_read,
    })
}

struct Columns {
    z: usize,
    mb: usize,
    mb_err: usize,
    name: Option<usize>,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Pantheon tables start with a `#` comment marker on the header line;
    // spreadsheet exports may carry a BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim_start_matches('#');
    name.trim().to_ascii_lowercase()
}

fn resolve_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<usize, AppError> {
    names
        .iter()
        .find_map(|n| header_map.get(*n).copied())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Missing required column: one of {}", names.join(", ")),
            )
        })
}

fn parse_row(record: &StringRecord, columns: &Columns, name: String) -> Result<SupernovaPoint, String> {
    let z = parse_field(record, columns.z, "z")?;
    let mb = parse_field(record, columns.mb, "mb")?;
    let mb_err = parse_field(record, columns.mb_err, "mb error")?;

    if z <= 0.0 {
        return Err(format!("Redshift must be > 0, got {z}."));
    }
    if mb_err <= 0.0 {
        return Err(format!("Magnitude error must be > 0, got {mb_err}."));
    }

    Ok(SupernovaPoint { name, z, mb, mb_err })
}

fn parse_field(record: &StringRecord, idx: usize, label: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{label}` value."))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{label}` value '{raw}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{label}` value."))
    }
}
