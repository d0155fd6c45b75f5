//! Flattened CSV export
//!
//! Range and coordinate objects become dotted columns (`monthlyRent.min`,
//! `location.latitude`, ...). Lists and any other nested object are embedded as JSON
//! text in a single cell; null becomes an empty cell.

use crate::listing::ListingRecord;
use crate::Result;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Fields whose object value is spread over dotted columns
const DOTTED_FIELDS: &[&str] = &["monthlyRent", "bedrooms", "bathrooms", "squareFeet", "location"];

/// One record as ordered `(column, cell)` pairs
pub fn flatten_record(record: &ListingRecord) -> Result<Vec<(String, String)>> {
    let Value::Object(fields) = serde_json::to_value(record)? else {
        return Ok(Vec::new());
    };
    flatten_fields(fields)
}

fn flatten_fields(fields: Map<String, Value>) -> Result<Vec<(String, String)>> {
    let mut cells = Vec::with_capacity(fields.len() + DOTTED_FIELDS.len());

    for (key, value) in fields {
        match value {
            Value::Object(inner) if DOTTED_FIELDS.contains(&key.as_str()) => {
                for (sub_key, sub_value) in inner {
                    cells.push((format!("{}.{}", key, sub_key), cell_text(&sub_value)?));
                }
            }
            other => {
                let text = cell_text(&other)?;
                cells.push((key, text));
            }
        }
    }

    Ok(cells)
}

fn cell_text(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value)?,
    })
}

/// Writes the records as CSV
///
/// The header is the union of every record's columns in first-appearance order, so a
/// degraded record's `_error` column appears once any record carries it. No records
/// means an empty file.
pub fn write_csv(records: &[ListingRecord], path: &Path) -> Result<()> {
    let rows = records
        .iter()
        .map(flatten_record)
        .collect::<Result<Vec<_>>>()?;

    let mut header: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for row in &rows {
        for (column, _) in row {
            if seen.insert(column.clone()) {
                header.push(column.clone());
            }
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if !header.is_empty() {
        writer.write_record(&header)?;
    }

    for row in rows {
        let mut cells: HashMap<String, String> = row.into_iter().collect();
        let line: Vec<String> = header
            .iter()
            .map(|column| cells.remove(column).unwrap_or_default())
            .collect();
        writer.write_record(&line)?;
    }

    writer.flush()?;
    Ok(())
}
