use std::path::Path;

use crate::data::parser;
use crate::data::records::{Dimensions, MetricRecord, MetricValueCollection, ScalarValue};
use crate::error::{DiagplotError, Result};

/// Default name of the numeric column in tabular exports.
pub const DEFAULT_VALUE_COLUMN: &str = "value";

/// Rows inspected when looking for the header.
const HEADER_SCAN_ROWS: usize = 50;

/// Load metric values from a JSON, CSV or Excel file.
///
/// JSON may hold a full collection response or a bare array of records.
/// Tables hold one scalar value per row: `value_column` is the number, every
/// other column is a dimension.
pub fn load_file(path: &Path, value_column: &str) -> Result<MetricValueCollection> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let collection = match ext.as_str() {
        "json" => load_json(path)?,
        "csv" => records_from_table(read_csv_rows(path)?, value_column)?,
        "xls" | "xlsx" => records_from_table(read_excel_rows(path)?, value_column)?,
        _ => return Err(DiagplotError::UnsupportedFormat(ext)),
    };

    tracing::info!(
        "Loaded {} records ({}) from {:?}",
        collection.data.len(),
        collection.types.join(", "),
        path
    );
    Ok(collection)
}

/// Parse a JSON payload from the values endpoint.
pub fn parse_json(text: &str) -> Result<MetricValueCollection> {
    let raw: serde_json::Value = serde_json::from_str(text)?;
    let collection = if raw.is_array() {
        let data: Vec<MetricRecord> = serde_json::from_value(raw)?;
        MetricValueCollection::from_records(data)
    } else {
        serde_json::from_value::<MetricValueCollection>(raw)?.with_derived_facets()
    };
    Ok(collection)
}

fn load_json(path: &Path) -> Result<MetricValueCollection> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read(path)?;
    // Fallback: treat as latin1 (each byte maps to same Unicode code point)
    let text = match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => {
                skipped += 1;
                tracing::debug!("Skipping malformed CSV record: {e}");
            }
        }
    }
    if skipped > 0 {
        tracing::warn!("Skipped {skipped} malformed CSV records in {:?}", path);
    }
    Ok(rows)
}

fn read_excel_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DiagplotError::NoData("no sheets found".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    // Excel serial kept as-is; dates only label dimensions here.
                    Data::DateTime(dt) => dt.to_string(),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect()
        })
        .collect();
    Ok(rows)
}

/// Turn raw table rows into scalar records.
pub fn records_from_table(rows: Vec<Vec<String>>, value_column: &str) -> Result<MetricValueCollection> {
    let header_row = parser::find_header_row(&rows, value_column, HEADER_SCAN_ROWS);
    if rows.len() <= header_row {
        return Err(DiagplotError::NoData("table is empty".to_string()));
    }

    let columns: Vec<String> = rows[header_row].iter().map(|s| s.trim().to_string()).collect();
    let value_idx = columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(value_column))
        .ok_or_else(|| DiagplotError::MissingValueColumn(value_column.to_string()))?;

    let mut data = Vec::with_capacity(rows.len() - header_row - 1);
    for row in &rows[header_row + 1..] {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut dimensions = Dimensions::new();
        for (col_idx, name) in columns.iter().enumerate() {
            if col_idx == value_idx || name.is_empty() {
                continue;
            }
            if let Some(cell) = row.get(col_idx).map(|c| c.trim()).filter(|c| !c.is_empty()) {
                dimensions.insert(name.clone(), cell.to_string());
            }
        }
        let value = row.get(value_idx).map(|c| parser::parse_value(c)).unwrap_or(f64::NAN);
        data.push(MetricRecord::Scalar(ScalarValue::new(dimensions, value)));
    }

    if data.is_empty() {
        return Err(DiagplotError::NoData("no rows after header".to_string()));
    }
    Ok(MetricValueCollection::from_records(data))
}
