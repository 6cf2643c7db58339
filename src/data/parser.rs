use std::collections::HashMap;

/// Detect the header row of a table of raw cells.
/// Returns the 0-based index of the last row within the first `max_rows`
/// that has the most common column count and contains only text cells.
/// Falls back to row 0.
pub fn detect_header_row(rows: &[Vec<String>], max_rows: usize) -> usize {
    let window = &rows[..rows.len().min(max_rows)];

    // Find most common column count
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in window.iter().filter(|r| !r.is_empty()) {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    let Some(most_common) = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)
    else {
        return 0;
    };

    // Scan from bottom up for all-string row
    for (i, row) in window.iter().enumerate().rev() {
        if row.len() != most_common {
            continue;
        }
        let is_header = row.iter().all(|cell| {
            let trimmed = cell.trim();
            !trimmed.is_empty() && trimmed.parse::<f64>().is_err() && !is_date_like(trimmed)
        });
        if is_header {
            return i;
        }
    }

    0
}

/// Index of the header row: the first row within `max_rows` naming
/// `value_column` (any case), else whatever [`detect_header_row`] picks.
pub fn find_header_row(rows: &[Vec<String>], value_column: &str, max_rows: usize) -> usize {
    rows.iter()
        .take(max_rows)
        .position(|row| row.iter().any(|cell| cell.trim().eq_ignore_ascii_case(value_column)))
        .unwrap_or_else(|| detect_header_row(rows, max_rows))
}

/// Parse a numeric cell. Blank or malformed cells become NaN.
pub fn parse_value(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn is_date_like(s: &str) -> bool {
    // Check for date-like patterns
    let has_separators = s.contains('/') || s.contains(':') || s.contains('-');
    if !has_separators || !s.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }

    use chrono::{NaiveDate, NaiveDateTime};
    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d",
        "%m/%d/%Y",
    ];
    FORMATS.iter().any(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt).is_ok() || NaiveDate::parse_from_str(s, fmt).is_ok()
    }) || chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_after_preamble() {
        let rows = vec![
            row(&["exported from dashboard"]),
            row(&["source_id", "region", "value"]),
            row(&["ModelA", "global", "1.5"]),
            row(&["ModelB", "global", "2.5"]),
        ];
        assert_eq!(detect_header_row(&rows, 50), 1);
    }

    #[test]
    fn test_date_rows_are_not_headers() {
        let rows = vec![
            row(&["source_id", "start", "value"]),
            row(&["ModelA", "2001-01-01", "bad"]),
        ];
        assert_eq!(detect_header_row(&rows, 50), 0);
    }

    #[test]
    fn test_header_found_by_value_column() {
        let rows = vec![
            row(&["exported from dashboard"]),
            row(&["source_id", "region", "Value"]),
            row(&["ModelA", "global", "1.5"]),
            row(&["ModelB", "global", "n/a"]),
            row(&["ModelC", "global", "2.5"]),
        ];
        // The marker row is all text, so the shape heuristic alone picks it.
        assert_eq!(detect_header_row(&rows, 50), 3);
        assert_eq!(find_header_row(&rows, "value", 50), 1);
        assert_eq!(find_header_row(&rows, "score", 50), 3);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 1.25 "), 1.25);
        assert!(parse_value("").is_nan());
        assert!(parse_value("n/a").is_nan());
    }
}
