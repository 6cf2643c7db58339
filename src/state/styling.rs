use serde::{Deserialize, Serialize};

use crate::state::grouping::KEY_SEPARATOR;

/// Series colours, indexed by the hash of the hue dimension value.
pub const COLOR_PALETTE: [&str; 10] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff7300", "#00ff00", "#0088fe", "#00c49f", "#ffbb28", "#ff8042", "#8dd1e1",
];

/// Dash patterns, indexed by the hash of the style dimension value.
pub const LINE_STYLES: [DashPattern; 5] = [
    DashPattern::Solid,
    DashPattern::Dashed(&[5, 5]),
    DashPattern::Dashed(&[10, 5]),
    DashPattern::Dashed(&[15, 5, 5, 5]),
    DashPattern::Dashed(&[20, 5]),
];

pub const REFERENCE_STROKE_WIDTH: f32 = 10.0;
pub const HIDDEN_STROKE_WIDTH: f32 = 2.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashPattern {
    Solid,
    Dashed(&'static [u16]),
}

impl DashPattern {
    /// SVG `stroke-dasharray` value.
    pub fn dasharray(&self) -> String {
        match self {
            DashPattern::Solid => "none".to_string(),
            DashPattern::Dashed(parts) => parts.iter().map(u16::to_string).collect::<Vec<_>>().join(" "),
        }
    }
}

/// Resolved look of one series line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: String,
    pub dasharray: String,
    pub stroke_width: f32,
}

/// Pick a palette slot for `series_key` from the value of `dimension` inside
/// it. Keys look like `source_id:ModelA | experiment_id:hist`; when the
/// dimension is unset or not part of the key the first slot is used.
pub fn dimension_hash_index(series_key: &str, dimension: Option<&str>, len: usize) -> usize {
    let Some(dimension) = dimension else {
        return 0;
    };
    if len == 0 {
        return 0;
    }
    let prefix = format!("{dimension}:");
    let Some(part) = series_key.split(KEY_SEPARATOR).find(|p| p.starts_with(&prefix)) else {
        return 0;
    };
    // Only the text between the first and second colon is hashed.
    let value = part.split(':').nth(1).unwrap_or_default();
    (string_hash(value).unsigned_abs() as usize) % len
}

/// 32-bit `h * 31 + c` hash over UTF-16 code units.
fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_shl(5).wrapping_sub(acc).wrapping_add(i32::from(unit)))
}

pub fn series_color(series_key: &str, hue: Option<&str>) -> &'static str {
    COLOR_PALETTE[dimension_hash_index(series_key, hue, COLOR_PALETTE.len())]
}

pub fn series_dash(series_key: &str, style: Option<&str>) -> DashPattern {
    LINE_STYLES[dimension_hash_index(series_key, style, LINE_STYLES.len())]
}

pub fn stroke_width(is_reference: bool, is_hidden: bool) -> f32 {
    if is_reference {
        REFERENCE_STROKE_WIDTH
    } else if is_hidden {
        HIDDEN_STROKE_WIDTH
    } else {
        DEFAULT_STROKE_WIDTH
    }
}

pub fn series_style(series_key: &str, hue: Option<&str>, style: Option<&str>, is_reference: bool) -> SeriesStyle {
    SeriesStyle {
        color: series_color(series_key, hue).to_string(),
        dasharray: series_dash(series_key, style).dasharray(),
        stroke_width: stroke_width(is_reference, false),
    }
}
