use serde::Serialize;

use crate::data::records::{Dimensioned, ScalarValue};
use crate::processing::statistics::BoxPlot;

/// Inclusive bounds applied to ensemble values before summarising.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ClipRange {
    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |lo| v >= lo) && self.max.map_or(true, |hi| v <= hi)
    }
}

/// One x-axis category of an ensemble chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleCategory {
    pub name: String,
    /// `None` when every value was non-finite or clipped.
    #[serde(rename = "box")]
    pub box_plot: Option<BoxPlot>,
    /// Finite values dropped by the clip range.
    pub clipped: usize,
    /// Number of records in the category, including non-finite values.
    pub record_count: usize,
}

/// Summarise scalar values per category of `dimension`.
///
/// Records lacking the dimension land in a category named `metric_name`.
/// Categories keep the order in which they are first seen.
pub fn build_ensemble(
    values: &[&ScalarValue],
    dimension: Option<&str>,
    metric_name: &str,
    clip: ClipRange,
) -> Vec<EnsembleCategory> {
    let mut order: Vec<(String, Vec<f64>)> = Vec::new();
    for value in values {
        let name = dimension
            .and_then(|d| value.dimension(d))
            .unwrap_or(metric_name);
        match order.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some((_, bucket)) => bucket.push(value.value),
            None => order.push((name.to_string(), vec![value.value])),
        }
    }

    order
        .into_iter()
        .map(|(name, raw)| {
            let finite: Vec<f64> = raw.iter().copied().filter(|v| v.is_finite()).collect();
            let kept: Vec<f64> = finite.iter().copied().filter(|&v| clip.contains(v)).collect();
            EnsembleCategory {
                name,
                box_plot: BoxPlot::compute(&kept),
                clipped: finite.len() - kept.len(),
                record_count: raw.len(),
            }
        })
        .collect()
}

/// Y-axis domain covering every category's whiskers.
///
/// With no data the domain is `[0, 1]`; a single repeated value is padded by
/// `max(1, |v| * 0.1)` on both sides.
pub fn y_domain(categories: &[EnsembleCategory]) -> (f64, f64) {
    let extremes: Vec<f64> = categories
        .iter()
        .filter_map(|c| c.box_plot.as_ref())
        .flat_map(|b| [b.min, b.max])
        .filter(|v| v.is_finite())
        .collect();
    if extremes.is_empty() {
        return (0.0, 1.0);
    }
    let min = extremes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = extremes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        let pad = (min.abs() * 0.1).max(1.0);
        return (min - pad, max + pad);
    }
    (min, max)
}
