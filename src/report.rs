//! Chart-ready summary of a metric value collection.

use std::fmt::Write as _;

use serde::Serialize;

use crate::data::records::{MetricValueCollection, SeriesValue};
use crate::processing::ensemble::{self, ClipRange, EnsembleCategory};
use crate::processing::statistics::FencePartition;
use crate::processing::ticks::{self, ScaledTickFormatter};
use crate::state::grouping::{self, AvailableDimensions, GroupingConfig, GroupingOverrides};
use crate::state::settings::ChartSettings;
use crate::state::styling::{self, SeriesStyle};

#[derive(Debug, Clone, Serialize)]
pub struct EnsembleSection {
    pub dimension: String,
    pub categories: Vec<EnsembleCategory>,
    pub y_domain: (f64, f64),
    pub tick_count: usize,
    /// Per-category outliers beyond the inner fences, same order as `categories`.
    pub outliers: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesLine {
    pub key: String,
    pub style: SeriesStyle,
    pub is_reference: bool,
    pub points: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesGroupSection {
    pub category: String,
    pub index_name: Option<String>,
    /// First and last index labels, formatted for the axis.
    pub index_span: Option<(String, String)>,
    pub lines: Vec<SeriesLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SeriesSection {
    Empty,
    TooMany { count: usize, limit: usize },
    Grouped { groups: Vec<SeriesGroupSection> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub record_count: usize,
    pub available: AvailableDimensions,
    pub grouping: GroupingConfig,
    pub ensemble: Option<EnsembleSection>,
    pub series: SeriesSection,
}

impl ChartReport {
    /// Build the report. `overrides` layer on top of the grouping in `settings`.
    pub fn build(
        collection: &MetricValueCollection,
        settings: &ChartSettings,
        overrides: &GroupingOverrides,
    ) -> Self {
        let available = grouping::extract_available_dimensions(&collection.data);
        let requested = settings.grouping.merged_with(overrides);
        let config = grouping::initialize_grouping_config(&available, Some(&requested));

        let ensemble = build_ensemble_section(collection, settings, &config);
        let series = build_series_section(&collection.series(), settings, &config);

        ChartReport {
            record_count: collection.data.len(),
            available,
            grouping: config,
            ensemble,
            series,
        }
    }

    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Records: {}", self.record_count);
        let _ = writeln!(
            out,
            "Dimensions: {}",
            if self.available.dimensions.is_empty() {
                "(none)".to_string()
            } else {
                self.available.dimensions.join(", ")
            }
        );
        let _ = writeln!(
            out,
            "Grouping: groupBy={} hue={} style={}",
            self.grouping.group_by, self.grouping.hue, self.grouping.style
        );

        if let Some(ens) = &self.ensemble {
            let samples: Vec<f64> = ens
                .categories
                .iter()
                .filter_map(|c| c.box_plot.as_ref())
                .flat_map(|b| [b.min, b.max])
                .collect();
            let fmt = ScaledTickFormatter::new(&samples);
            let _ = writeln!(out, "\nEnsemble by {}:", ens.dimension);
            for (cat, outliers) in ens.categories.iter().zip(&ens.outliers) {
                match &cat.box_plot {
                    Some(b) => {
                        let shape = if b.draws_box() { "box" } else { "points" };
                        let _ = write!(out, "  {}: {} [{}]", cat.name, b.summary(|v| fmt.format(v)), shape);
                        if !outliers.is_empty() {
                            let _ = write!(out, " outliers={}", outliers.len());
                        }
                    }
                    None => {
                        let _ = write!(out, "  {}: no data", cat.name);
                    }
                }
                if cat.clipped > 0 {
                    let _ = write!(out, " clipped={}", cat.clipped);
                }
                out.push('\n');
            }
            let _ = writeln!(
                out,
                "  y-domain: {} .. {} ({} ticks)",
                fmt.format(ens.y_domain.0),
                fmt.format(ens.y_domain.1),
                ens.tick_count
            );
        }

        match &self.series {
            SeriesSection::Empty => {}
            SeriesSection::TooMany { count, limit } => {
                let _ = writeln!(
                    out,
                    "\nToo many series to display: {count} found, limit is {limit}. Filter the data first."
                );
            }
            SeriesSection::Grouped { groups } => {
                for group in groups {
                    let _ = write!(out, "\nSeries group {}", group.category);
                    if let Some((first, last)) = &group.index_span {
                        let index = group.index_name.as_deref().unwrap_or("index");
                        let _ = write!(out, " ({index} {first} .. {last})");
                    }
                    out.push_str(":\n");
                    for line in &group.lines {
                        let _ = writeln!(
                            out,
                            "  {} color={} dash={} width={}{}",
                            line.key,
                            line.style.color,
                            line.style.dasharray,
                            line.style.stroke_width,
                            if line.is_reference { " (reference)" } else { "" }
                        );
                    }
                }
            }
        }
        out
    }
}

fn build_ensemble_section(
    collection: &MetricValueCollection,
    settings: &ChartSettings,
    config: &GroupingConfig,
) -> Option<EnsembleSection> {
    let scalars = collection.scalars();
    if scalars.is_empty() {
        return None;
    }
    let dimension = settings.ensemble_dimension.clone().unwrap_or_else(|| config.group_by.clone());
    let clip = ClipRange { min: settings.clip_min, max: settings.clip_max };
    let categories = ensemble::build_ensemble(&scalars, dimension.name(), &settings.metric_name, clip);

    let outliers = categories
        .iter()
        .map(|c| c.box_plot.as_ref().map(|b| b.partition()).unwrap_or_default())
        .map(|p: FencePartition| p.outliers)
        .collect();
    let y_domain = ensemble::y_domain(&categories);
    let tick_count = ticks::suggested_tick_count(&[y_domain.0, y_domain.1]);

    Some(EnsembleSection {
        dimension: dimension.to_string(),
        categories,
        y_domain,
        tick_count,
        outliers,
    })
}

fn build_series_section(series: &[&SeriesValue], settings: &ChartSettings, config: &GroupingConfig) -> SeriesSection {
    if series.is_empty() {
        return SeriesSection::Empty;
    }
    if series.len() > settings.max_series {
        tracing::warn!("{} series exceed the display limit of {}", series.len(), settings.max_series);
        return SeriesSection::TooMany { count: series.len(), limit: settings.max_series };
    }

    let groups = grouping::group_records(series, config)
        .into_iter()
        .map(|group| {
            let index: Vec<f64> = group.records.iter().flat_map(|s| s.numeric_index()).collect();
            let fmt = ScaledTickFormatter::new(&index);
            let span = index
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .map(|(lo, hi)| (fmt.format(lo), fmt.format(hi)));

            let lines = group
                .keys
                .iter()
                .map(|key| {
                    let members: Vec<&&SeriesValue> = group
                        .records
                        .iter()
                        .copied()
                        .filter(|s| &grouping::create_grouping_key(**s, config) == key)
                        .collect();
                    let is_reference = members.iter().any(|s| grouping::is_reference_item(**s));
                    SeriesLine {
                        key: key.clone(),
                        style: styling::series_style(
                            key,
                            config.hue.name(),
                            config.style.name(),
                            is_reference,
                        ),
                        is_reference,
                        points: members.iter().map(|s| s.finite_values().len()).sum(),
                    }
                })
                .collect();

            SeriesGroupSection {
                category: group.category,
                index_name: group.records.iter().find_map(|s| s.index_name.clone()),
                index_span: span,
                lines,
            }
        })
        .collect();

    SeriesSection::Grouped { groups }
}
