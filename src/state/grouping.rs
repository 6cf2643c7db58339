use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::records::Dimensioned;

/// Literal used for "no dimension selected".
pub const NONE: &str = "none";

/// Separator between parts of grouping keys and labels.
pub const KEY_SEPARATOR: &str = " | ";

/// Dimension name identifying the model or dataset a value comes from.
pub const SOURCE_ID: &str = "source_id";

/// `source_id` value marking reference datasets.
pub const REFERENCE_SOURCE: &str = "Reference";

/// Fallback parts of a grouping key when no chosen dimension applies.
pub const KEY_DIMENSIONS: [&str; 5] = ["source_id", "experiment_id", "variable_id", "metric", "region"];

/// Fallback parts of a display label. Unlike [`KEY_DIMENSIONS`] this leaves
/// out `source_id`.
pub const LABEL_DIMENSIONS: [&str; 4] = ["experiment_id", "variable_id", "metric", "region"];

const ITEM_FALLBACK: &str = "Item";
const CATEGORY_FALLBACK: &str = "Other";

/// A grouping slot: either unset or a dimension name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DimensionChoice {
    #[default]
    None,
    Dimension(String),
}

impl DimensionChoice {
    pub fn named(name: impl Into<String>) -> Self {
        let name: String = name.into();
        DimensionChoice::from(name)
    }

    /// The dimension name, if one is selected.
    pub fn name(&self) -> Option<&str> {
        match self {
            DimensionChoice::None => None,
            DimensionChoice::Dimension(name) => Some(name),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DimensionChoice::None)
    }

    /// Value of the selected dimension on `record`, if both exist.
    pub fn value_on<'a, R: Dimensioned + ?Sized>(&self, record: &'a R) -> Option<&'a str> {
        self.name().and_then(|name| record.dimension(name))
    }
}

impl From<String> for DimensionChoice {
    fn from(s: String) -> Self {
        if s == NONE {
            DimensionChoice::None
        } else {
            DimensionChoice::Dimension(s)
        }
    }
}

impl From<&str> for DimensionChoice {
    fn from(s: &str) -> Self {
        DimensionChoice::from(s.to_string())
    }
}

impl From<DimensionChoice> for String {
    fn from(c: DimensionChoice) -> Self {
        match c {
            DimensionChoice::None => NONE.to_string(),
            DimensionChoice::Dimension(name) => name,
        }
    }
}

impl fmt::Display for DimensionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or(NONE))
    }
}

/// Dimensions found in a record collection, with suggested defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDimensions {
    /// Sorted, distinct dimension names.
    pub dimensions: Vec<String>,
    pub default_group_by: DimensionChoice,
    pub default_hue: DimensionChoice,
    pub default_style: DimensionChoice,
}

impl AvailableDimensions {
    pub fn contains(&self, name: &str) -> bool {
        self.dimensions.iter().any(|d| d == name)
    }

    /// Keep `choice` when it is `none` or a known dimension, else `default`.
    fn resolve(&self, choice: Option<&DimensionChoice>, default: &DimensionChoice) -> DimensionChoice {
        match choice {
            Some(DimensionChoice::None) => DimensionChoice::None,
            Some(DimensionChoice::Dimension(name)) if !name.is_empty() && self.contains(name) => {
                DimensionChoice::Dimension(name.clone())
            }
            Some(DimensionChoice::Dimension(name)) => {
                tracing::debug!("Unknown dimension '{name}', using '{default}'");
                default.clone()
            }
            None => default.clone(),
        }
    }
}

/// Which dimensions drive chart categories, colour and line style.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingConfig {
    pub group_by: DimensionChoice,
    pub hue: DimensionChoice,
    pub style: DimensionChoice,
}

impl GroupingConfig {
    pub fn new(
        group_by: impl Into<DimensionChoice>,
        hue: impl Into<DimensionChoice>,
        style: impl Into<DimensionChoice>,
    ) -> Self {
        Self {
            group_by: group_by.into(),
            hue: hue.into(),
            style: style.into(),
        }
    }
}

/// A partially specified grouping, as read from settings or a command line.
/// Missing slots take the suggested default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<DimensionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<DimensionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<DimensionChoice>,
}

impl GroupingOverrides {
    /// Layer `other` on top of `self`; set slots in `other` win.
    pub fn merged_with(&self, other: &GroupingOverrides) -> GroupingOverrides {
        GroupingOverrides {
            group_by: other.group_by.clone().or_else(|| self.group_by.clone()),
            hue: other.hue.clone().or_else(|| self.hue.clone()),
            style: other.style.clone().or_else(|| self.style.clone()),
        }
    }
}

impl From<GroupingConfig> for GroupingOverrides {
    fn from(c: GroupingConfig) -> Self {
        GroupingOverrides {
            group_by: Some(c.group_by),
            hue: Some(c.hue),
            style: Some(c.style),
        }
    }
}

/// Collect the dimension names used by `records` and suggest defaults.
pub fn extract_available_dimensions<R: Dimensioned>(records: &[R]) -> AvailableDimensions {
    let names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.dimensions().keys().map(String::as_str))
        .collect();
    let dimensions: Vec<String> = names.into_iter().map(str::to_string).collect();

    let has_source = dimensions.iter().any(|d| d == SOURCE_ID);
    let default_group_by = if has_source {
        DimensionChoice::named(SOURCE_ID)
    } else {
        dimensions
            .first()
            .map(|d| DimensionChoice::named(d.as_str()))
            .unwrap_or_default()
    };
    let default_hue = if has_source { DimensionChoice::named(SOURCE_ID) } else { DimensionChoice::None };

    AvailableDimensions {
        dimensions,
        default_group_by,
        default_hue,
        default_style: DimensionChoice::None,
    }
}

/// Resolve a grouping from optional overrides, replacing unknown dimensions
/// with the suggested defaults.
pub fn initialize_grouping_config(
    available: &AvailableDimensions,
    initial: Option<&GroupingOverrides>,
) -> GroupingConfig {
    let initial = initial.cloned().unwrap_or_default();
    GroupingConfig {
        group_by: available.resolve(initial.group_by.as_ref(), &available.default_group_by),
        hue: available.resolve(initial.hue.as_ref(), &available.default_hue),
        style: available.resolve(initial.style.as_ref(), &available.default_style),
    }
}

/// Re-check a grouping against freshly loaded dimensions.
pub fn validate_grouping_config(config: &GroupingConfig, available: &AvailableDimensions) -> GroupingConfig {
    GroupingConfig {
        group_by: available.resolve(Some(&config.group_by), &available.default_group_by),
        hue: available.resolve(Some(&config.hue), &available.default_hue),
        style: available.resolve(Some(&config.style), &available.default_style),
    }
}

/// Composite key such as `source_id:ModelA | experiment_id:hist`.
pub fn create_grouping_key<R: Dimensioned + ?Sized>(record: &R, config: &GroupingConfig) -> String {
    let mut parts: Vec<String> = [&config.group_by, &config.hue, &config.style]
        .into_iter()
        .filter_map(|choice| {
            let name = choice.name()?;
            let value = record.dimension(name)?;
            Some(format!("{name}:{value}"))
        })
        .collect();

    if parts.is_empty() {
        parts = KEY_DIMENSIONS
            .iter()
            .filter_map(|dim| record.dimension(dim))
            .map(str::to_string)
            .collect();
    }

    if parts.is_empty() {
        ITEM_FALLBACK.to_string()
    } else {
        parts.join(KEY_SEPARATOR)
    }
}

/// Display label for `record` along `dimension`.
pub fn create_dimension_label<R: Dimensioned + ?Sized>(record: &R, dimension: &DimensionChoice) -> String {
    if let Some(value) = dimension.value_on(record) {
        return value.to_string();
    }

    let parts: Vec<&str> = LABEL_DIMENSIONS.iter().filter_map(|dim| record.dimension(dim)).collect();
    if parts.is_empty() {
        ITEM_FALLBACK.to_string()
    } else {
        parts.join(KEY_SEPARATOR)
    }
}

/// Chart category of `record`.
pub fn categorize_by_grouping<R: Dimensioned + ?Sized>(record: &R, config: &GroupingConfig) -> String {
    config
        .group_by
        .value_on(record)
        .or_else(|| record.dimension(SOURCE_ID))
        .unwrap_or(CATEGORY_FALLBACK)
        .to_string()
}

pub fn is_reference_item<R: Dimensioned + ?Sized>(record: &R) -> bool {
    record.dimensions().get(SOURCE_ID).map(String::as_str) == Some(REFERENCE_SOURCE)
}

/// Records sharing one chart category.
#[derive(Debug, Clone)]
pub struct RecordGroup<'a, R> {
    pub category: String,
    pub records: Vec<&'a R>,
    /// Distinct grouping keys, in first-seen order.
    pub keys: Vec<String>,
}

/// Partition `records` by category, keeping first-seen order of categories.
pub fn group_records<'a, R: Dimensioned>(records: &'a [R], config: &GroupingConfig) -> Vec<RecordGroup<'a, R>> {
    let mut groups: Vec<RecordGroup<'a, R>> = Vec::new();
    for record in records {
        let category = categorize_by_grouping(record, config);
        let key = create_grouping_key(record, config);
        let idx = match groups.iter().position(|g| g.category == category) {
            Some(idx) => idx,
            None => {
                groups.push(RecordGroup { category, records: Vec::new(), keys: Vec::new() });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.records.push(record);
        if !group.keys.contains(&key) {
            group.keys.push(key);
        }
    }
    groups
}
