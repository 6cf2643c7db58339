use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Free-form dimension map carried by every metric value.
pub type Dimensions = BTreeMap<String, String>;

/// Anything that carries a dimension map.
pub trait Dimensioned {
    fn dimensions(&self) -> &Dimensions;

    /// Value of `name` when the key exists with a non-empty value.
    fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions()
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl Dimensioned for Dimensions {
    fn dimensions(&self) -> &Dimensions {
        self
    }
}

impl<T: Dimensioned + ?Sized> Dimensioned for &T {
    fn dimensions(&self) -> &Dimensions {
        (**self).dimensions()
    }
}

/// Attribute values are either text or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

/// Series index entries may be numeric (years, lead times) or labels.
pub type IndexValue = AttributeValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Unverified,
}

/// A single scalar diagnostic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarValue {
    pub dimensions: Dimensions,
    /// `null` in the payload becomes NaN so it drops out of statistics.
    #[serde(deserialize_with = "nullable_f64")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttributeValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_group_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_outlier: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
}

impl ScalarValue {
    pub fn new(dimensions: Dimensions, value: f64) -> Self {
        Self {
            dimensions,
            value,
            attributes: None,
            execution_group_id: None,
            execution_id: None,
            is_outlier: None,
            verification_status: None,
        }
    }
}

/// A diagnostic value sampled along an index (time, lead time, latitude...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesValue {
    pub dimensions: Dimensions,
    pub values: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<IndexValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttributeValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_group_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<u64>,
}

impl SeriesValue {
    /// Numeric index positions, skipping label entries.
    pub fn numeric_index(&self) -> Vec<f64> {
        self.index
            .iter()
            .flatten()
            .filter_map(|v| match v {
                IndexValue::Number(n) => Some(*n),
                IndexValue::Text(_) => None,
            })
            .collect()
    }

    /// Finite values of the series.
    pub fn finite_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().filter(|v| v.is_finite()).collect()
    }
}

/// Either kind of metric value, as returned by the values endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricRecord {
    Series(SeriesValue),
    Scalar(ScalarValue),
}

impl MetricRecord {
    pub fn is_scalar(&self) -> bool {
        matches!(self, MetricRecord::Scalar(_))
    }

    pub fn is_series(&self) -> bool {
        matches!(self, MetricRecord::Series(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            MetricRecord::Scalar(s) => Some(s),
            MetricRecord::Series(_) => None,
        }
    }

    pub fn as_series(&self) -> Option<&SeriesValue> {
        match self {
            MetricRecord::Series(s) => Some(s),
            MetricRecord::Scalar(_) => None,
        }
    }
}

impl Dimensioned for ScalarValue {
    fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }
}

impl Dimensioned for SeriesValue {
    fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }
}

impl Dimensioned for MetricRecord {
    fn dimensions(&self) -> &Dimensions {
        match self {
            MetricRecord::Scalar(s) => &s.dimensions,
            MetricRecord::Series(s) => &s.dimensions,
        }
    }
}

/// Distinct values observed for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub key: String,
    pub values: Vec<String>,
}

/// Response body of the metric values endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValueCollection {
    pub data: Vec<MetricRecord>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub facets: Vec<Facet>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub had_outliers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_count: Option<usize>,
}

impl MetricValueCollection {
    /// Build a collection from bare records, deriving count, facets and types.
    pub fn from_records(data: Vec<MetricRecord>) -> Self {
        let mut types = Vec::new();
        if data.iter().any(MetricRecord::is_scalar) {
            types.push("scalar".to_string());
        }
        if data.iter().any(MetricRecord::is_series) {
            types.push("series".to_string());
        }
        Self {
            count: data.len(),
            facets: facets_from_records(&data),
            types,
            had_outliers: None,
            outlier_count: None,
            data,
        }
    }

    pub fn scalars(&self) -> Vec<&ScalarValue> {
        self.data.iter().filter_map(MetricRecord::as_scalar).collect()
    }

    pub fn series(&self) -> Vec<&SeriesValue> {
        self.data.iter().filter_map(MetricRecord::as_series).collect()
    }

    /// Fill facets and count if the payload left them out.
    pub fn with_derived_facets(mut self) -> Self {
        if self.facets.is_empty() {
            self.facets = facets_from_records(&self.data);
        }
        if self.count == 0 {
            self.count = self.data.len();
        }
        self
    }
}

/// Facets for every dimension key, keys and values sorted.
pub fn facets_from_records<T: Dimensioned>(records: &[T]) -> Vec<Facet> {
    let mut by_key: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        for (key, value) in record.dimensions() {
            by_key.entry(key.as_str()).or_default().insert(value.as_str());
        }
    }
    by_key
        .into_iter()
        .map(|(key, values)| Facet {
            key: key.to_string(),
            values: values.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
