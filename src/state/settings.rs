use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiagplotError, Result};
use crate::state::grouping::{DimensionChoice, GroupingOverrides};

/// Series beyond this count are not laid out.
pub const DEFAULT_MAX_SERIES: usize = 500;

/// Category label for ensemble values lacking the x-axis dimension.
pub const DEFAULT_METRIC_NAME: &str = "Value";

/// Chart settings persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartSettings {
    pub grouping: GroupingOverrides,
    /// Dimension along the ensemble chart x-axis; the resolved group-by when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensemble_dimension: Option<DimensionChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_max: Option<f64>,
    pub max_series: usize,
    pub metric_name: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            grouping: GroupingOverrides::default(),
            ensemble_dimension: None,
            clip_min: None,
            clip_max: None,
            max_series: DEFAULT_MAX_SERIES,
            metric_name: DEFAULT_METRIC_NAME.to_string(),
        }
    }
}

impl ChartSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings: ChartSettings = serde_json::from_str(&json)?;
        settings.validate()?;
        tracing::info!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.clip_min, self.clip_max) {
            if min > max {
                return Err(DiagplotError::InvalidSettings(format!(
                    "clipMin ({min}) is greater than clipMax ({max})"
                )));
            }
        }
        if self.clip_min.is_some_and(f64::is_nan) || self.clip_max.is_some_and(f64::is_nan) {
            return Err(DiagplotError::InvalidSettings("clip bounds must be numbers".to_string()));
        }
        if self.max_series == 0 {
            return Err(DiagplotError::InvalidSettings("maxSeries must be at least 1".to_string()));
        }
        Ok(())
    }
}
