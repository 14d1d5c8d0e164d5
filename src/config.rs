//! Application configuration.
//!
//! Read from a JSON file (`retail-insights.json` in the working directory by
//! default). Every section falls back to its defaults, and command-line flags
//! override whatever the file says.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::LoadOptions;
use crate::data::model::CategoryColumn;
use crate::error::ConfigError;
use crate::predict::forest::ForestConfig;

pub const DEFAULT_CONFIG_FILE: &str = "retail-insights.json";

/// Where the data files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Sales table opened at start-up (none → use File → Open…).
    pub sales_path: Option<PathBuf>,
    /// Rows before the header row of a CSV sales table.
    pub skip_rows: usize,
    /// Labeled insurance CSV used for training.
    pub insurance_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sales_path: None,
            skip_rows: 0,
            insurance_path: PathBuf::from("insurance.csv"),
        }
    }
}

/// Sales dashboard presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Prefix for money figures.
    pub currency: String,
    /// Columns offered as sidebar filters, in display order.
    pub filter_columns: Vec<CategoryColumn>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            currency: "RMB ¥".to_string(),
            filter_columns: vec![
                CategoryColumn::City,
                CategoryColumn::CustomerType,
                CategoryColumn::Gender,
            ],
        }
    }
}

/// Model file and training parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub forest: ForestConfig,
    /// Share of rows held out for the R² report.
    pub test_ratio: f64,
    pub split_seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rfr_model.json"),
            forest: ForestConfig::default(),
            test_ratio: 0.2,
            split_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub dashboard: DashboardConfig,
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load `path` if given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_FILE`] if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    log::debug!("no {DEFAULT_CONFIG_FILE}, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.model.test_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(ConfigError::Invalid {
                key: "model.test_ratio",
                message: format!("{ratio} is not between 0 and 1"),
            });
        }
        let forest = &self.model.forest;
        if forest.n_trees == 0 {
            return Err(ConfigError::Invalid {
                key: "model.forest.n_trees",
                message: "at least one tree is required".to_string(),
            });
        }
        if forest.min_samples_leaf == 0 {
            return Err(ConfigError::Invalid {
                key: "model.forest.min_samples_leaf",
                message: "must be at least 1".to_string(),
            });
        }
        // The model file nests one JSON object per tree level.
        if forest.max_depth == 0 || forest.max_depth > 40 {
            return Err(ConfigError::Invalid {
                key: "model.forest.max_depth",
                message: format!("{} is not between 1 and 40", forest.max_depth),
            });
        }
        if self.dashboard.filter_columns.is_empty() {
            return Err(ConfigError::Invalid {
                key: "dashboard.filter_columns",
                message: "at least one filter column is required".to_string(),
            });
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            skip_rows: self.data.skip_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.dashboard.currency, "RMB ¥");
        assert_eq!(config.dashboard.filter_columns.len(), 3);
        assert_eq!(config.model.path, PathBuf::from("rfr_model.json"));
        assert_eq!(config.model.test_ratio, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_json(
            r#"{ "data": { "skip_rows": 1 }, "model": { "forest": { "n_trees": 10 } } }"#,
        )
        .unwrap();
        assert_eq!(config.load_options().skip_rows, 1);
        assert_eq!(config.model.forest.n_trees, 10);
        assert_eq!(config.model.forest.max_depth, 12);
        assert_eq!(config.dashboard, DashboardConfig::default());
    }

    #[test]
    fn filter_columns_use_snake_case_names() {
        let config =
            AppConfig::from_json(r#"{ "dashboard": { "filter_columns": ["product_line"] } }"#)
                .unwrap();
        assert_eq!(config.dashboard.filter_columns, [CategoryColumn::ProductLine]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_json(r#"{ "model": { "test_ratio": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "model.test_ratio", .. }));

        let err = AppConfig::from_json(r#"{ "model": { "forest": { "n_trees": 0 } } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "model.forest.n_trees", .. }));

        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/retail.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
