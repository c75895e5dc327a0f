//! Configuration types
//!
//! A grid is described by a TOML document with a `[page]` section and one
//! `[[columns]]` entry per column. Page settings may be overridden from the
//! environment.

use crate::{ColumnDescriptor, ColumnType, ConfigError, Schema, SchemaError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PAGE_SIZE: &str = "TABULA_PAGE_SIZE";
pub const ENV_AUTO_ADVANCE_ON_INSERT: &str = "TABULA_AUTO_ADVANCE_ON_INSERT";

/// Pagination behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    pub page_size: usize,
    /// Jump to the new last page when an insert on the last page adds a page.
    #[serde(default = "default_auto_advance")]
    pub auto_advance_on_insert: bool,
}

fn default_auto_advance() -> bool {
    true
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            auto_advance_on_insert: true,
        }
    }
}

impl PageConfig {
    /// Defaults overridden by environment variables.
    ///
    /// - `TABULA_PAGE_SIZE`: rows per page (default: 10)
    /// - `TABULA_AUTO_ADVANCE_ON_INSERT`: `true`/`1` or `false`/`0` (default: true)
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; unparseable values are ignored.
    pub fn with_overrides<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            page_size: lookup(ENV_PAGE_SIZE)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(self.page_size),
            auto_advance_on_insert: lookup(ENV_AUTO_ADVANCE_ON_INSERT)
                .and_then(|s| parse_flag(&s))
                .unwrap_or(self.auto_advance_on_insert),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// One `[[columns]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub editable: bool,
    pub progress_max: Option<f64>,
}

impl From<&ColumnConfig> for ColumnDescriptor {
    fn from(config: &ColumnConfig) -> Self {
        Self {
            editable: config.editable,
            progress_max: config.progress_max,
            ..ColumnDescriptor::new(config.name.clone(), config.column_type)
        }
    }
}

/// Master configuration for one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    #[serde(default)]
    pub page: PageConfig,
    pub columns: Vec<ColumnConfig>,
}

impl GridConfig {
    /// Read, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_path(path)?;
        config.page = config.page.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page.page_size".to_string(),
                value: self.page.page_size.to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.columns.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "columns".to_string(),
                value: "[]".to_string(),
                reason: "at least one column is required".to_string(),
            });
        }
        for (index, column) in self.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("columns[{}].name", index),
                    value: column.name.clone(),
                    reason: "must not be empty".to_string(),
                });
            }
            match (column.column_type, column.progress_max) {
                (ColumnType::Progress, None) => {
                    return Err(ConfigError::InvalidValue {
                        field: format!("columns[{}].progress_max", index),
                        value: "none".to_string(),
                        reason: "progress columns require a scale".to_string(),
                    });
                }
                (ColumnType::Progress, Some(max)) if !max.is_finite() || max <= 0.0 => {
                    return Err(ConfigError::InvalidValue {
                        field: format!("columns[{}].progress_max", index),
                        value: max.to_string(),
                        reason: "must be finite and > 0".to_string(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Build the column schema described by this config.
    pub fn schema(&self) -> Result<Schema, SchemaError> {
        Schema::new(self.columns.iter().map(ColumnDescriptor::from).collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
