//! Core configuration traits
//!
//! Concrete configuration types live with the components they configure;
//! this module provides the shared loading contract (TOML file, `ORACLE_*`
//! environment overrides, validation) and the report size limits.

use crate::{OracleError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables that override configuration keys
pub const ENV_PREFIX: &str = "ORACLE_";

/// Core trait for oracle configuration types
pub trait OracleConfigFile: Clone + Default + Serialize + DeserializeOwned {
    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OracleError::invalid_config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render configuration as TOML text
    fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| OracleError::invalid_config(format!("Failed to render TOML: {e}")))
    }

    /// Apply `ORACLE_SECTION__KEY=value` overrides from the environment
    fn merge_with_env(&mut self) -> Result<()> {
        let overrides: Vec<(String, String)> = std::env::vars()
            .filter_map(|(k, v)| k.strip_prefix(ENV_PREFIX).map(|rest| (rest.to_owned(), v)))
            .collect();
        if overrides.is_empty() {
            return Ok(());
        }

        let mut value = toml::Value::try_from(&*self)
            .map_err(|e| OracleError::invalid_config(format!("Failed to render config: {e}")))?;
        for (key, raw) in overrides {
            let path: Vec<String> = key
                .to_lowercase()
                .split("__")
                .map(str::to_owned)
                .collect();
            set_nested_value(&mut value, &path, parse_scalar(&raw))?;
            tracing::debug!(key = %key, "applied environment override");
        }
        *self = value
            .try_into()
            .map_err(|e| OracleError::invalid_config(format!("Invalid override: {e}")))?;
        Ok(())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()>;
}

fn parse_scalar(raw: &str) -> toml::Value {
    if let Ok(int) = raw.parse::<i64>() {
        toml::Value::Integer(int)
    } else if let Ok(flag) = raw.parse::<bool>() {
        toml::Value::Boolean(flag)
    } else {
        toml::Value::String(raw.to_owned())
    }
}

fn set_nested_value(root: &mut toml::Value, path: &[String], value: toml::Value) -> Result<()> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| OracleError::invalid_config("Empty override key"))?;

    let mut current = root;
    for part in parents {
        current = current
            .as_table_mut()
            .ok_or_else(|| OracleError::invalid_config("Expected table"))?
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    current
        .as_table_mut()
        .ok_or_else(|| OracleError::invalid_config("Cannot set value on non-table"))?
        .insert(last.clone(), value);
    Ok(())
}

/// Size limits applied to incoming reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    /// Maximum exit requests in a single exit report
    pub max_exit_requests_per_report: u64,
    /// Maximum extra-data items in a single chunk
    pub max_items_per_extra_data_chunk: u64,
    /// Maximum operators in a single extra-data item
    pub max_operators_per_extra_data_item: u64,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            max_exit_requests_per_report: 600,
            max_items_per_extra_data_chunk: 8,
            max_operators_per_extra_data_item: 24,
        }
    }
}

impl ReportLimits {
    /// All limits must be positive
    pub fn validate(&self) -> Result<()> {
        if self.max_exit_requests_per_report == 0
            || self.max_items_per_extra_data_chunk == 0
            || self.max_operators_per_extra_data_item == 0
        {
            return Err(OracleError::invalid_config("report limits must be positive"));
        }
        Ok(())
    }
}

/// Fail with `TooManyItems` when `actual` exceeds `limit`
pub fn check_limit(limit: u64, actual: u64) -> Result<()> {
    if actual > limit {
        return Err(OracleError::TooManyItems { limit, actual });
    }
    Ok(())
}
