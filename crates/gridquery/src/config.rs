//! Query defaults.
//!
//! [`GridConfig`] holds the values substituted for missing request
//! parameters and the sentinel that disables a reference filter. Every
//! field has a default, so partial YAML or JSON documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Defaults applied when compiling and running grid queries.
///
/// # Example
///
/// ```
/// use gridquery::GridConfig;
///
/// let config = GridConfig::from_yaml_str("default_page_size: 25").unwrap();
/// assert_eq!(config.default_page_size, 25);
/// assert_eq!(config.default_sort_field, "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Sort path used when a request names none.
    pub default_sort_field: String,
    /// Page size used when a request asks for zero rows or none.
    pub default_page_size: usize,
    /// Operand text meaning "no selection" on a reference field; a rule
    /// carrying it is skipped.
    pub reference_sentinel: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            default_sort_field: "id".to_string(),
            default_page_size: 10,
            reference_sentinel: "-1".to_string(),
        }
    }
}

impl GridConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<GridConfig> {
        let config: GridConfig =
            serde_yaml::from_str(text).map_err(|e| GridError::InvalidConfig(e.to_string()))?;
        config.validated()
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<GridConfig> {
        let config: GridConfig =
            serde_json::from_str(text).map_err(|e| GridError::InvalidConfig(e.to_string()))?;
        config.validated()
    }

    fn validated(self) -> Result<GridConfig> {
        if self.default_page_size == 0 {
            return Err(GridError::InvalidConfig(
                "default_page_size must be at least 1".to_string(),
            ));
        }
        if self.default_sort_field.trim().is_empty() {
            return Err(GridError::InvalidConfig(
                "default_sort_field must not be empty".to_string(),
            ));
        }
        Ok(self)
    }
}
