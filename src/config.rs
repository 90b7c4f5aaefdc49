use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_ADDED_FILL: &str = "#e6ffed";
pub const DEFAULT_ADDED_STROKE: &str = "#2ea043";
pub const DEFAULT_REMOVED_FILL: &str = "#ffebe9";
pub const DEFAULT_REMOVED_STROKE: &str = "#cf222e";

/// Fill and stroke colors for the `added` and `removed` style classes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffColors {
    pub added_fill: String,
    pub added_stroke: String,
    pub removed_fill: String,
    pub removed_stroke: String,
}

impl Default for DiffColors {
    fn default() -> Self {
        Self {
            added_fill: DEFAULT_ADDED_FILL.to_string(),
            added_stroke: DEFAULT_ADDED_STROKE.to_string(),
            removed_fill: DEFAULT_REMOVED_FILL.to_string(),
            removed_stroke: DEFAULT_REMOVED_STROKE.to_string(),
        }
    }
}

impl DiffColors {
    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("added_fill", self.added_fill.as_str()),
            ("added_stroke", self.added_stroke.as_str()),
            ("removed_fill", self.removed_fill.as_str()),
            ("removed_stroke", self.removed_stroke.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub colors: DiffColors,
    /// Re-emit the new diagram's directive lines in the merged output.
    pub keep_directives: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid color for {field}: `{value}`")]
    InvalidColor { field: &'static str, value: String },
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject colors that would break a `classDef` line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.colors.fields() {
            if value.trim().is_empty() || value.contains([',', ';', '\n', '\r']) {
                return Err(ConfigError::InvalidColor {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
