use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page sizes used by the publisher's listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub versions_per_page: u64,
    pub objects_per_page: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            versions_per_page: 50,
            objects_per_page: 50,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl PublisherConfig {
    /// Parse from TOML. Missing keys take their defaults.
    ///
    /// ```
    /// use arkive_publisher::PublisherConfig;
    ///
    /// let config = PublisherConfig::from_toml_str("objects_per_page = 100").unwrap();
    /// assert_eq!(config.objects_per_page, 100);
    /// assert_eq!(config.versions_per_page, 50);
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.versions_per_page == 0 {
            return Err(ConfigError::Invalid("versions_per_page must be positive".into()));
        }
        if self.objects_per_page == 0 {
            return Err(ConfigError::Invalid("objects_per_page must be positive".into()));
        }
        Ok(())
    }
}
