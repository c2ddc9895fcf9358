//! Navigator configuration.
//!
//! Loaded from a YAML file (`supplychain.yaml` by default):
//!
//! ```yaml
//! layout:
//!   center-x: 400.0
//!   center-y: 300.0
//!   spacing: 250.0
//!   row-offset: 200.0
//! lookahead: false
//! data-file: applications.jsonl
//! ```
//!
//! Every key is optional. A missing file means the defaults.

use crate::error::{Error, Result};
use crate::graph::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "supplychain.yaml";

/// Default name of the application records file
pub const DEFAULT_DATA_FILE: &str = "applications.jsonl";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NavigatorConfig {
    /// Layout constants for the graph builder
    pub layout: LayoutConfig,

    /// Fetch every neighbor after each navigation and gray out dead ends
    pub lookahead: bool,

    /// Path to the JSONL application records, relative to the
    /// directory holding the configuration file
    pub data_file: PathBuf,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            lookahead: false,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl NavigatorConfig {
    /// Load configuration from a file, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the YAML is invalid or the layout constants
    /// are unusable, and `Error::Io` if the file exists but cannot be read.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails and `Error::Io` if the
    /// file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check the layout constants.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a coordinate is not finite or the spacing or
    /// row offset is not positive.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        if !(layout.center_x.is_finite() && layout.center_y.is_finite()) {
            return Err(Error::Config("Layout center must be finite".to_string()));
        }
        if !(layout.spacing.is_finite() && layout.spacing > 0.0) {
            return Err(Error::Config("Layout spacing must be positive".to_string()));
        }
        if !(layout.row_offset.is_finite() && layout.row_offset > 0.0) {
            return Err(Error::Config(
                "Layout row-offset must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = NavigatorConfig::load(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap();
        assert_eq!(config, NavigatorConfig::default());
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "layout:\n  spacing: 100\nlookahead: true\n")
            .await
            .unwrap();

        let config = NavigatorConfig::load(&path).await.unwrap();

        assert!(config.lookahead);
        assert_eq!(config.layout.spacing, 100.0);
        assert_eq!(config.layout.center_x, 400.0);
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[tokio::test]
    async fn invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "lookahead: [not, a, bool").await.unwrap();

        let result = NavigatorConfig::load(&path).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn non_positive_spacing_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "layout:\n  spacing: 0\n").await.unwrap();

        let result = NavigatorConfig::load(&path).await;
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("spacing")));
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = NavigatorConfig {
            lookahead: true,
            data_file: PathBuf::from("data/apps.jsonl"),
            ..NavigatorConfig::default()
        };

        config.save(&path).await.unwrap();
        let content = fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("data-file: data/apps.jsonl"));
        assert_eq!(NavigatorConfig::load(&path).await.unwrap(), config);
    }
}
