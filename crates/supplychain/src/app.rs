//! Application context for CLI command execution.
//!
//! Loads the configuration, opens the source it points at, and hands out
//! navigators configured the same way.
//!
//! # Example
//!
//! ```no_run
//! use supplychain::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_config_path(Path::new("supplychain.yaml")).await?;
//!     let mut navigator = app.navigator();
//!     Ok(())
//! }
//! ```

use crate::config::NavigatorConfig;
use crate::error::Result;
use crate::navigator::Navigator;
use crate::source::{create_source, LoadWarning, SourceBackend, SupplyChainSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application context for CLI operations.
pub struct App {
    source: Arc<dyn SupplyChainSource>,
    config: NavigatorConfig,
    data_file: PathBuf,
    warnings: Vec<LoadWarning>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("data_file", &self.data_file)
            .field("warnings", &self.warnings.len())
            .field("source", &"<dyn SupplyChainSource>")
            .finish()
    }
}

impl App {
    /// Build the context from a config file path.
    ///
    /// A relative `data-file` resolves against the directory holding the
    /// config file. Neither file has to exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the data file exists but
    /// cannot be read.
    pub async fn from_config_path(config_path: &Path) -> Result<Self> {
        let config = NavigatorConfig::load(config_path).await?;
        let data_file = resolve_data_file(config_path, &config.data_file);
        let (source, warnings) = create_source(SourceBackend::Jsonl(data_file.clone())).await?;

        Ok(Self {
            source,
            config,
            data_file,
            warnings,
        })
    }

    /// The source every navigator fetches from
    pub fn source(&self) -> &Arc<dyn SupplyChainSource> {
        &self.source
    }

    /// Loaded configuration
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Resolved path of the application records file
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Problems found while loading the records file
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// An idle navigator over the shared source
    pub fn navigator(&self) -> Navigator {
        Navigator::from_config(Arc::clone(&self.source), &self.config)
    }
}

fn resolve_data_file(config_path: &Path, data_file: &Path) -> PathBuf {
    if data_file.is_absolute() {
        return data_file.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(data_file),
        None => data_file.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG_FILE_NAME, DEFAULT_DATA_FILE};
    use crate::domain::ApplicationId;
    use tempfile::TempDir;
    use tokio::fs;

    #[tokio::test]
    async fn empty_directory_gives_empty_source() {
        let dir = TempDir::new().unwrap();
        let app = App::from_config_path(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap();

        assert_eq!(app.data_file(), dir.path().join(DEFAULT_DATA_FILE));
        assert!(app.source().list_applications().await.unwrap().is_empty());
        assert!(app.warnings().is_empty());
    }

    #[tokio::test]
    async fn data_file_resolves_next_to_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("data")).await.unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "data-file: data/apps.jsonl\nlookahead: true\n",
        )
        .await
        .unwrap();
        fs::write(
            dir.path().join("data/apps.jsonl"),
            "{\"applicationId\":\"a\",\"applicationName\":\"A\"}\nnot json\n",
        )
        .await
        .unwrap();

        let app = App::from_config_path(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap();

        assert!(app.config().lookahead);
        assert_eq!(app.warnings().len(), 1);
        let snapshot = app
            .source()
            .fetch_supply_chain(&ApplicationId::new("a"))
            .await
            .unwrap();
        assert_eq!(snapshot.main_app.name, "A");
    }

    #[test]
    fn absolute_data_file_is_kept() {
        let absolute = std::env::temp_dir().join("apps.jsonl");
        assert_eq!(
            resolve_data_file(Path::new("conf/supplychain.yaml"), &absolute),
            absolute
        );
        assert_eq!(
            resolve_data_file(Path::new("supplychain.yaml"), Path::new("apps.jsonl")),
            PathBuf::from("apps.jsonl")
        );
    }
}
