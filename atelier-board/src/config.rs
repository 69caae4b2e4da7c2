//! Board configuration using Figment
//!
//! Sources, later ones overriding earlier ones:
//! 1. Defaults
//! 2. `<project>/.atelier/config.yaml`
//! 3. `<project>/atelier.toml`
//! 4. Environment variables prefixed `ATELIER_` (e.g. `ATELIER_DISPATCH_CAPACITY=8`)

use crate::error::{BoardError, Result};
use crate::store::STORAGE_DIR;
use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Settings for board sessions and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Storage directory, relative to the project root unless absolute
    pub storage_dir: PathBuf,
    /// Capacity of a session's persistence queue
    pub dispatch_capacity: usize,
    /// Reload the snapshot from storage once the queue drains after a failed write
    pub reload_on_failure: bool,
    /// Actor recorded on activity entries when none is given explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(STORAGE_DIR),
            dispatch_capacity: 64,
            reload_on_failure: true,
            actor: None,
        }
    }
}

impl BoardConfig {
    /// Load configuration for a project rooted at `project_root`
    pub fn load(project_root: impl AsRef<Path>) -> Result<Self> {
        let root = project_root.as_ref();
        debug!(root = %root.display(), "loading board configuration");

        let config: Self = Self::figment(root)
            .extract()
            .map_err(|e| BoardError::config(e.to_string()))?;
        config.validate()?;

        trace!(?config, "loaded board configuration");
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    pub fn figment(project_root: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(project_root.join(STORAGE_DIR).join("config.yaml")))
            .merge(Toml::file(project_root.join("atelier.toml")))
            .merge(Env::prefixed("ATELIER_"))
    }

    /// Find the nearest ancestor of `start` whose configured storage directory
    /// exists, returning that project root with its configuration.
    ///
    /// Each candidate is loaded with its own sources, so a project that moves
    /// its storage via `atelier.toml` or `ATELIER_STORAGE_DIR` is still found.
    pub fn discover(start: impl AsRef<Path>) -> Result<Option<(PathBuf, Self)>> {
        for dir in start.as_ref().ancestors() {
            let config = Self::load(dir)?;
            if config.storage_root(dir).is_dir() {
                debug!(root = %dir.display(), "discovered project root");
                return Ok(Some((dir.to_path_buf(), config)));
            }
        }
        Ok(None)
    }

    /// Absolute storage directory for a project
    pub fn storage_root(&self, project_root: &Path) -> PathBuf {
        if self.storage_dir.is_absolute() {
            self.storage_dir.clone()
        } else {
            project_root.join(&self.storage_dir)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dispatch_capacity == 0 {
            return Err(BoardError::config("dispatch_capacity must be at least 1"));
        }
        Ok(())
    }
}
