//! Configuration for metatree
//!
//! Settings come from an optional `metatree.toml`, looked up next to the root
//! document unless an explicit path is given. Every key is optional.
//!
//! ```toml
//! # Attach script bodies to element and module records
//! attach_scripts = false
//! # Follow import links and external scripts (false = metadata-only mode)
//! follow_imports = true
//!
//! [loader]
//! # Fetch http(s) imports
//! allow_remote = false
//! # Retries for remote fetches
//! max_retries = 3
//! # Directory local addresses are confined to (relative to this file)
//! root_dir = "."
//! ```
//!
//! Command-line flags override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_MAX_RETRIES};
use crate::loader::{DefaultLoader, FsLoader, HttpLoader, Loader};

/// Top-level analyzer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Attach script bodies to extracted records
    pub attach_scripts: bool,
    /// Follow imports and external scripts through a loader
    pub follow_imports: bool,
    /// Loader settings
    pub loader: LoaderConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            attach_scripts: false,
            follow_imports: true,
            loader: LoaderConfig::default(),
        }
    }
}

/// Settings for the [`DefaultLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Fetch `http(s)` addresses
    pub allow_remote: bool,
    /// Retries for remote fetches
    pub max_retries: usize,
    /// Directory local addresses are confined to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            allow_remote: false,
            max_retries: DEFAULT_MAX_RETRIES,
            root_dir: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from `path`.
    ///
    /// A relative `root_dir` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema (unknown keys are rejected).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if let Some(root_dir) = &config.loader.root_dir
            && root_dir.is_relative()
            && let Some(parent) = path.parent()
        {
            config.loader.root_dir = Some(parent.join(root_dir));
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, else `metatree.toml` in `document_dir` if it
    /// exists, else the defaults.
    ///
    /// # Errors
    ///
    /// An explicit path must exist. A discovered file must parse.
    pub async fn load_with_optional(explicit: Option<&Path>, document_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path).await;
        }

        let discovered = document_dir.join(CONFIG_FILE_NAME);
        if fs::try_exists(&discovered).await.unwrap_or(false) {
            Self::load_from(&discovered).await
        } else {
            Ok(Self::default())
        }
    }

    /// Build the loader these settings describe, or `None` when imports are
    /// not followed. `default_root` is used when `root_dir` is unset.
    pub fn loader(&self, default_root: &Path) -> Option<Arc<dyn Loader>> {
        if !self.follow_imports {
            return None;
        }

        let root = self.loader.root_dir.clone().unwrap_or_else(|| default_root.to_path_buf());
        let mut loader = DefaultLoader::new(FsLoader::new(root));
        if self.loader.allow_remote {
            loader = loader.with_http(HttpLoader::new(self.loader.max_retries));
        }
        Some(Arc::new(loader))
    }
}
