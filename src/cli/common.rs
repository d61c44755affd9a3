//! Shared setup for commands that analyze a document.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::analyzer::Analyzer;
use crate::config::AnalyzerConfig;

/// Which document to analyze and how.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Root document to analyze
    pub document: PathBuf,

    /// Do not follow imports or external scripts (metadata-only mode)
    #[arg(long)]
    pub no_imports: bool,

    /// Attach script bodies to element and module records
    #[arg(long)]
    pub attach_scripts: bool,
}

impl AnalyzeArgs {
    /// Load configuration, read the document and start the analysis.
    ///
    /// The root document is addressed relative to the loader root, which is
    /// `root_dir` from the config or the document's own directory.
    pub async fn analyzer(&self, config_path: Option<&Path>) -> Result<Analyzer> {
        let document = fs::canonicalize(&self.document)
            .await
            .with_context(|| format!("Document {} not found", self.document.display()))?;
        let document_dir = document.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let mut config = AnalyzerConfig::load_with_optional(config_path, &document_dir).await?;
        if self.no_imports {
            config.follow_imports = false;
        }
        if self.attach_scripts {
            config.attach_scripts = true;
        }

        let root_dir = match &config.loader.root_dir {
            Some(dir) => fs::canonicalize(dir)
                .await
                .with_context(|| format!("Loader root {} not found", dir.display()))?,
            None => document_dir,
        };
        config.loader.root_dir = Some(root_dir.clone());

        let href = document_href(&document, &root_dir)?;
        debug!("Analyzing {href} under {}", root_dir.display());

        let text = fs::read_to_string(&document)
            .await
            .with_context(|| format!("Failed to read {}", document.display()))?;

        Ok(Analyzer::new(&text, config.attach_scripts, &href, config.loader(&root_dir))?)
    }
}

/// `document` as a `/`-separated path relative to `root_dir`.
fn document_href(document: &Path, root_dir: &Path) -> Result<String> {
    let relative = document.strip_prefix(root_dir).with_context(|| {
        format!("Document {} is outside the loader root {}", document.display(), root_dir.display())
    })?;

    Ok(relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/"))
}
