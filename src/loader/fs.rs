//! Local filesystem loader.

use anyhow::{Context, Result, anyhow, bail};
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Url;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::Loader;

/// Reads documents from disk, confined to a root directory.
///
/// Relative addresses are resolved against the root, and so are
/// site-root-relative ones (`/components/a.html`). `file://` URLs are accepted
/// only when they point inside it.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// The directory relative addresses are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `href` to a path inside the root.
    pub fn path_for(&self, href: &str) -> Result<PathBuf> {
        let root = normalize(&std::path::absolute(&self.root).with_context(|| {
            format!("Failed to resolve loader root {}", self.root.display())
        })?)
        .ok_or_else(|| anyhow!("Invalid loader root {}", self.root.display()))?;

        let requested = if href.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:")) {
            Url::parse(href)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| anyhow!("'{href}' is not a valid file URL"))?
        } else if href.contains("://") {
            bail!("Unsupported address '{href}' for filesystem loader");
        } else {
            root.join(href.trim_start_matches('/'))
        };

        match normalize(&requested) {
            Some(path) if path.starts_with(&root) => Ok(path),
            _ => bail!("'{href}' escapes the loader root {}", root.display()),
        }
    }
}

impl Loader for FsLoader {
    fn request<'a>(&'a self, href: &'a str) -> BoxFuture<'a, Result<String>> {
        async move {
            let path = self.path_for(href)?;
            debug!("Reading {}", path.display());
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))
        }
        .boxed()
    }
}

/// Lexically remove `.` and `..`; `None` if `..` climbs above the start.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            other => out.push(other),
        }
    }
    Some(out)
}
