//! Document and script retrieval.
//!
//! The resolver never touches the filesystem or the network itself; it asks a
//! [`Loader`] for the text behind an absolute address. Failures are opaque to
//! the resolver and are propagated unchanged inside
//! [`MetatreeError::Loader`](crate::core::MetatreeError::Loader).
//!
//! # Implementations
//!
//! - [`FsLoader`] - local files under a root directory
//! - [`HttpLoader`] - `http(s)` with exponential backoff retries
//! - [`MemoryLoader`] - an in-memory map, handy for embedding and tests
//! - [`DefaultLoader`] - routes by scheme between the first two
//!
//! Retry and timeout policy is the loader's business. A loader that never
//! resolves stalls the analysis that depends on it.

mod fs;
mod http;
mod memory;

pub use fs::FsLoader;
pub use http::HttpLoader;
pub use memory::MemoryLoader;

use anyhow::{Result, bail};
use futures::FutureExt;
use futures::future::BoxFuture;

/// Fetches the UTF-8 text at an absolute address.
pub trait Loader: Send + Sync {
    /// Request the text at `href`.
    fn request<'a>(&'a self, href: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Filesystem loader with optional remote fetching.
///
/// `http://` and `https://` addresses go to the [`HttpLoader`] when remote
/// loading is enabled and fail otherwise. Everything else is read from disk.
pub struct DefaultLoader {
    fs: FsLoader,
    http: Option<HttpLoader>,
}

impl DefaultLoader {
    /// Local-only loader rooted at `fs`.
    pub fn new(fs: FsLoader) -> Self {
        Self {
            fs,
            http: None,
        }
    }

    /// Enable remote fetching through `http`.
    #[must_use]
    pub fn with_http(mut self, http: HttpLoader) -> Self {
        self.http = Some(http);
        self
    }

    /// True when `http(s)` addresses will be fetched.
    pub fn allows_remote(&self) -> bool {
        self.http.is_some()
    }
}

impl Loader for DefaultLoader {
    fn request<'a>(&'a self, href: &'a str) -> BoxFuture<'a, Result<String>> {
        if !is_remote(href) {
            return self.fs.request(href);
        }
        match &self.http {
            Some(http) => http.request(href),
            None => async move {
                bail!(
                    "Remote loading is disabled, refusing to fetch '{href}' (set allow_remote = true under [loader])"
                )
            }
            .boxed(),
        }
    }
}

fn is_remote(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
