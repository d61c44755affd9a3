//! In-memory loader.

use anyhow::{Result, anyhow};
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::time::Duration;

use super::Loader;

/// Serves documents from a map and counts how often each address is requested.
///
/// Per-address delays make it possible to control fetch completion order.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    documents: DashMap<String, String>,
    delays: DashMap<String, Duration>,
    requests: DashMap<String, usize>,
}

impl MemoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_document(self, href: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(href, text);
        self
    }

    /// Delay every response for `href` by `delay`.
    #[must_use]
    pub fn with_delay(self, href: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(href.into(), delay);
        self
    }

    /// Add or replace the text served for `href`.
    pub fn insert(&self, href: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(href.into(), text.into());
    }

    /// How many times `href` has been requested.
    pub fn request_count(&self, href: &str) -> usize {
        self.requests.get(href).map_or(0, |count| *count)
    }

    /// Requests across all addresses.
    pub fn total_requests(&self) -> usize {
        self.requests.iter().map(|entry| *entry.value()).sum()
    }
}

impl Loader for MemoryLoader {
    fn request<'a>(&'a self, href: &'a str) -> BoxFuture<'a, Result<String>> {
        async move {
            *self.requests.entry(href.to_string()).or_insert(0) += 1;

            let delay = self.delays.get(href).map(|d| *d);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.documents
                .get(href)
                .map(|text| text.clone())
                .ok_or_else(|| anyhow!("No document registered for '{href}'"))
        }
        .boxed()
    }
}
