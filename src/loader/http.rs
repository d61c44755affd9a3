//! Remote loader over HTTP(S).

use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

use super::Loader;
use crate::constants::{DEFAULT_MAX_RETRIES, MAX_BACKOFF_DELAY, STARTING_BACKOFF_DELAY_MS};

/// Fetches documents with `reqwest`, retrying transient failures.
///
/// Connection errors and 5xx responses are retried with exponential backoff
/// (50ms doubling, capped at 2s). Other non-success statuses fail at once.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    max_retries: usize,
}

impl Default for HttpLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl HttpLoader {
    /// Create a loader that retries up to `max_retries` times.
    pub fn new(max_retries: usize) -> Self {
        Self::with_client(reqwest::Client::new(), max_retries)
    }

    /// Use a preconfigured client (proxies, timeouts, headers).
    pub fn with_client(client: reqwest::Client, max_retries: usize) -> Self {
        Self {
            client,
            max_retries,
        }
    }

    async fn fetch_once(&self, href: &str) -> Result<String> {
        let response = self.client.get(href).send().await.with_context(|| format!("Request to {href} failed"))?;
        let response =
            response.error_for_status().with_context(|| format!("Server rejected request for {href}"))?;
        response.text().await.with_context(|| format!("Failed to read response body from {href}"))
    }
}

impl Loader for HttpLoader {
    fn request<'a>(&'a self, href: &'a str) -> BoxFuture<'a, Result<String>> {
        async move {
            let strategy = ExponentialBackoff::from_millis(2)
                .factor(STARTING_BACKOFF_DELAY_MS / 2)
                .max_delay(MAX_BACKOFF_DELAY)
                .take(self.max_retries);

            RetryIf::spawn(
                strategy,
                || async move {
                    debug!("GET {href}");
                    self.fetch_once(href).await
                },
                is_transient,
            )
            .await
        }
        .boxed()
    }
}

/// Retry connection-level failures and server errors only.
fn is_transient(error: &anyhow::Error) -> bool {
    match error.chain().find_map(|cause| cause.downcast_ref::<reqwest::Error>()) {
        Some(err) => match err.status() {
            Some(status) => status.is_server_error(),
            None => err.is_connect() || err.is_timeout() || err.is_request(),
        },
        None => false,
    }
}
