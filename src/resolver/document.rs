//! Per-address document state.

use futures::future::{BoxFuture, Shared};
use std::fmt;
use std::sync::Arc;

use crate::core::MetatreeError;
use crate::markup::MarkupDocument;
use crate::models::MetadataAggregate;

/// A future every interested task can await; each observes the same result.
pub type SharedResult<T> = Shared<BoxFuture<'static, Result<T, MetatreeError>>>;

/// One resolved document.
///
/// The markup is parsed eagerly. Metadata and dependencies are lazy shared
/// futures that make progress once somebody awaits them.
pub struct DocumentNode {
    href: String,
    structure: Arc<MarkupDocument>,
    metadata: SharedResult<Arc<MetadataAggregate>>,
    deps: SharedResult<Arc<Vec<String>>>,
}

impl fmt::Debug for DocumentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentNode")
            .field("href", &self.href)
            .field("structure", &self.structure)
            .finish_non_exhaustive()
    }
}

impl DocumentNode {
    pub(super) fn new(
        href: String,
        structure: Arc<MarkupDocument>,
        metadata: SharedResult<Arc<MetadataAggregate>>,
        deps: SharedResult<Arc<Vec<String>>>,
    ) -> Self {
        Self {
            href,
            structure,
            metadata,
            deps,
        }
    }

    /// Absolute address of the document.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Parsed markup.
    pub fn structure(&self) -> &Arc<MarkupDocument> {
        &self.structure
    }

    /// Elements and modules declared by the document's own scripts.
    pub async fn metadata(&self) -> Result<Arc<MetadataAggregate>, MetatreeError> {
        self.metadata.clone().await
    }

    /// Immediate import addresses in link order.
    ///
    /// Resolves only after the document's metadata and every imported
    /// document's fetch and parse have completed. Empty when no loader is set.
    pub async fn deps(&self) -> Result<Arc<Vec<String>>, MetatreeError> {
        self.deps.clone().await
    }

    pub(super) fn deps_future(&self) -> SharedResult<Arc<Vec<String>>> {
        self.deps.clone()
    }
}
