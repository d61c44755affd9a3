//! Asynchronous document resolution.
//!
//! [`DocumentResolver`] turns raw document text into [`DocumentNode`]s,
//! following import links through the configured [`Loader`] and extracting
//! script metadata with [`ScriptMetadataExtractor`].
//!
//! # Memoization
//!
//! Every address is parsed at most once per resolver and fetched at most once.
//! Two tables enforce this, both owned by the resolver and never cleared:
//!
//! - `documents`: address to resolved [`DocumentNode`]
//! - `inflight`: address to the shared fetch-and-resolve future
//!
//! Concurrent requests for one address await the same shared future instead
//! of calling the loader again.
//!
//! # Laziness
//!
//! Markup is parsed synchronously inside [`DocumentResolver::resolve`], so a
//! malformed document fails immediately. Script extraction and import
//! fetching are shared futures. When a tokio runtime is available, `resolve`
//! spawns a newly registered document's `deps` future, which extracts its
//! scripts and fetches its imports; each fetched import is resolved the same
//! way. Independent subtrees are therefore fetched concurrently while callers
//! still consume results in import order. Outside a runtime the futures run
//! when a caller awaits [`DocumentNode::metadata`] or [`DocumentNode::deps`].
//!
//! # Cycles
//!
//! A document's `deps` waits for its imports to be fetched and parsed, never
//! for their own `deps`. Import cycles therefore cannot deadlock; the tree
//! builder's visited set bounds the walk.

mod document;
mod href;
mod registry;
mod scripts;

pub use document::{DocumentNode, SharedResult};
pub use href::resolve_href;
pub use registry::{DefinitionRegistry, Registries};
pub use scripts::ScriptMetadataExtractor;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{self, try_join_all};
use futures::{FutureExt, TryFutureExt};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Weak};
use tracing::{debug, error};

use crate::constants::IMPORT_HREF_ATTR;
use crate::core::MetatreeError;
use crate::loader::Loader;
use crate::markup::{DocumentParser, MarkupDocument};
use crate::models::MetadataAggregate;
use crate::script::ScriptParser;

/// Resolves documents and their imports, memoized per address.
///
/// Cheap to clone; clones share the same tables and registries.
#[derive(Clone)]
pub struct DocumentResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    documents: DashMap<String, Arc<DocumentNode>>,
    inflight: DashMap<String, SharedResult<Arc<DocumentNode>>>,
    markup: Arc<dyn DocumentParser>,
    scripts: ScriptMetadataExtractor,
    loader: Option<Arc<dyn Loader>>,
    registries: Arc<Registries>,
}

impl DocumentResolver {
    /// Create a resolver.
    ///
    /// Without a loader, imports are not followed and external scripts
    /// contribute nothing.
    pub fn new(
        markup: Arc<dyn DocumentParser>,
        scripts: Arc<dyn ScriptParser>,
        loader: Option<Arc<dyn Loader>>,
        attach: bool,
    ) -> Self {
        let registries = Arc::new(Registries::default());
        let extractor = ScriptMetadataExtractor::new(scripts, loader.clone(), registries.clone(), attach);

        Self {
            inner: Arc::new(ResolverInner {
                documents: DashMap::new(),
                inflight: DashMap::new(),
                markup,
                scripts: extractor,
                loader,
                registries,
            }),
        }
    }

    /// Resolve the document at `href` from its raw `text`.
    ///
    /// Returns the existing node without reparsing if `href` was resolved
    /// before. A markup parse failure is logged and returned.
    pub fn resolve(&self, href: &str, text: &str) -> Result<Arc<DocumentNode>, MetatreeError> {
        if let Some(existing) = self.inner.documents.get(href) {
            return Ok(existing.clone());
        }

        let structure = self.inner.markup.parse(text).map_err(|err| {
            error!("Failed to parse document {href}: {err}");
            MetatreeError::Parse {
                href: href.to_string(),
                reason: err.to_string(),
            }
        })?;
        debug!(
            "Parsed {href}: {} script(s), {} import(s), {} template(s)",
            structure.scripts.len(),
            structure.imports.len(),
            structure.templates.len()
        );

        let node = Arc::new(self.build_node(href, Arc::new(structure)));
        match self.inner.documents.entry(href.to_string()) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(node.clone());
                start_in_background(&node);
                Ok(node)
            }
        }
    }

    /// Fetch and resolve `href`, joining any fetch already in flight.
    pub fn load(&self, href: &str) -> SharedResult<Arc<DocumentNode>> {
        if let Some(existing) = self.inner.documents.get(href) {
            let node = existing.clone();
            return future::ready(Ok(node)).boxed().shared();
        }

        self.inner
            .inflight
            .entry(href.to_string())
            .or_insert_with(|| fetch_and_resolve(Arc::downgrade(&self.inner), href.to_string()))
            .clone()
    }

    /// Every address transitively imported by `href`, in breadth-first
    /// discovery order, excluding `href` itself.
    pub async fn dependencies(&self, href: &str) -> Result<Vec<String>, MetatreeError> {
        let mut seen = HashSet::from([href.to_string()]);
        let mut queue = VecDeque::from([href.to_string()]);
        let mut order = Vec::new();

        while let Some(current) = queue.pop_front() {
            let node = self.load(&current).await?;
            for dep in node.deps().await?.iter() {
                if seen.insert(dep.clone()) {
                    order.push(dep.clone());
                    queue.push_back(dep.clone());
                }
            }
        }

        Ok(order)
    }

    /// The resolved node for `href`, if any.
    pub fn node(&self, href: &str) -> Option<Arc<DocumentNode>> {
        self.inner.documents.get(href).map(|entry| entry.value().clone())
    }

    /// Addresses resolved so far, sorted.
    pub fn documents(&self) -> Vec<String> {
        let mut hrefs: Vec<String> = self.inner.documents.iter().map(|entry| entry.key().clone()).collect();
        hrefs.sort();
        hrefs
    }

    /// The element and module registries.
    pub fn registries(&self) -> &Registries {
        &self.inner.registries
    }

    /// True when imports and external scripts are fetched.
    pub fn has_loader(&self) -> bool {
        self.inner.loader.is_some()
    }

    fn build_node(&self, href: &str, structure: Arc<MarkupDocument>) -> DocumentNode {
        let metadata: SharedResult<Arc<MetadataAggregate>> = if structure.scripts.is_empty() {
            future::ready(Ok(Arc::new(MetadataAggregate::default()))).boxed().shared()
        } else {
            self.inner.scripts.extract(href, &structure.scripts).map_ok(Arc::new).boxed().shared()
        };

        let deps = if self.inner.loader.is_some() {
            let targets: Vec<Result<String, MetatreeError>> = structure
                .imports
                .iter()
                .filter_map(|link| link.attr(IMPORT_HREF_ATTR))
                .filter(|target| !target.trim().is_empty())
                .map(|target| resolve_href(href, target))
                .collect();
            walk_imports(Arc::downgrade(&self.inner), href.to_string(), metadata.clone(), targets)
        } else {
            let metadata = metadata.clone();
            async move {
                metadata.await?;
                Ok(Arc::new(Vec::new()))
            }
            .boxed()
            .shared()
        };

        DocumentNode::new(href.to_string(), structure, metadata, deps)
    }
}

/// Await `metadata` and the fetch of every import, then yield the import list.
fn walk_imports(
    inner: Weak<ResolverInner>,
    href: String,
    metadata: SharedResult<Arc<MetadataAggregate>>,
    targets: Vec<Result<String, MetatreeError>>,
) -> SharedResult<Arc<Vec<String>>> {
    async move {
        let targets = targets.into_iter().collect::<Result<Vec<_>, _>>()?;
        let loads: Vec<_> = {
            let resolver = upgrade(&inner, &href)?;
            targets.iter().map(|target| resolver.load(target)).collect()
        };

        debug!("Following {} import(s) from {href}", targets.len());
        futures::try_join!(metadata, try_join_all(loads))?;
        Ok(Arc::new(targets))
    }
    .boxed()
    .shared()
}

fn fetch_and_resolve(inner: Weak<ResolverInner>, href: String) -> SharedResult<Arc<DocumentNode>> {
    async move {
        let loader = upgrade(&inner, &href)?.inner.loader.clone().ok_or_else(|| {
            MetatreeError::loader(&href, anyhow::anyhow!("No loader configured to fetch '{href}'"))
        })?;

        debug!("Fetching {href}");
        let text = loader.request(&href).await.map_err(|e| MetatreeError::loader(&href, e))?;
        upgrade(&inner, &href)?.resolve(&href, &text)
    }
    .boxed()
    .shared()
}

/// Drive `node`'s extraction and import fetches without waiting for a caller.
///
/// Failures stay in the shared futures and surface to whoever awaits them.
fn start_in_background(node: &DocumentNode) {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        let href = node.href().to_string();
        let deps = node.deps_future();
        handle.spawn(async move {
            if let Err(err) = deps.await {
                debug!("Background resolution of {href} failed: {err}");
            }
        });
    }
}

fn upgrade(inner: &Weak<ResolverInner>, href: &str) -> Result<DocumentResolver, MetatreeError> {
    inner
        .upgrade()
        .map(|inner| DocumentResolver {
            inner,
        })
        .ok_or_else(|| MetatreeError::Detached {
            href: href.to_string(),
        })
}
