//! Script-level metadata extraction for one document.

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::href::resolve_href;
use super::registry::Registries;
use crate::constants::{JAVASCRIPT_TYPES, SCRIPT_SRC_ATTR};
use crate::core::MetatreeError;
use crate::loader::Loader;
use crate::markup::MarkupNode;
use crate::models::MetadataAggregate;
use crate::script::ScriptParser;

/// Turns a document's script nodes into one [`MetadataAggregate`].
///
/// Inline scripts are parsed and registered as soon as the returned future is
/// first polled. External scripts are fetched concurrently, but the aggregate
/// always follows script order.
#[derive(Clone)]
pub struct ScriptMetadataExtractor {
    parser: Arc<dyn ScriptParser>,
    loader: Option<Arc<dyn Loader>>,
    registries: Arc<Registries>,
    attach: bool,
}

impl ScriptMetadataExtractor {
    /// Create an extractor registering into `registries`.
    pub fn new(
        parser: Arc<dyn ScriptParser>,
        loader: Option<Arc<dyn Loader>>,
        registries: Arc<Registries>,
        attach: bool,
    ) -> Self {
        Self {
            parser,
            loader,
            registries,
            attach,
        }
    }

    /// Extract metadata from `scripts`, which belong to the document at `href`.
    pub fn extract(
        &self,
        href: &str,
        scripts: &[MarkupNode],
    ) -> BoxFuture<'static, Result<MetadataAggregate, MetatreeError>> {
        let tasks: Vec<_> =
            scripts.iter().map(|node| self.process(href.to_string(), node.clone(), None)).collect();

        async move {
            let mut aggregate = MetadataAggregate::default();
            for part in try_join_all(tasks).await? {
                aggregate.extend(part);
            }
            Ok(aggregate)
        }
        .boxed()
    }

    fn process(
        &self,
        href: String,
        node: MarkupNode,
        script_href: Option<String>,
    ) -> BoxFuture<'static, Result<MetadataAggregate, MetatreeError>> {
        let this = self.clone();
        async move {
            if !is_javascript(&node) {
                warn!(
                    "Skipping script of type '{}' at {}:{}",
                    node.attr("type").unwrap_or_default(),
                    href,
                    node.line
                );
                return Ok(MetadataAggregate::default());
            }

            if let Some(text) = node.text.as_deref() {
                return this.parse_inline(&href, text, script_href);
            }

            let Some(src) = node.attr(SCRIPT_SRC_ATTR) else {
                return Ok(MetadataAggregate::default());
            };
            let Some(loader) = this.loader.clone() else {
                debug!("No loader configured, ignoring external script '{src}' in {href}");
                return Ok(MetadataAggregate::default());
            };

            let target = resolve_href(&href, src)?;
            debug!("Fetching external script {target} for {href}");
            let body = loader.request(&target).await.map_err(|e| MetatreeError::loader(&target, e))?;

            let inline = MarkupNode {
                tag: node.tag.clone(),
                attributes: node
                    .attributes
                    .iter()
                    .filter(|(name, _)| name != SCRIPT_SRC_ATTR)
                    .cloned()
                    .collect(),
                text: Some(body),
                line: node.line,
            };
            this.process(href, inline, Some(target)).await
        }
        .boxed()
    }

    fn parse_inline(
        &self,
        href: &str,
        text: &str,
        script_href: Option<String>,
    ) -> Result<MetadataAggregate, MetatreeError> {
        let parsed = self.parser.parse(text, self.attach).map_err(|err| {
            let location = script_href.as_deref().unwrap_or(href);
            error!("Failed to parse script in {location}: {err}");
            MetatreeError::Parse {
                href: location.to_string(),
                reason: err.to_string(),
            }
        })?;

        let mut aggregate = MetadataAggregate {
            elements: parsed.elements,
            modules: parsed.modules,
        };
        for element in &mut aggregate.elements {
            element.href = href.to_string();
            element.script_href.clone_from(&script_href);
        }
        for module in &mut aggregate.modules {
            module.href = href.to_string();
            module.script_href.clone_from(&script_href);
        }

        self.registries.register_all(&aggregate)?;
        debug!(
            "Registered {} element(s) and {} module(s) from {}",
            aggregate.elements.len(),
            aggregate.modules.len(),
            script_href.as_deref().unwrap_or(href)
        );
        Ok(aggregate)
    }
}

/// A missing or empty `type` counts as JavaScript; parameters are ignored.
fn is_javascript(node: &MarkupNode) -> bool {
    let Some(kind) = node.attr("type") else {
        return true;
    };
    let kind = kind.split(';').next().unwrap_or_default().trim();
    kind.is_empty() || JAVASCRIPT_TYPES.iter().any(|known| known.eq_ignore_ascii_case(kind))
}
