//! Metadata tree assembly.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashSet;
use tracing::debug;

use super::binding::bind_templates;
use crate::core::MetatreeError;
use crate::models::{MetadataTreeNode, TreeImport};
use crate::resolver::{DocumentNode, DocumentResolver};

/// Walks resolved documents from a root and builds one [`MetadataTreeNode`].
///
/// Each [`build`](Self::build) call keeps its own visited set. An address seen
/// earlier in the walk becomes a [`TreeImport::Placeholder`] instead of being
/// expanded again, which bounds the walk on cycles and diamond imports.
pub struct MetadataTreeBuilder<'a> {
    resolver: &'a DocumentResolver,
}

impl<'a> MetadataTreeBuilder<'a> {
    /// Create a builder over `resolver`'s documents.
    pub fn new(resolver: &'a DocumentResolver) -> Self {
        Self {
            resolver,
        }
    }

    /// Build the tree rooted at `root`.
    ///
    /// Any failure in the subtree aborts the build; no partial tree is returned.
    pub async fn build(&self, root: &DocumentNode) -> Result<MetadataTreeNode, MetatreeError> {
        let mut visited = HashSet::from([root.href().to_string()]);
        self.visit(root, &mut visited).await
    }

    /// Children are built one after another in import order so the output is
    /// deterministic regardless of fetch timing.
    fn visit<'b>(
        &'b self,
        node: &'b DocumentNode,
        visited: &'b mut HashSet<String>,
    ) -> BoxFuture<'b, Result<MetadataTreeNode, MetatreeError>> {
        async move {
            let (metadata, deps) = futures::try_join!(node.metadata(), node.deps())?;

            let mut imports = Vec::with_capacity(deps.len());
            for href in deps.iter() {
                if !visited.insert(href.clone()) {
                    debug!("{href} already visited, inserting placeholder under {}", node.href());
                    imports.push(TreeImport::Placeholder {
                        href: href.clone(),
                    });
                    continue;
                }

                let child = self.resolver.load(href).await?;
                let subtree = self.visit(&child, &mut *visited).await?;
                imports.push(TreeImport::Expanded(Box::new(subtree)));
            }

            let structure = node.structure().clone();
            let mut elements = metadata.elements.clone();
            bind_templates(&mut elements, &structure);

            Ok(MetadataTreeNode {
                href: node.href().to_string(),
                elements,
                modules: metadata.modules.clone(),
                structure,
                imports,
            })
        }
        .boxed()
    }
}
