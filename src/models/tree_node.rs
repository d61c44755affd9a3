//! The merged metadata tree returned by the analyzer.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;

use super::{ElementRecord, ModuleRecord};
use crate::markup::{MarkupDocument, MarkupNode};

/// One document in the metadata tree, with its imports nested below it.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataTreeNode {
    /// Absolute address of the document
    pub href: String,
    /// Elements declared by this document's own scripts
    pub elements: Vec<ElementRecord>,
    /// Modules declared by this document's own scripts
    pub modules: Vec<ModuleRecord>,
    /// Parsed markup of the document
    pub structure: Arc<MarkupDocument>,
    /// Imports in declaration order
    pub imports: Vec<TreeImport>,
}

/// An entry in a node's `imports` list.
#[derive(Debug, Clone)]
pub enum TreeImport {
    /// First visit of the address in this walk: the full subtree.
    Expanded(Box<MetadataTreeNode>),
    /// The address was already visited earlier in this walk.
    ///
    /// Serializes as an empty object; the address is only kept for display.
    Placeholder {
        /// The address that was skipped
        href: String,
    },
}

impl TreeImport {
    /// The expanded subtree, if this entry is not a placeholder.
    pub fn as_node(&self) -> Option<&MetadataTreeNode> {
        match self {
            Self::Expanded(node) => Some(node),
            Self::Placeholder {
                ..
            } => None,
        }
    }

    /// True for a revisited address.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    /// Address this entry refers to.
    pub fn href(&self) -> &str {
        match self {
            Self::Expanded(node) => &node.href,
            Self::Placeholder {
                href,
            } => href,
        }
    }
}

impl Serialize for TreeImport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Expanded(node) => node.serialize(serializer),
            Self::Placeholder {
                ..
            } => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

impl MetadataTreeNode {
    /// The template bound to `element`, looked up in this node's own markup.
    pub fn template_for(&self, element: &ElementRecord) -> Option<&MarkupNode> {
        element.template.and_then(|index| self.structure.templates.get(index))
    }

    /// Expanded child subtrees, skipping placeholders.
    pub fn children(&self) -> impl Iterator<Item = &MetadataTreeNode> {
        self.imports.iter().filter_map(TreeImport::as_node)
    }

    /// Addresses of every expanded node in the tree, depth-first pre-order.
    pub fn expanded_hrefs(&self) -> Vec<&str> {
        let mut hrefs = vec![self.href.as_str()];
        for child in self.children() {
            hrefs.extend(child.expanded_hrefs());
        }
        hrefs
    }

    /// Total number of elements declared anywhere in the tree.
    pub fn element_count(&self) -> usize {
        self.elements.len() + self.children().map(MetadataTreeNode::element_count).sum::<usize>()
    }

    /// Total number of modules declared anywhere in the tree.
    pub fn module_count(&self) -> usize {
        self.modules.len() + self.children().map(MetadataTreeNode::module_count).sum::<usize>()
    }
}
