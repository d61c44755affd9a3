//! Shared data models for metadata extraction
//!
//! These are the records produced by the script parser, aggregated per
//! document by the resolver, and assembled into a [`MetadataTreeNode`] by the
//! tree builder. Everything here serializes with `serde` so the CLI can emit
//! the tree as JSON.

mod tree_node;

pub use tree_node::{MetadataTreeNode, TreeImport};

use serde::Serialize;
use std::fmt;

/// The registry a named definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    /// A custom element registration
    Element,
    /// A named script module definition
    Module,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// Metadata for one custom element declared in a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRecord {
    /// Element name, unique across the whole analysis
    pub is: String,
    /// Address of the document whose script declared the element
    pub href: String,
    /// Address of the external script the declaration came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_href: Option<String>,
    /// 1-based line of the declaration inside the script body
    pub line: usize,
    /// Script body, present when the analyzer attaches scripts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Index into the declaring document's template list, once bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<usize>,
}

impl ElementRecord {
    /// Create an unbound record as the script parser sees it.
    pub fn new(is: impl Into<String>, line: usize) -> Self {
        Self {
            is: is.into(),
            href: String::new(),
            script_href: None,
            line,
            script: None,
            template: None,
        }
    }
}

/// Metadata for one named module declared in a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRecord {
    /// Module name, unique across the whole analysis
    pub is: String,
    /// Address of the document whose script declared the module
    pub href: String,
    /// Address of the external script the declaration came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_href: Option<String>,
    /// 1-based line of the declaration inside the script body
    pub line: usize,
    /// Script body, present when the analyzer attaches scripts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl ModuleRecord {
    /// Create a record as the script parser sees it.
    pub fn new(is: impl Into<String>, line: usize) -> Self {
        Self {
            is: is.into(),
            href: String::new(),
            script_href: None,
            line,
            script: None,
        }
    }
}

/// Elements and modules extracted from one document's scripts.
///
/// Aggregation is plain concatenation; duplicates are caught when records
/// are registered, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataAggregate {
    /// Elements in script order
    pub elements: Vec<ElementRecord>,
    /// Modules in script order
    pub modules: Vec<ModuleRecord>,
}

impl MetadataAggregate {
    /// Append `other`'s elements and modules after this aggregate's own.
    pub fn extend(&mut self, other: MetadataAggregate) {
        self.elements.extend(other.elements);
        self.modules.extend(other.modules);
    }

    /// True when no element or module was found.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.modules.is_empty()
    }

    /// Names of all elements, in order.
    pub fn element_names(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.is.as_str()).collect()
    }

    /// Names of all modules, in order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.is.as_str()).collect()
    }
}
