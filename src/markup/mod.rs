//! Document markup parsing.
//!
//! The resolver only needs three ordered views of a document: its `<script>`
//! nodes, its import links and its `<dom-module>` templates. [`DocumentParser`]
//! is the seam; [`HtmlScanner`] is the tolerant scanner shipped with the crate.

mod attributes;
mod scanner;

pub use scanner::HtmlScanner;

use serde::Serialize;

use crate::core::SyntaxError;

/// Parses raw document text into a [`MarkupDocument`].
pub trait DocumentParser: Send + Sync {
    /// Parse `text`; fails on malformed markup.
    fn parse(&self, text: &str) -> Result<MarkupDocument, SyntaxError>;
}

/// The structural representation of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkupDocument {
    /// `<script>` nodes in document order
    pub scripts: Vec<MarkupNode>,
    /// `<link rel="import">` nodes in document order
    pub imports: Vec<MarkupNode>,
    /// `<dom-module>` nodes in document order
    pub templates: Vec<MarkupNode>,
}

/// A single element of interest with its attributes and raw body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupNode {
    /// Lowercased tag name
    pub tag: String,
    /// Attributes in source order; names are lowercased
    pub attributes: Vec<(String, String)>,
    /// Raw body text for elements whose content is kept (scripts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// 1-based line of the opening tag
    pub line: usize,
}

impl MarkupNode {
    /// Create a node with no attributes and no body.
    pub fn new(tag: impl Into<String>, line: usize) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
            line,
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Builder-style body setter.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Value of the first attribute named `name` (case-insensitive).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// True when the attribute is present, even with an empty value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}
