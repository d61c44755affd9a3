//! metatree - merged metadata trees for HTML-import based component libraries
//!
//! Given a root document, metatree follows its `<link rel="import">` links,
//! extracts custom element registrations and named module definitions from
//! every inline and external script, and assembles one tree mirroring the
//! import structure. Every distinct document is fetched and parsed exactly once.
//!
//! # Architecture Overview
//!
//! Leaves first:
//! - [`markup`] - tolerant HTML scanner producing scripts, import links and templates
//! - [`script`] - registration scanner for element and module declarations
//! - [`loader`] - filesystem, HTTP and in-memory document retrieval
//! - [`resolver`] - memoized asynchronous resolution of documents and their imports,
//!   script metadata extraction and duplicate-name registries
//! - [`tree`] - tree assembly with cycle short-circuiting and template binding
//! - [`analyzer`] - the public entry point tying the above together
//!
//! Supporting modules:
//! - [`config`] - `metatree.toml` settings
//! - [`core`] - error types and user-facing error rendering
//! - [`models`] - element, module and tree records
//! - [`cli`] - the `metatree` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use metatree::analyzer::Analyzer;
//! use metatree::loader::{Loader, MemoryLoader};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let loader = MemoryLoader::new()
//!     .with_document("x-button.html", "<script>Polymer({is: 'x-button'});</script>");
//! let loader: Arc<dyn Loader> = Arc::new(loader);
//!
//! let analyzer = Analyzer::new(
//!     r#"<link rel="import" href="x-button.html">"#,
//!     false,
//!     "index.html",
//!     Some(loader),
//! )?;
//!
//! let tree = analyzer.metadata_tree().await?;
//! assert_eq!(tree.children().next().map(|c| c.elements.len()), Some(1));
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Tree of imports with declared elements and modules
//! metatree tree index.html
//!
//! # Full metadata as JSON
//! metatree tree index.html --format json
//!
//! # Transitive imports, breadth-first
//! metatree deps index.html
//! ```

// Core engine
pub mod analyzer;
pub mod resolver;
pub mod tree;

// Collaborators
pub mod loader;
pub mod markup;
pub mod script;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod models;

// Test utilities (only compiled in test mode or with test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
