//! Test utilities for metatree
//!
//! Logging setup for tests plus [`DocumentFixture`], a small builder for the
//! HTML documents the analyzer consumes.
//!
//! # Example
//!
//! ```rust,no_run
//! use metatree::test_utils::DocumentFixture;
//!
//! let html = DocumentFixture::new()
//!     .import("x-button.html")
//!     .template("x-card")
//!     .script("Polymer({is: 'x-card'});")
//!     .build();
//! assert!(html.contains(r#"<link rel="import" href="x-button.html">"#));
//! ```

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, else `RUST_LOG`
/// if set, else leaves logging off.
///
/// ```bash
/// RUST_LOG=metatree=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Builder for test documents.
///
/// Parts are emitted in the order they are added, inside `<head>`.
#[derive(Debug, Default, Clone)]
pub struct DocumentFixture {
    parts: Vec<String>,
}

impl DocumentFixture {
    /// Start an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `<link rel="import" href=...>`.
    #[must_use]
    pub fn import(mut self, href: &str) -> Self {
        self.parts.push(format!(r#"<link rel="import" href="{href}">"#));
        self
    }

    /// Add an inline script.
    #[must_use]
    pub fn script(mut self, body: &str) -> Self {
        self.parts.push(format!("<script>\n{body}\n</script>"));
        self
    }

    /// Add an external script reference.
    #[must_use]
    pub fn external_script(mut self, src: &str) -> Self {
        self.parts.push(format!(r#"<script src="{src}"></script>"#));
        self
    }

    /// Add an element registration script for `name`.
    #[must_use]
    pub fn element(self, name: &str) -> Self {
        self.script(&format!("Polymer({{\n  is: '{name}'\n}});"))
    }

    /// Add a module definition script for `name`.
    #[must_use]
    pub fn module(self, name: &str) -> Self {
        self.script(&format!("modulate('{name}', function() {{\n  return {{}};\n}});"))
    }

    /// Add `<dom-module id=...>` with an empty template.
    #[must_use]
    pub fn template(mut self, id: &str) -> Self {
        self.parts.push(format!(r#"<dom-module id="{id}"><template></template></dom-module>"#));
        self
    }

    /// Render the document.
    pub fn build(&self) -> String {
        let mut html = String::from("<!doctype html>\n<html>\n<head>\n");
        for part in &self.parts {
            html.push_str(part);
            html.push('\n');
        }
        html.push_str("</head>\n<body></body>\n</html>\n");
        html
    }
}
