//! Error handling for metatree
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`MetatreeError`]) for everything the resolution
//!    engine can fail with
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for
//!    CLI users
//!
//! # Error Categories
//!
//! - [`MetatreeError::Parse`] - malformed markup or script text
//! - [`MetatreeError::DuplicateDefinition`] - an element or module name registered twice
//! - [`MetatreeError::Loader`] - the loader failed to produce a document or script
//! - [`MetatreeError::InvalidAddress`] - a reference that cannot be resolved
//!
//! `MetatreeError` is `Clone` because the same failure is observed by every
//! task awaiting a shared document future.
//!
//! # Examples
//!
//! ```rust,no_run
//! use metatree::core::{MetatreeError, user_friendly_error};
//!
//! let error = MetatreeError::Parse {
//!     href: "index.html".to_string(),
//!     reason: "line 3: unterminated <script> element".to_string(),
//! };
//!
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::models::DefinitionKind;

/// The main error type for document resolution.
///
/// Every failure surfaces to the nearest outstanding `metadata_tree()` or
/// `resolve()` caller; no partial tree is ever produced alongside one.
#[derive(Error, Debug, Clone)]
pub enum MetatreeError {
    /// Document markup or a script body could not be parsed.
    ///
    /// # Fields
    /// - `href`: address of the document or external script that failed
    /// - `reason`: parser diagnostic, usually prefixed with a line number
    #[error("Failed to parse '{href}': {reason}")]
    Parse {
        /// Address of the failing document or script
        href: String,
        /// Parser diagnostic
        reason: String,
    },

    /// An element or module name was registered a second time.
    #[error("Duplicate {kind} definition '{name}' in '{href}' (already defined in '{first_href}')")]
    DuplicateDefinition {
        /// Registry the conflict happened in
        kind: DefinitionKind,
        /// The conflicting identifier
        name: String,
        /// Document holding the first registration
        first_href: String,
        /// Document attempting the second registration
        href: String,
    },

    /// The loader could not produce the requested text.
    ///
    /// The loader's own error is kept as the source so its chain survives.
    #[error("Failed to load '{href}': {source}")]
    Loader {
        /// Address that was requested
        href: String,
        /// Opaque loader failure
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// An import or script reference could not be resolved against its document.
    #[error("Cannot resolve '{target}' against '{base}'")]
    InvalidAddress {
        /// Address of the referencing document
        base: String,
        /// The raw reference
        target: String,
    },

    /// A pending load outlived the resolver that started it.
    #[error("Resolver was dropped before '{href}' finished loading")]
    Detached {
        /// Address whose load was abandoned
        href: String,
    },
}

impl MetatreeError {
    /// Wrap a loader failure for `href`, keeping the original error chain.
    pub fn loader(href: impl Into<String>, error: anyhow::Error) -> Self {
        let source: Box<dyn std::error::Error + Send + Sync> = error.into();
        Self::Loader {
            href: href.into(),
            source: Arc::from(source),
        }
    }

    /// Identifier named by a duplicate-definition failure, if this is one.
    pub fn conflicting_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateDefinition {
                name,
                ..
            } => Some(name),
            _ => None,
        }
    }
}

/// A syntax error reported by one of the parsers.
///
/// Parsers know nothing about addresses; the resolver attaches the `href`
/// when it turns this into [`MetatreeError::Parse`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct SyntaxError {
    /// 1-based line the problem was detected on
    pub line: usize,
    /// What went wrong
    pub reason: String,
}

impl SyntaxError {
    /// Create a syntax error at `line`.
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Error wrapper carrying a user-facing suggestion and extra details.
///
/// Produced by [`user_friendly_error`] and rendered by the CLI with colors.
#[derive(Debug)]
pub struct ErrorContext {
    /// The error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`MetatreeError`] (anywhere in the chain), TOML configuration
/// errors and I/O errors; everything else is rendered with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(metatree_error) = error.chain().find_map(|e| e.downcast_ref::<MetatreeError>()) {
        return create_error_context(metatree_error);
    }

    if let Some(toml_error) = error.chain().find_map(|e| e.downcast_ref::<toml::de::Error>()) {
        return ErrorContext::new(format!("Invalid configuration: {toml_error}"))
            .with_suggestion(
                "Check the TOML syntax in metatree.toml. Supported keys are attach_scripts, \
                 follow_imports and the [loader] table",
            )
            .with_details("Unknown keys are rejected so that typos do not silently change behavior");
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>())
        && io_error.kind() == std::io::ErrorKind::NotFound
    {
        return ErrorContext::new(render_chain(&error))
            .with_suggestion("Check that the document path exists and is readable");
    }

    ErrorContext::new(render_chain(&error))
}

fn render_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn create_error_context(error: &MetatreeError) -> ErrorContext {
    let context = ErrorContext::new(error.to_string());
    match error {
        MetatreeError::Parse {
            ..
        } => context
            .with_suggestion("Look for unterminated tags, comments, strings or brackets near the reported line")
            .with_details("A parse failure in any imported document aborts the whole analysis"),
        MetatreeError::DuplicateDefinition {
            kind,
            ..
        } => context
            .with_suggestion(format!(
                "Rename one of the {kind} definitions or stop importing one of the documents that declares it"
            ))
            .with_details("Element and module names must be unique across every imported document"),
        MetatreeError::Loader {
            ..
        } => context
            .with_suggestion(
                "Check that the referenced document exists and is reachable, or pass --no-imports \
                 to analyze the root document on its own",
            )
            .with_details("Remote addresses are only fetched when [loader] allow_remote = true"),
        MetatreeError::InvalidAddress {
            ..
        } => context.with_suggestion("Fix the href or src attribute so it forms a valid relative or absolute URL"),
        MetatreeError::Detached {
            ..
        } => context.with_details("The analyzer was dropped while documents were still loading"),
    }
}
