//! Script body parsing.
//!
//! A [`ScriptParser`] turns one script body into the element and module
//! declarations it contains. [`RegistrationScanner`] recognizes the usual
//! registration calls without executing or fully parsing the script.

mod lexer;
mod scanner;

pub use scanner::RegistrationScanner;

use crate::core::SyntaxError;
use crate::models::{ElementRecord, ModuleRecord};

/// Declarations found in one script body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMetadata {
    /// Element registrations in source order
    pub elements: Vec<ElementRecord>,
    /// Module definitions in source order
    pub modules: Vec<ModuleRecord>,
}

/// Extracts declarations from a script body.
pub trait ScriptParser: Send + Sync {
    /// Parse `text`. When `attach` is set, every record carries the script body.
    fn parse(&self, text: &str, attach: bool) -> Result<ScriptMetadata, SyntaxError>;
}
