//! Regex-driven recognition of element registrations and module definitions.

use regex::Regex;
use std::sync::LazyLock;

use super::lexer::mask_comments;
use super::{ScriptMetadata, ScriptParser};
use crate::core::SyntaxError;
use crate::models::{ElementRecord, ModuleRecord};

/// `Polymer({ is: 'x-foo', ... })`. The `is` key must come before any nested object.
static ELEMENT_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bPolymer\s*\(\s*\{[^{}]*?\bis\s*:\s*(?:'([^'\n]+)'|"([^"\n]+)")"#)
        .expect("element object pattern is valid")
});

/// `Polymer('x-foo', { ... })`.
static ELEMENT_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bPolymer\s*\(\s*(?:'([^'\n]+)'|"([^"\n]+)")"#).expect("named element pattern is valid")
});

/// `modulate('name', ...)` and `define('name', ...)`.
static MODULE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:modulate|define)\s*\(\s*(?:'([^'\n]+)'|"([^"\n]+)")"#)
        .expect("module definition pattern is valid")
});

/// The default [`ScriptParser`].
///
/// Comments are blanked before matching, so commented-out registrations are
/// ignored. Bodies with unbalanced delimiters are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationScanner;

impl RegistrationScanner {
    /// Create a scanner.
    pub fn new() -> Self {
        Self
    }
}

impl ScriptParser for RegistrationScanner {
    fn parse(&self, text: &str, attach: bool) -> Result<ScriptMetadata, SyntaxError> {
        let masked = mask_comments(text)?;
        let attached = attach.then(|| text.to_string());

        let mut elements: Vec<(usize, String)> = captures(&ELEMENT_OBJECT, &masked)
            .chain(captures(&ELEMENT_NAMED, &masked))
            .collect();
        elements.sort_by_key(|(offset, _)| *offset);

        let elements = elements
            .into_iter()
            .map(|(offset, name)| {
                let mut record = ElementRecord::new(name, line_of(&masked, offset));
                record.script = attached.clone();
                record
            })
            .collect();

        let modules = captures(&MODULE_DEFINITION, &masked)
            .map(|(offset, name)| {
                let mut record = ModuleRecord::new(name, line_of(&masked, offset));
                record.script = attached.clone();
                record
            })
            .collect();

        Ok(ScriptMetadata {
            elements,
            modules,
        })
    }
}

/// (match offset, quoted name) for every match of `pattern`.
fn captures<'t>(pattern: &'t Regex, text: &'t str) -> impl Iterator<Item = (usize, String)> + 't {
    pattern.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1).or_else(|| caps.get(2))?;
        Some((whole.start(), name.as_str().to_string()))
    })
}

fn line_of(text: &str, offset: usize) -> usize {
    1 + memchr::memchr_iter(b'\n', &text.as_bytes()[..offset]).count()
}
