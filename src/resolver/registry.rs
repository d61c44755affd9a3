//! Instance-wide name registries for elements and modules.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::core::MetatreeError;
use crate::models::{DefinitionKind, MetadataAggregate};

/// Maps each registered name to the document that first declared it.
///
/// Registration is a single `entry` operation so check-then-insert cannot race.
#[derive(Debug)]
pub struct DefinitionRegistry {
    kind: DefinitionKind,
    names: DashMap<String, String>,
}

impl DefinitionRegistry {
    /// Create an empty registry for `kind`.
    pub fn new(kind: DefinitionKind) -> Self {
        Self {
            kind,
            names: DashMap::new(),
        }
    }

    /// Record `name` as declared by `href`, or fail if it is already taken.
    pub fn register(&self, name: &str, href: &str) -> Result<(), MetatreeError> {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(existing) => Err(MetatreeError::DuplicateDefinition {
                kind: self.kind,
                name: name.to_string(),
                first_href: existing.get().clone(),
                href: href.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(href.to_string());
                Ok(())
            }
        }
    }

    /// Document that declared `name`, if registered.
    pub fn declared_in(&self, name: &str) -> Option<String> {
        self.names.get(name).map(|entry| entry.value().clone())
    }

    /// True when `name` has been registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The element and module registries owned by one resolver.
#[derive(Debug)]
pub struct Registries {
    /// Custom element names
    pub elements: DefinitionRegistry,
    /// Script module names
    pub modules: DefinitionRegistry,
}

impl Default for Registries {
    fn default() -> Self {
        Self {
            elements: DefinitionRegistry::new(DefinitionKind::Element),
            modules: DefinitionRegistry::new(DefinitionKind::Module),
        }
    }
}

impl Registries {
    /// Register every record in `aggregate` under its own `href`.
    ///
    /// Stops at the first conflict; names registered before it stay registered.
    pub fn register_all(&self, aggregate: &MetadataAggregate) -> Result<(), MetatreeError> {
        for element in &aggregate.elements {
            self.elements.register(&element.is, &element.href)?;
        }
        for module in &aggregate.modules {
            self.modules.register(&module.is, &module.href)?;
        }
        Ok(())
    }
}
