//! Registry of uniquely named domain objects.
//!
//! A [`NamedContainer`] owns its entries and hands them out by name.
//! Entries are built by a factory injected at construction, so the entry
//! type can need extra constructor inputs the container never sees.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Something identified by an immutable name.
pub trait Named {
    /// The entry's unique name.
    fn name(&self) -> &str;
}

/// Error from container operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("{kind} with name `{name}` already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} with name `{name}` not found")]
    NotFound { kind: &'static str, name: String },

    #[error("factory built {kind} `{actual}` when asked for `{expected}`")]
    NameMismatch {
        kind: &'static str,
        expected: String,
        actual: String,
    },
}

/// Factory used to build a new entry from its name.
pub type Factory<T> = Box<dyn Fn(&str) -> T>;

/// An insertion-ordered, name-keyed container.
pub struct NamedContainer<T> {
    kind: &'static str,
    factory: Factory<T>,
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Named> NamedContainer<T> {
    /// Create an empty container.
    ///
    /// `kind` names the entry type in error messages.
    pub fn new(kind: &'static str, factory: impl Fn(&str) -> T + 'static) -> Self {
        NamedContainer {
            kind,
            factory: Box::new(factory),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create and register a new entry.
    ///
    /// Fails if an entry with this name already exists, or if the factory
    /// built an entry under a different name; the container is left
    /// untouched in both cases.
    pub fn create(&mut self, name: &str) -> Result<&mut T, ContainerError> {
        if self.index.contains_key(name) {
            return Err(ContainerError::DuplicateName {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        self.register(name)
    }

    /// Return the entry with this name, creating it on first reference.
    pub fn maybe_create(&mut self, name: &str) -> Result<&mut T, ContainerError> {
        match self.index.get(name) {
            Some(&idx) => Ok(&mut self.entries[idx]),
            None => self.register(name),
        }
    }

    fn register(&mut self, name: &str) -> Result<&mut T, ContainerError> {
        let entry = (self.factory)(name);
        if entry.name() != name {
            return Err(ContainerError::NameMismatch {
                kind: self.kind,
                expected: name.to_string(),
                actual: entry.name().to_string(),
            });
        }

        let idx = self.entries.len();
        self.entries.push(entry);
        self.index.insert(name.to_string(), idx);

        tracing::debug!("registered {} `{}`", self.kind, name);
        Ok(&mut self.entries[idx])
    }

    /// Look up an entry by exact name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    /// Look up an entry, failing with [`ContainerError::NotFound`].
    pub fn find(&self, name: &str) -> Result<&T, ContainerError> {
        self.get(name).ok_or_else(|| ContainerError::NotFound {
            kind: self.kind,
            name: name.to_string(),
        })
    }

    /// Check whether an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All entries in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Entry names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, T: Named> IntoIterator for &'a NamedContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Named> fmt::Debug for NamedContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedContainer")
            .field("kind", &self.kind)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
