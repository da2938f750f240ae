//! Write-once lookup tables for parsers.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::{NameParser, TypeParser};
use crate::error::BindError;
use crate::value::TypeInfo;

/// Type parsers keyed by the type they produce.
pub struct TypeParsers<C> {
    parsers: HashMap<TypeId, Arc<dyn TypeParser<C>>>,
}

impl<C> TypeParsers<C> {
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register a parser. A second parser for the same type is an error.
    pub fn insert(&mut self, parser: Arc<dyn TypeParser<C>>) -> Result<(), BindError> {
        let ty = parser.type_info();
        if self.parsers.contains_key(&ty.id()) {
            return Err(BindError::DuplicateTypeParser(ty.name()));
        }
        self.parsers.insert(ty.id(), parser);
        Ok(())
    }

    pub fn get(&self, ty: &TypeInfo) -> Option<&Arc<dyn TypeParser<C>>> {
        self.parsers.get(&ty.id())
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Names of the registered types.
    pub fn types(&self) -> Vec<&'static str> {
        self.parsers.values().map(|p| p.type_info().name()).collect()
    }
}

impl<C> Default for TypeParsers<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Name parsers keyed by marker.
pub struct NameParsers<C> {
    parsers: HashMap<String, Arc<dyn NameParser<C>>>,
}

impl<C> NameParsers<C> {
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register a parser. A second parser for the same marker is an error.
    pub fn insert(&mut self, parser: Arc<dyn NameParser<C>>) -> Result<(), BindError> {
        let name = parser.name().to_string();
        if self.parsers.contains_key(&name) {
            return Err(BindError::DuplicateNameParser(name));
        }
        self.parsers.insert(name, parser);
        Ok(())
    }

    pub fn get(&self, marker: &str) -> Option<&Arc<dyn NameParser<C>>> {
        self.parsers.get(marker)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Registered markers.
    pub fn markers(&self) -> Vec<&str> {
        self.parsers.keys().map(|s| s.as_str()).collect()
    }
}

impl<C> Default for NameParsers<C> {
    fn default() -> Self {
        Self::new()
    }
}
