//! Backend registry
//!
//! Maps dotted backend identifiers such as `rax_storage.FileSystemStorage` to
//! factories, so the backend can be chosen from configuration.

use log::debug;
use std::collections::HashMap;
use std::fmt;

use crate::config::StorageConfig;
use crate::error::{ResolveError, StorageError};
use crate::storage::{FileSystemStorage, Storage};

/// Identifier of the built-in filesystem backend.
pub const FILESYSTEM_BACKEND: &str = "rax_storage.FileSystemStorage";

/// Builds a backend from configuration.
pub type BuildFn = fn(&StorageConfig) -> Result<Box<dyn Storage>, StorageError>;

/// A registered backend constructor
#[derive(Clone, Copy)]
pub struct BackendFactory {
    name: &'static str,
    build: BuildFn,
}

impl BackendFactory {
    pub const fn new(name: &'static str, build: BuildFn) -> Self {
        Self { name, build }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn build(&self, config: &StorageConfig) -> Result<Box<dyn Storage>, StorageError> {
        (self.build)(config)
    }
}

impl fmt::Debug for BackendFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendFactory")
            .field("name", &self.name)
            .finish()
    }
}

fn build_filesystem(config: &StorageConfig) -> Result<Box<dyn Storage>, StorageError> {
    let storage = FileSystemStorage::new(&config.location, config.base_uri.clone())?;
    Ok(Box::new(storage))
}

fn split_identifier(id: &str) -> Result<(&str, &str), ResolveError> {
    id.rsplit_once('.')
        .ok_or_else(|| ResolveError::InvalidPath(id.to_string()))
}

/// Registry of backend factories keyed by module then attribute.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    modules: HashMap<String, HashMap<String, BackendFactory>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "rax_storage",
            "FileSystemStorage",
            BackendFactory::new("FileSystemStorage", build_filesystem),
        );
        registry
    }

    fn insert(&mut self, module: &str, attribute: &str, factory: BackendFactory) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(attribute.to_string(), factory);
    }

    /// Register `factory` under a dotted identifier. Re-registering replaces
    /// the previous factory.
    pub fn register(&mut self, id: &str, factory: BackendFactory) -> Result<(), ResolveError> {
        let (module, attribute) = split_identifier(id)?;
        self.insert(module, attribute, factory);
        debug!("Registered storage backend {}", id);
        Ok(())
    }

    /// Look up the factory for a dotted identifier.
    pub fn resolve(&self, id: &str) -> Result<&BackendFactory, ResolveError> {
        let (module, attribute) = split_identifier(id)?;
        let attributes = self
            .modules
            .get(module)
            .ok_or_else(|| ResolveError::ModuleNotFound(module.to_string()))?;
        attributes
            .get(attribute)
            .ok_or_else(|| ResolveError::AttributeNotFound {
                module: module.to_string(),
                attribute: attribute.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_uses_last_dot() {
        assert_eq!(
            split_identifier("a.b.Backend").unwrap(),
            ("a.b", "Backend")
        );
        assert_eq!(
            split_identifier("NoDots"),
            Err(ResolveError::InvalidPath("NoDots".into()))
        );
    }

    #[test]
    fn register_rejects_undotted_ids() {
        let mut registry = BackendRegistry::new();
        let err = registry
            .register("Plain", BackendFactory::new("Plain", build_filesystem))
            .unwrap_err();
        assert_eq!(err, ResolveError::InvalidPath("Plain".into()));
    }

    #[test]
    fn registering_twice_replaces() {
        let mut registry = BackendRegistry::with_defaults();
        registry
            .register(FILESYSTEM_BACKEND, BackendFactory::new("Other", build_filesystem))
            .unwrap();
        assert_eq!(registry.resolve(FILESYSTEM_BACKEND).unwrap().name(), "Other");
    }
}
