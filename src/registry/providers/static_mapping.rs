//! # Static Provider
//!
//! In-memory name-to-bytes registry.
//!
//! Useful for built-in units, for overriding entries ahead of on-disk
//! providers, and in tests. Entries can be registered and removed at any
//! time; the resolver sees changes on the next lookup.
//!
//! ## Usage
//!
//! ```rust
//! use cascade_resolver::registry::{Provider, StaticProvider};
//!
//! let provider = StaticProvider::new("builtins");
//! provider.register_unit("jobs.Cleanup", b"cleanup".to_vec());
//! provider.register_resource("jobs/cleanup.yaml", b"schedule: hourly".to_vec());
//!
//! assert!(provider.resolve_unit("jobs.Cleanup").is_ok());
//! assert!(provider.resolve_resource_handle("jobs/cleanup.yaml").is_some());
//! ```

use crate::constants::MEMORY_SCHEME;
use crate::error::{ResolveError, Result};
use crate::registry::{CodeUnit, LoaderHandle, Provider, ResourceHandle, ResourceStream};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// Registry entry for a code unit.
enum UnitEntry {
    Bytes(Arc<[u8]>),

    /// Unit whose lookup fails with a provider error carrying this message
    Fault(String),
}

/// Thread-safe in-memory provider.
pub struct StaticProvider {
    name: String,
    units: RwLock<HashMap<String, UnitEntry>>,
    resources: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl fmt::Debug for StaticProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticProvider")
            .field("name", &self.name)
            .field("units", &self.units.read().keys().collect::<Vec<_>>())
            .field("resources", &self.resources.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StaticProvider {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: RwLock::new(HashMap::new()),
            resources: RwLock::new(HashMap::new()),
        }
    }

    pub fn register_unit(&self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.units
            .write()
            .insert(name.into(), UnitEntry::Bytes(bytes.into()));
    }

    /// Make lookups of `name` fail with a provider error instead of `NotFound`.
    pub fn register_fault(&self, name: impl Into<String>, message: impl Into<String>) {
        self.units
            .write()
            .insert(name.into(), UnitEntry::Fault(message.into()));
    }

    pub fn register_resource(&self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.resources.write().insert(name.into(), bytes.into());
    }

    /// Returns `true` if a unit was removed.
    pub fn unregister_unit(&self, name: &str) -> bool {
        self.units.write().remove(name).is_some()
    }

    /// Returns `true` if a resource was removed.
    pub fn unregister_resource(&self, name: &str) -> bool {
        self.resources.write().remove(name).is_some()
    }

    #[must_use]
    pub fn is_unit_registered(&self, name: &str) -> bool {
        self.units.read().contains_key(name)
    }

    /// Registered unit names, sorted.
    #[must_use]
    pub fn unit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.units.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered resource names, sorted.
    #[must_use]
    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.units.write().clear();
        self.resources.write().clear();
    }

    fn location(&self, name: &str) -> String {
        format!("{}://{}/{}", MEMORY_SCHEME, self.name, name)
    }
}

impl Provider for StaticProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn resolve_unit(&self, name: &str) -> Result<CodeUnit> {
        match self.units.read().get(name) {
            Some(UnitEntry::Bytes(bytes)) => Ok(CodeUnit::new(name, &self.name, Arc::clone(bytes))),
            Some(UnitEntry::Fault(message)) => {
                Err(ResolveError::provider(&self.name, message.clone()))
            }
            None => Err(ResolveError::not_found(name)),
        }
    }

    fn resolve_resource_handle(&self, name: &str) -> Option<ResourceHandle> {
        self.resources
            .read()
            .contains_key(name)
            .then(|| ResourceHandle::new(name, &self.name, self.location(name)))
    }

    fn resolve_resource_stream(&self, name: &str) -> Option<ResourceStream> {
        let bytes = self.resources.read().get(name).cloned()?;
        Some(ResourceStream::new(name, &self.name, Cursor::new(bytes)))
    }

    fn current_loader(&self) -> LoaderHandle {
        LoaderHandle::new(format!("static:{}", self.name))
    }
}
