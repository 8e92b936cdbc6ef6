//! # Provider Strategy
//!
//! The capability set every provider in a [`CascadingResolver`] exposes.
//!
//! A provider is one independent strategy for turning a name into a code unit
//! or a resource. Providers know nothing about each other or about the
//! resolver; the resolver only ever talks to them through [`Provider`].
//!
//! ## Example: Custom Provider
//!
//! ```rust
//! use cascade_resolver::registry::{
//!     CodeUnit, LoaderHandle, Provider, ResourceHandle, ResourceStream,
//! };
//! use cascade_resolver::error::{ResolveError, Result};
//!
//! #[derive(Debug)]
//! struct BuiltinProvider;
//!
//! impl Provider for BuiltinProvider {
//!     fn provider_name(&self) -> &str {
//!         "builtin"
//!     }
//!
//!     fn resolve_unit(&self, name: &str) -> Result<CodeUnit> {
//!         match name {
//!             "builtin.Noop" => Ok(CodeUnit::new(name, "builtin", Vec::new())),
//!             _ => Err(ResolveError::not_found(name)),
//!         }
//!     }
//!
//!     fn resolve_resource_handle(&self, _name: &str) -> Option<ResourceHandle> {
//!         None
//!     }
//!
//!     fn resolve_resource_stream(&self, _name: &str) -> Option<ResourceStream> {
//!         None
//!     }
//!
//!     fn current_loader(&self) -> LoaderHandle {
//!         LoaderHandle::new("builtin")
//!     }
//! }
//! ```
//!
//! [`CascadingResolver`]: super::CascadingResolver

use crate::constants::AMBIENT_LOADER_ID;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::sync::Arc;

/// A resolved loadable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeUnit {
    name: String,
    provider: String,
    bytes: Arc<[u8]>,
}

impl CodeUnit {
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the provider that produced this unit.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Locator for a named resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub name: String,
    pub provider: String,
    /// Provider-defined location, e.g. a filesystem path or a `memory://` URI.
    pub location: String,
}

impl ResourceHandle {
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// Open readable stream over a named resource.
pub struct ResourceStream {
    name: String,
    provider: String,
    reader: Box<dyn Read + Send>,
}

impl ResourceStream {
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        reader: impl Read + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            reader: Box::new(reader),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Drain the stream into a byte vector.
    pub fn read_all(mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl Read for ResourceStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for ResourceStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStream")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// Opaque identity of a provider's loading context.
///
/// Only used to share the active loading context with third parties; never
/// consulted for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoaderHandle {
    id: String,
}

impl LoaderHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The default context used when no provider is active.
    pub fn ambient() -> Self {
        Self::new(AMBIENT_LOADER_ID)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_ambient(&self) -> bool {
        self.id == AMBIENT_LOADER_ID
    }
}

impl Default for LoaderHandle {
    fn default() -> Self {
        Self::ambient()
    }
}

impl fmt::Display for LoaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Strategy trait for resolving names to code units and resources.
///
/// ## Provider Responsibilities
///
/// - **DO**: Return `ResolveError::NotFound` from `resolve_unit` when the name
///   is simply unknown to you
/// - **DO**: Return `ResolveError::Provider` for anything else that goes wrong
/// - **DO**: Return `None` for unknown resources; absence is not an error
/// - **DON'T**: Consult other providers (the resolver does the cascading)
///
/// ## Thread Safety
///
/// Providers are shared through `Arc` and may be called from several threads,
/// so they must be `Send + Sync`.
pub trait Provider: Send + Sync + fmt::Debug {
    /// Provider name for logging and stats.
    fn provider_name(&self) -> &str;

    /// One-time setup, run when the provider is added to a resolver.
    ///
    /// A failure here is fatal to the construction or append that triggered
    /// it and is never retried.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn resolve_unit(&self, name: &str) -> Result<CodeUnit>;

    fn resolve_resource_handle(&self, name: &str) -> Option<ResourceHandle>;

    fn resolve_resource_stream(&self, name: &str) -> Option<ResourceStream>;

    fn current_loader(&self) -> LoaderHandle;
}
