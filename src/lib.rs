#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Cascade Resolver
//!
//! Resolves named code units and resources by asking an ordered list of
//! providers until one answers, and remembers the provider that answered so
//! the next lookup can go straight to it.
//!
//! ## Overview
//!
//! A scheduler that runs user-supplied jobs needs to find each job's code and
//! its companion resources. They may live in several places: per-deployment
//! search paths, a shared directory, built-in units compiled into the host.
//! [`CascadingResolver`](registry::CascadingResolver) puts those places in a
//! fixed priority order and hides the fallback logic behind three lookups:
//!
//! - `resolve_unit` - mandatory lookup; failure is an error
//! - `resolve_resource_handle` - optional lookup returning a locator
//! - `resolve_resource_stream` - optional lookup returning an open reader
//!
//! ## Module Organization
//!
//! - [`registry`] - Provider trait, cascading resolver, built-in providers
//! - [`config`] - Configuration loading and resolver assembly
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//! - [`constants`] - Shared names and defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use cascade_resolver::registry::{CascadingResolver, Provider, StaticProvider};
//! use std::sync::Arc;
//!
//! # fn main() -> cascade_resolver::Result<()> {
//! let builtins = Arc::new(StaticProvider::new("builtins"));
//! builtins.register_unit("jobs.Cleanup", b"cleanup".to_vec());
//! builtins.register_resource("jobs/cleanup.yaml", b"schedule: hourly".to_vec());
//!
//! let resolver = CascadingResolver::new(vec![builtins as Arc<dyn Provider>])?;
//!
//! let unit = resolver.resolve_unit("jobs.Cleanup")?;
//! assert_eq!(unit.bytes(), b"cleanup");
//!
//! let config = resolver.resolve_resource_stream("jobs/cleanup.yaml").unwrap();
//! assert_eq!(config.read_all().unwrap(), b"schedule: hourly");
//!
//! assert!(resolver.resolve_resource_handle("jobs/missing.yaml").is_none());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod registry;

pub use crate::config::{ConfigManager, LoggingConfig, ResolverConfig};
pub use crate::error::{ResolveError, Result};
pub use registry::{
    CascadingResolver, CascadingResolverBuilder, CodeUnit, DirectoryProvider, LoaderHandle,
    Provider, ResourceHandle, ResourceStream, ResolverStats, StaticProvider,
};
