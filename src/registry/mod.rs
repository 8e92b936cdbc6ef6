//! # Registry Infrastructure
//!
//! Cascading resolution of code units and resources across providers.
//!
//! ## Overview
//!
//! A [`CascadingResolver`] owns an ordered list of [`Provider`]s and answers
//! three kinds of lookup by asking them in turn. The provider that last
//! answered is remembered and asked first next time.
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── Provider              (Capability set every provider exposes)
//! ├── CascadingResolver     (Ordered chain + active-provider fast path)
//! ├── ResolverMetrics       (Fast-path and cascade counters)
//! └── providers
//!     ├── StaticProvider    (In-memory registry)
//!     └── DirectoryProvider (Directory tree on disk)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cascade_resolver::registry::{CascadingResolver, StaticProvider};
//! use std::sync::Arc;
//!
//! # fn main() -> cascade_resolver::error::Result<()> {
//! let resolver = CascadingResolver::builder()
//!     .with_provider(Arc::new(StaticProvider::new("builtins")))
//!     .build()?;
//!
//! assert!(resolver.resolve_resource_handle("missing.txt").is_none());
//! # Ok(())
//! # }
//! ```

pub mod cascading_resolver;
pub mod metrics;
pub mod provider;
pub mod providers;

pub use cascading_resolver::{CascadingResolver, CascadingResolverBuilder, ResolverStats};
pub use metrics::{ResolverMetrics, ResolverMetricsSnapshot};
pub use provider::{CodeUnit, LoaderHandle, Provider, ResourceHandle, ResourceStream};
pub use providers::{DirectoryProvider, StaticProvider};
