//! # Cascading Resolver
//!
//! Ordered chain of providers with an active-provider fast path.
//!
//! ## Resolution Flow
//!
//! ```text
//!        name ──────┐
//!                   │
//!              ┌────▼─────┐
//!       set    │ Active   │  unset
//!   ┌──────────┤ slot?    ├──────────────┐
//!   │          └──────────┘              │
//! ┌─▼──────────────┐            ┌────────▼──────────┐
//! │ Ask active     │  miss      │ Cascade: ask each │
//! │ provider       ├──(clear)──►│ provider in order │
//! └─┬──────────────┘            └────────┬──────────┘
//!   │ hit                                │ first hit
//!   ▼                                    ▼
//! result                        result + slot = winner
//! ```
//!
//! ## Active Slot
//!
//! One slot is shared by all three lookup kinds. A unit lookup that wins on
//! provider B makes B the first provider asked for the next resource lookup,
//! and a resource miss on B clears the slot for the next unit lookup too.
//!
//! The slot stores the winner's index into the provider sequence. The
//! sequence is append-only, so a stored index always names a live provider
//! and the slot never owns one.
//!
//! ## Failure Reporting
//!
//! Unit lookups keep only the last failure seen during a cascade. A trailing
//! `NotFound` is returned as is; anything else is wrapped in
//! `ResolutionFailed`. Resource lookups never fail: absence is `None`.
//!
//! ## Example Usage
//!
//! ```rust
//! use cascade_resolver::registry::{CascadingResolver, Provider, StaticProvider};
//! use std::sync::Arc;
//!
//! # fn main() -> cascade_resolver::error::Result<()> {
//! let jobs = Arc::new(StaticProvider::new("jobs"));
//! jobs.register_unit("jobs.Nightly", b"nightly".to_vec());
//!
//! let resolver = CascadingResolver::builder()
//!     .with_provider(Arc::new(StaticProvider::new("overrides")))
//!     .with_provider(jobs)
//!     .build()?;
//!
//! let unit = resolver.resolve_unit("jobs.Nightly")?;
//! assert_eq!(unit.provider(), "jobs");
//! assert_eq!(resolver.active_provider_name().as_deref(), Some("jobs"));
//! # Ok(())
//! # }
//! ```

use super::metrics::{ResolverMetrics, ResolverMetricsSnapshot};
use super::provider::{CodeUnit, LoaderHandle, Provider, ResourceHandle, ResourceStream};
use crate::error::{ResolveError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

/// Sentinel stored in the active slot when no provider is active.
const NO_ACTIVE_PROVIDER: usize = usize::MAX;

/// Priority-ordered provider chain with a shared active-provider slot.
///
/// ## Thread Safety
///
/// `CascadingResolver` is `Send + Sync`. The active slot is an atomic index,
/// and the sequence lock is never held while a provider runs, so concurrent
/// lookups can at worst repeat a cascade.
#[derive(Debug)]
pub struct CascadingResolver {
    id: Uuid,

    /// Providers in priority order (first = tried first). Append-only.
    providers: RwLock<Vec<Arc<dyn Provider>>>,

    /// Index of the provider that last satisfied a lookup of any kind
    active: AtomicUsize,

    /// Loader handed out when no provider is active
    default_loader: LoaderHandle,

    metrics: ResolverMetrics,
}

/// Builder for [`CascadingResolver`].
///
/// Providers are initialized in insertion order when [`build`] runs.
///
/// [`build`]: CascadingResolverBuilder::build
#[derive(Debug, Default)]
pub struct CascadingResolverBuilder {
    providers: Vec<Arc<dyn Provider>>,
    default_loader: Option<LoaderHandle>,
}

impl CascadingResolverBuilder {
    /// Append a provider; earlier providers are tried first.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    #[must_use]
    pub fn with_providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        self.providers.extend(providers);
        self
    }

    /// Override the loader returned by `current_loader` while no provider is active.
    #[must_use]
    pub fn with_default_loader(mut self, loader: LoaderHandle) -> Self {
        self.default_loader = Some(loader);
        self
    }

    /// Initialize every provider once, in order, and build the resolver.
    ///
    /// The first initialization failure aborts the build.
    pub fn build(self) -> Result<CascadingResolver> {
        let id = Uuid::new_v4();

        for (position, provider) in self.providers.iter().enumerate() {
            initialize_provider(id, position, provider)?;
        }

        info!(
            resolver_id = %id,
            provider_count = self.providers.len(),
            "Cascading resolver initialized"
        );

        Ok(CascadingResolver {
            id,
            providers: RwLock::new(self.providers),
            active: AtomicUsize::new(NO_ACTIVE_PROVIDER),
            default_loader: self.default_loader.unwrap_or_default(),
            metrics: ResolverMetrics::new(),
        })
    }
}

fn initialize_provider(
    resolver_id: Uuid,
    position: usize,
    provider: &Arc<dyn Provider>,
) -> Result<()> {
    let name = provider.provider_name();

    provider.initialize().map_err(|error| {
        warn!(
            resolver_id = %resolver_id,
            provider = name,
            position = position,
            error = %error,
            "Provider initialization failed"
        );
        match error {
            initialization @ ResolveError::Initialization { .. } => initialization,
            other => ResolveError::initialization(name, other),
        }
    })?;

    debug!(
        resolver_id = %resolver_id,
        provider = name,
        position = position,
        "Provider initialized"
    );
    Ok(())
}

impl CascadingResolver {
    #[must_use]
    pub fn builder() -> CascadingResolverBuilder {
        CascadingResolverBuilder::default()
    }

    /// Build a resolver over an already-ordered provider sequence.
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Result<Self> {
        Self::builder().with_providers(providers).build()
    }

    /// Unique id of this resolver, recorded on every lookup span.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Initialize `provider` and append it to the end of the sequence.
    ///
    /// The active slot is left untouched. On initialization failure the
    /// sequence is unchanged.
    pub fn append(&self, provider: Arc<dyn Provider>) -> Result<()> {
        let position = self.len();
        initialize_provider(self.id, position, &provider)?;

        let name = provider.provider_name().to_string();
        let mut providers = self.providers.write();
        providers.push(provider);

        info!(
            resolver_id = %self.id,
            provider = %name,
            position = providers.len() - 1,
            "Provider appended"
        );
        Ok(())
    }

    /// Resolve a code unit.
    ///
    /// Tries the active provider first; on any failure from it the slot is
    /// cleared and every provider is tried in order. If none succeeds the
    /// last failure decides the error: `NotFound` is returned unchanged,
    /// anything else is wrapped in `ResolutionFailed`.
    #[instrument(skip(self), fields(resolver_id = %self.id))]
    pub fn resolve_unit(&self, name: &str) -> Result<CodeUnit> {
        if let Some((index, provider)) = self.active_provider() {
            match provider.resolve_unit(name) {
                Ok(unit) => {
                    self.metrics.record_fast_path_hit();
                    trace!(
                        provider = provider.provider_name(),
                        "Resolved unit via active provider"
                    );
                    return Ok(unit);
                }
                Err(error) => {
                    self.metrics.record_fast_path_miss();
                    self.clear_active(index);
                    debug!(
                        provider = provider.provider_name(),
                        error = %error,
                        "Active provider could not resolve unit, cascading"
                    );
                }
            }
        }

        self.metrics.record_cascade();
        let mut last_failure: Option<ResolveError> = None;
        let mut index = 0;

        while let Some(provider) = self.provider_at(index) {
            trace!(
                provider = provider.provider_name(),
                position = index,
                "Attempting unit resolution"
            );

            match provider.resolve_unit(name) {
                Ok(unit) => {
                    self.set_active(index);
                    self.metrics.record_cascade_win();
                    debug!(provider = provider.provider_name(), position = index, "Resolved unit");
                    return Ok(unit);
                }
                Err(error) => {
                    if let Some(discarded) = last_failure.replace(error) {
                        trace!(error = %discarded, "Discarding earlier provider failure");
                    }
                }
            }
            index += 1;
        }

        self.metrics.record_exhausted();
        match last_failure {
            None => Err(ResolveError::not_found(name)),
            Some(error) if error.is_not_found() => Err(error),
            Some(error) => {
                warn!(error = %error, "No provider could resolve unit");
                Err(ResolveError::resolution_failed(name, error))
            }
        }
    }

    /// Locate a resource. Returns `None` when no provider has it.
    #[instrument(skip(self), fields(resolver_id = %self.id))]
    pub fn resolve_resource_handle(&self, name: &str) -> Option<ResourceHandle> {
        self.resolve_optional(name, "resource handle", |provider, name| {
            provider.resolve_resource_handle(name)
        })
    }

    /// Open a resource for reading. Returns `None` when no provider has it.
    #[instrument(skip(self), fields(resolver_id = %self.id))]
    pub fn resolve_resource_stream(&self, name: &str) -> Option<ResourceStream> {
        self.resolve_optional(name, "resource stream", |provider, name| {
            provider.resolve_resource_stream(name)
        })
    }

    /// Loader of the active provider, or the default loader if none is active.
    ///
    /// Never cascades and never touches the active slot.
    pub fn current_loader(&self) -> LoaderHandle {
        self.active_provider()
            .map(|(_, provider)| provider.current_loader())
            .unwrap_or_else(|| self.default_loader.clone())
    }

    pub fn default_loader(&self) -> &LoaderHandle {
        &self.default_loader
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Provider names in priority order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .read()
            .iter()
            .map(|p| p.provider_name().to_string())
            .collect()
    }

    #[must_use]
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.read().iter().any(|p| p.provider_name() == name)
    }

    /// Name of the provider currently in the active slot.
    #[must_use]
    pub fn active_provider_name(&self) -> Option<String> {
        self.active_provider()
            .map(|(_, provider)| provider.provider_name().to_string())
    }

    /// Position of the active provider in the sequence.
    #[must_use]
    pub fn active_provider_index(&self) -> Option<usize> {
        match self.active.load(Ordering::Acquire) {
            NO_ACTIVE_PROVIDER => None,
            index => Some(index),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> ResolverMetricsSnapshot {
        self.metrics.snapshot()
    }

    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            resolver_id: self.id,
            provider_count: self.len(),
            provider_names: self.provider_names(),
            active_provider: self.active_provider_name(),
            metrics: self.metrics.snapshot(),
        }
    }

    fn resolve_optional<T, F>(&self, name: &str, kind: &'static str, lookup: F) -> Option<T>
    where
        F: Fn(&dyn Provider, &str) -> Option<T>,
    {
        if let Some((index, provider)) = self.active_provider() {
            if let Some(found) = lookup(provider.as_ref(), name) {
                self.metrics.record_fast_path_hit();
                trace!(provider = provider.provider_name(), kind, "Resolved via active provider");
                return Some(found);
            }
            self.metrics.record_fast_path_miss();
            self.clear_active(index);
            debug!(
                provider = provider.provider_name(),
                kind,
                "Active provider returned nothing, cascading"
            );
        }

        self.metrics.record_cascade();
        let mut index = 0;

        while let Some(provider) = self.provider_at(index) {
            trace!(
                provider = provider.provider_name(),
                position = index,
                kind,
                "Attempting resolution"
            );

            if let Some(found) = lookup(provider.as_ref(), name) {
                self.set_active(index);
                self.metrics.record_cascade_win();
                debug!(provider = provider.provider_name(), position = index, kind, "Resolved");
                return Some(found);
            }
            index += 1;
        }

        self.metrics.record_exhausted();
        debug!(kind, "No provider has the requested resource");
        None
    }

    fn provider_at(&self, index: usize) -> Option<Arc<dyn Provider>> {
        self.providers.read().get(index).cloned()
    }

    fn active_provider(&self) -> Option<(usize, Arc<dyn Provider>)> {
        let index = self.active_provider_index()?;
        self.provider_at(index).map(|provider| (index, provider))
    }

    fn set_active(&self, index: usize) {
        self.active.store(index, Ordering::Release);
    }

    /// Clear the slot only if it still holds `index`; a concurrent winner stays.
    fn clear_active(&self, index: usize) {
        let _ = self.active.compare_exchange(
            index,
            NO_ACTIVE_PROVIDER,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

/// Snapshot of a resolver's sequence, active slot, and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverStats {
    pub resolver_id: Uuid,

    /// Number of providers in the sequence
    pub provider_count: usize,

    /// Provider names in priority order
    pub provider_names: Vec<String>,

    /// Provider currently in the active slot
    pub active_provider: Option<String>,

    pub metrics: ResolverMetricsSnapshot,
}
