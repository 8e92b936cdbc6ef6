//! # Resolver Configuration
//!
//! Describes how the default provider sequence is assembled: one
//! [`DirectoryProvider`] per search path, in the order listed, followed by any
//! fallback providers the caller supplies.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cascade_resolver::config::ConfigManager;
//! use cascade_resolver::registry::{Provider, StaticProvider};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let builtins: Arc<dyn Provider> = Arc::new(StaticProvider::new("builtins"));
//! let resolver = manager.config().assemble(vec![builtins])?;
//!
//! let unit = resolver.resolve_unit("jobs.nightly.Report")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## File Format
//!
//! ```toml
//! search_paths = ["/opt/jobs/current", "/opt/jobs/shared"]
//! unit_suffix = ".unit"
//! default_loader = "ambient"
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

pub mod loader;

use crate::constants::{AMBIENT_LOADER_ID, DEFAULT_UNIT_SUFFIX};
use crate::error::{ResolveError, Result};
use crate::logging::log_resolution_operation;
use crate::registry::{CascadingResolver, DirectoryProvider, LoaderHandle, Provider};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

pub use loader::{detect_environment, ConfigManager};

/// Root configuration structure mirroring cascade-resolver.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directories searched in order, each becoming one provider
    pub search_paths: Vec<PathBuf>,

    /// File suffix appended to unit paths by directory providers
    pub unit_suffix: String,

    /// Loader id reported while no provider is active
    pub default_loader: String,

    pub logging: LoggingConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            unit_suffix: DEFAULT_UNIT_SUFFIX.to_string(),
            default_loader: AMBIENT_LOADER_ID.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; falls back to the environment's default level
    pub level: Option<String>,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl ResolverConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.unit_suffix.is_empty() {
            return Err(ResolveError::Configuration(
                "unit_suffix must not be empty".to_string(),
            ));
        }

        if self.default_loader.trim().is_empty() {
            return Err(ResolveError::Configuration(
                "default_loader must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for path in &self.search_paths {
            if path.as_os_str().is_empty() {
                return Err(ResolveError::Configuration(
                    "search_paths must not contain empty entries".to_string(),
                ));
            }
            if !seen.insert(path) {
                return Err(ResolveError::Configuration(format!(
                    "duplicate search path: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// One directory provider per search path, in configured order.
    pub fn directory_providers(&self) -> Vec<Arc<dyn Provider>> {
        self.search_paths
            .iter()
            .map(|path| {
                Arc::new(DirectoryProvider::new(path).with_unit_suffix(&self.unit_suffix))
                    as Arc<dyn Provider>
            })
            .collect()
    }

    /// Build a resolver: search-path providers first, then `fallbacks`.
    ///
    /// Every provider is initialized; a search path that is not a directory
    /// fails the whole assembly.
    pub fn assemble(&self, fallbacks: Vec<Arc<dyn Provider>>) -> Result<CascadingResolver> {
        self.validate()?;

        let search_path_count = self.search_paths.len();
        let fallback_count = fallbacks.len();

        let resolver = CascadingResolver::builder()
            .with_providers(self.directory_providers())
            .with_providers(fallbacks)
            .with_default_loader(LoaderHandle::new(self.default_loader.clone()))
            .build()?;

        log_resolution_operation(
            "assemble",
            resolver.id(),
            None,
            None,
            "success",
            Some(&format!(
                "{search_path_count} search path(s), {fallback_count} fallback provider(s)"
            )),
        );

        Ok(resolver)
    }
}
