//! Error types for the cascading resolver.
//!

use thiserror::Error;

/// Boxed cause carried by provider failures.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// No provider recognizes the name. Propagated verbatim by the resolver.
    #[error("Not found: {name}")]
    NotFound { name: String },

    /// Unexpected failure inside a provider that is not a not-found signal.
    #[error("Provider error in {provider}: {message}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// Every provider was tried and the last failure was not `NotFound`.
    #[error("Unable to resolve '{name}' by any known provider")]
    ResolutionFailed {
        name: String,
        #[source]
        cause: Box<ResolveError>,
    },

    #[error("Failed to initialize provider {provider}: {source}")]
    Initialization {
        provider: String,
        #[source]
        source: BoxedCause,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ResolveError {
    pub fn not_found(name: impl Into<String>) -> Self {
        ResolveError::NotFound { name: name.into() }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ResolveError::Provider {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn provider_with_source(
        provider: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxedCause>,
    ) -> Self {
        ResolveError::Provider {
            provider: provider.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn resolution_failed(name: impl Into<String>, cause: ResolveError) -> Self {
        ResolveError::ResolutionFailed {
            name: name.into(),
            cause: Box::new(cause),
        }
    }

    pub fn initialization(provider: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        ResolveError::Initialization {
            provider: provider.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }

    pub fn is_resolution_failed(&self) -> bool {
        matches!(self, ResolveError::ResolutionFailed { .. })
    }

    /// The failure wrapped by `ResolutionFailed`, if any.
    pub fn wrapped_cause(&self) -> Option<&ResolveError> {
        match self {
            ResolveError::ResolutionFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl From<::config::ConfigError> for ResolveError {
    fn from(error: ::config::ConfigError) -> Self {
        ResolveError::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
