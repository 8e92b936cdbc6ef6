//! # System Constants
//!
//! Environment variable names and defaults shared by the configuration,
//! logging and provider layers.

/// Environment variables consulted when detecting the runtime environment,
/// in priority order.
pub const ENVIRONMENT_VARIABLES: &[&str] = &["CASCADE_ENV", "APP_ENV"];

/// Environment used when none of [`ENVIRONMENT_VARIABLES`] is set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Prefix for configuration overrides, e.g. `CASCADE__UNIT_SUFFIX=.bin`.
pub const CONFIG_ENV_PREFIX: &str = "CASCADE";

/// Separator between the prefix and nested keys in environment overrides.
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Default configuration file name looked up in the config directory.
pub const DEFAULT_CONFIG_FILE: &str = "cascade-resolver.toml";

/// Suffix appended to a unit path by the directory provider.
pub const DEFAULT_UNIT_SUFFIX: &str = ".unit";

/// Separator between segments of a code unit name.
pub const UNIT_NAME_SEPARATOR: char = '.';

/// Identifier of the loader handed out when no provider is active.
pub const AMBIENT_LOADER_ID: &str = "ambient";

/// URI scheme used for in-memory resource locations.
pub const MEMORY_SCHEME: &str = "memory";
