//! Configuration Loader
//!
//! Environment-aware configuration loading. Layers, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `<dir>/cascade-resolver.toml`
//! 3. `<dir>/cascade-resolver.<environment>.toml`
//! 4. `CASCADE__*` environment variables (`CASCADE__SEARCH_PATHS=/a,/b`,
//!    `CASCADE__LOGGING__JSON=true`)

use super::ResolverConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_FILE, DEFAULT_ENVIRONMENT,
    ENVIRONMENT_VARIABLES,
};
use crate::error::{ResolveError, Result};
use crate::registry::{CascadingResolver, Provider};
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Detect the runtime environment from [`ENVIRONMENT_VARIABLES`].
pub fn detect_environment() -> String {
    environment_from(|name| env::var(name).ok())
}

/// First non-blank value among [`ENVIRONMENT_VARIABLES`], read via `lookup`.
fn environment_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    ENVIRONMENT_VARIABLES
        .iter()
        .find_map(|name| lookup(*name).filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
        .to_lowercase()
}

/// Loaded, validated configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ResolverConfig,
    environment: String,
    config_directory: Option<PathBuf>,
}

impl ConfigManager {
    /// Load with environment auto-detection from the default directory.
    ///
    /// The directory is `$CASCADE_CONFIG_DIR` if set, else `./config`.
    /// Missing files are skipped; defaults and environment overrides still apply.
    pub fn load() -> Result<Arc<ConfigManager>> {
        let directory = Self::default_config_directory();
        Self::load_from_directory(directory, &detect_environment())
    }

    /// Load base and environment-specific files from `directory`, then
    /// apply process environment overrides.
    pub fn load_from_directory(
        directory: impl AsRef<Path>,
        environment: &str,
    ) -> Result<Arc<ConfigManager>> {
        Self::load_with_overrides(directory, environment, None)
    }

    /// Like [`load_from_directory`], but reads environment overrides from
    /// `overrides` instead of the process environment.
    ///
    /// [`load_from_directory`]: ConfigManager::load_from_directory
    pub fn load_with_overrides(
        directory: impl AsRef<Path>,
        environment: &str,
        overrides: Option<HashMap<String, String>>,
    ) -> Result<Arc<ConfigManager>> {
        let directory = directory.as_ref();
        let base = directory.join(DEFAULT_CONFIG_FILE);
        let specific = directory.join(Self::environment_file_name(environment));

        debug!(
            environment = environment,
            directory = %directory.display(),
            "Loading resolver configuration"
        );

        let builder = Config::builder()
            .add_source(File::from(base).required(false))
            .add_source(File::from(specific).required(false))
            .add_source(Self::environment_source(overrides));

        let config = Self::finish(builder.build()?)?;

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: Some(directory.to_path_buf()),
        }))
    }

    /// Load a single file, which must exist. Environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Arc<ConfigManager>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ResolveError::Configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let built = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(Self::environment_source(None))
            .build()?;

        Ok(Arc::new(ConfigManager {
            config: Self::finish(built)?,
            environment: detect_environment(),
            config_directory: path.parent().map(Path::to_path_buf),
        }))
    }

    /// Wrap an already-built configuration.
    pub fn from_config(config: ResolverConfig) -> Result<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: detect_environment(),
            config_directory: None,
        }))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> Option<&Path> {
        self.config_directory.as_deref()
    }

    /// Assemble a resolver from this configuration; see [`ResolverConfig::assemble`].
    pub fn build_resolver(&self, fallbacks: Vec<Arc<dyn Provider>>) -> Result<CascadingResolver> {
        self.config.assemble(fallbacks)
    }

    fn finish(built: Config) -> Result<ResolverConfig> {
        let config: ResolverConfig = built.try_deserialize()?;
        config.validate()?;

        debug!(
            config = %serde_json::to_string(&config)
                .unwrap_or_else(|_| "[serialization error]".to_string()),
            "Resolver configuration loaded"
        );
        Ok(config)
    }

    fn environment_source(overrides: Option<HashMap<String, String>>) -> Environment {
        let source = Environment::with_prefix(CONFIG_ENV_PREFIX)
            .separator(CONFIG_ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("search_paths");

        match overrides {
            Some(vars) => source.source(Some(vars.into_iter().collect())),
            None => source,
        }
    }

    fn environment_file_name(environment: &str) -> String {
        let stem = DEFAULT_CONFIG_FILE
            .strip_suffix(".toml")
            .unwrap_or(DEFAULT_CONFIG_FILE);
        format!("{stem}.{environment}.toml")
    }

    fn default_config_directory() -> PathBuf {
        env::var("CASCADE_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn test_blank_environment_variable_is_skipped() {
        let vars: HashMap<&str, &str> = [("CASCADE_ENV", " "), ("APP_ENV", "Production")].into();
        let detected = environment_from(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(detected, "production");

        let vars: HashMap<&str, &str> =
            [("CASCADE_ENV", "staging"), ("APP_ENV", "production")].into();
        assert_eq!(environment_from(|name| vars.get(name).map(|v| v.to_string())), "staging");

        assert_eq!(environment_from(|_| Some(String::new())), DEFAULT_ENVIRONMENT);
    }

    #[test]
    fn test_environment_file_name() {
        assert_eq!(
            ConfigManager::environment_file_name("test"),
            "cascade-resolver.test.toml"
        );
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::load_with_overrides(dir.path(), "test", no_env()).unwrap();

        assert_eq!(manager.config(), &ResolverConfig::default());
        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config_directory(), Some(dir.path()));
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cascade-resolver.toml"),
            "unit_suffix = \".base\"\ndefault_loader = \"host\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("cascade-resolver.production.toml"),
            "unit_suffix = \".prod\"\n[logging]\njson = true\n",
        )
        .unwrap();

        let manager =
            ConfigManager::load_with_overrides(dir.path(), "production", no_env()).unwrap();
        let config = manager.config();
        assert_eq!(config.unit_suffix, ".prod");
        assert_eq!(config.default_loader, "host");
        assert!(config.logging.json);
    }

    #[test]
    fn test_environment_variables_override_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cascade-resolver.toml"),
            "unit_suffix = \".base\"\n",
        )
        .unwrap();

        let overrides = HashMap::from([
            ("CASCADE__UNIT_SUFFIX".to_string(), ".env".to_string()),
            ("CASCADE__SEARCH_PATHS".to_string(), "/srv/a,/srv/b".to_string()),
        ]);

        let manager =
            ConfigManager::load_with_overrides(dir.path(), "test", Some(overrides)).unwrap();
        let config = manager.config();
        assert_eq!(config.unit_suffix, ".env");
        assert_eq!(
            config.search_paths,
            vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]
        );
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cascade-resolver.toml"), "unit_suffix = \"\"\n").unwrap();

        let error = ConfigManager::load_with_overrides(dir.path(), "test", no_env()).unwrap_err();
        assert!(matches!(error, ResolveError::Configuration(_)));
    }

    #[test]
    fn test_load_from_file_requires_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(ConfigManager::load_from_file(&missing).is_err());

        let present = dir.path().join("custom.toml");
        fs::write(&present, "search_paths = [\"/opt/jobs\"]\n").unwrap();
        let manager = ConfigManager::load_from_file(&present).unwrap();
        assert_eq!(manager.config().search_paths, vec![PathBuf::from("/opt/jobs")]);
        assert_eq!(manager.config_directory(), Some(dir.path()));
    }

    #[test]
    fn test_from_config_validates() {
        let invalid = ResolverConfig {
            default_loader: String::new(),
            ..ResolverConfig::default()
        };
        assert!(ConfigManager::from_config(invalid).is_err());
        assert!(ConfigManager::from_config(ResolverConfig::default()).is_ok());
    }
}
