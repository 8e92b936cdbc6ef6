//! # Directory Provider
//!
//! Resolves names against a directory tree on disk.
//!
//! - Code unit `jobs.nightly.Report` maps to `<root>/jobs/nightly/Report<suffix>`
//! - Resource `templates/report.html` maps to `<root>/templates/report.html`
//!
//! Names that would escape the root (absolute paths, `..` segments) are
//! treated as unknown.

use crate::constants::{DEFAULT_UNIT_SUFFIX, UNIT_NAME_SEPARATOR};
use crate::error::{ResolveError, Result};
use crate::registry::{CodeUnit, LoaderHandle, Provider, ResourceHandle, ResourceStream};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    name: String,
    root: PathBuf,
    unit_suffix: String,
}

impl DirectoryProvider {
    /// Provider rooted at `root`, named after the path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: format!("dir:{}", root.display()),
            root,
            unit_suffix: DEFAULT_UNIT_SUFFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_unit_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.unit_suffix = suffix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn unit_suffix(&self) -> &str {
        &self.unit_suffix
    }

    /// File a code unit name maps to, if the name is well-formed.
    pub fn unit_path(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.split(UNIT_NAME_SEPARATOR).any(str::is_empty) {
            return None;
        }
        let relative = format!(
            "{}{}",
            name.replace(UNIT_NAME_SEPARATOR, "/"),
            self.unit_suffix
        );
        self.contained_path(&relative)
    }

    /// File a resource name maps to, if it stays inside the root.
    pub fn resource_path(&self, name: &str) -> Option<PathBuf> {
        self.contained_path(name.trim_start_matches("./"))
    }

    fn contained_path(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let mut components = relative.components().peekable();
        components.peek()?;
        if components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
            Some(self.root.join(relative))
        } else {
            None
        }
    }

    fn existing_file(&self, path: Option<PathBuf>) -> Option<PathBuf> {
        path.filter(|p| p.is_file())
    }
}

impl Provider for DirectoryProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn initialize(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(ResolveError::initialization(
                &self.name,
                format!("search path {} is not a directory", self.root.display()),
            ));
        }
        debug!(provider = %self.name, root = %self.root.display(), "Directory provider ready");
        Ok(())
    }

    fn resolve_unit(&self, name: &str) -> Result<CodeUnit> {
        let path = self.unit_path(name).ok_or_else(|| ResolveError::not_found(name))?;
        trace!(provider = %self.name, path = %path.display(), "Reading unit");

        match fs::read(&path) {
            Ok(bytes) => Ok(CodeUnit::new(name, &self.name, bytes)),
            // Only an existing regular file can fail as a provider fault; every
            // other miss (absent file, directory, non-directory parent) is unknown.
            Err(error) if path.is_file() => Err(ResolveError::provider_with_source(
                &self.name,
                format!("failed to read {}", path.display()),
                error,
            )),
            Err(error) => {
                trace!(error = %error, "No unit file at path");
                Err(ResolveError::not_found(name))
            }
        }
    }

    fn resolve_resource_handle(&self, name: &str) -> Option<ResourceHandle> {
        let path = self.existing_file(self.resource_path(name))?;
        Some(ResourceHandle::new(name, &self.name, path.display().to_string()))
    }

    fn resolve_resource_stream(&self, name: &str) -> Option<ResourceStream> {
        let path = self.existing_file(self.resource_path(name))?;
        match File::open(&path) {
            Ok(file) => Some(ResourceStream::new(name, &self.name, BufReader::new(file))),
            Err(error) => {
                debug!(
                    provider = %self.name,
                    path = %path.display(),
                    error = %error,
                    "Resource could not be opened"
                );
                None
            }
        }
    }

    fn current_loader(&self) -> LoaderHandle {
        LoaderHandle::new(self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CascadingResolver;
    use std::error::Error as _;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn populated_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("jobs/nightly")).unwrap();
        fs::write(dir.path().join("jobs/nightly/Report.unit"), b"report").unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("templates/report.html"), b"<html/>").unwrap();
        dir
    }

    #[test]
    fn test_unit_path_mapping() {
        let provider = DirectoryProvider::new("/opt/jobs");
        assert_eq!(
            provider.unit_path("a.b.C"),
            Some(PathBuf::from("/opt/jobs/a/b/C.unit"))
        );
        assert_eq!(provider.unit_path(""), None);
        assert_eq!(provider.unit_path("a..C"), None);
        assert_eq!(provider.unit_path(".C"), None);
    }

    #[test]
    fn test_resource_path_rejects_escapes() {
        let provider = DirectoryProvider::new("/opt/jobs");
        assert_eq!(
            provider.resource_path("conf/app.toml"),
            Some(PathBuf::from("/opt/jobs/conf/app.toml"))
        );
        assert_eq!(provider.resource_path("../etc/passwd"), None);
        assert_eq!(provider.resource_path("/etc/passwd"), None);
        assert_eq!(provider.resource_path(""), None);
    }

    #[test]
    fn test_initialize_requires_directory() {
        let dir = populated_root();
        assert!(DirectoryProvider::new(dir.path()).initialize().is_ok());

        let missing = DirectoryProvider::new(dir.path().join("missing"));
        assert!(matches!(
            missing.initialize(),
            Err(ResolveError::Initialization { .. })
        ));
    }

    #[test]
    fn test_resolve_unit_from_disk() {
        let dir = populated_root();
        let provider = DirectoryProvider::new(dir.path()).with_name("jobs");

        let unit = provider.resolve_unit("jobs.nightly.Report").unwrap();
        assert_eq!(unit.bytes(), b"report");
        assert_eq!(unit.provider(), "jobs");

        assert!(provider.resolve_unit("jobs.nightly.Missing").unwrap_err().is_not_found());
        // A package directory is not a unit.
        assert!(provider.resolve_unit("jobs.nightly").unwrap_err().is_not_found());
    }

    #[test]
    fn test_custom_unit_suffix() {
        let dir = populated_root();
        fs::write(dir.path().join("jobs/Tool.bin"), b"tool").unwrap();

        let provider = DirectoryProvider::new(dir.path()).with_unit_suffix(".bin");
        assert_eq!(provider.resolve_unit("jobs.Tool").unwrap().bytes(), b"tool");
        assert!(provider.resolve_unit("jobs.nightly.Report").is_err());
    }

    #[test]
    fn test_resources_from_disk() {
        let dir = populated_root();
        let provider = DirectoryProvider::new(dir.path());

        let handle = provider.resolve_resource_handle("templates/report.html").unwrap();
        assert!(handle.location.ends_with("report.html"));

        let stream = provider.resolve_resource_stream("templates/report.html").unwrap();
        assert_eq!(stream.read_all().unwrap(), b"<html/>");

        assert!(provider.resolve_resource_handle("templates").is_none());
        assert!(provider.resolve_resource_stream("templates/missing.html").is_none());
    }

    #[test]
    fn test_unit_under_regular_file_is_not_found() {
        let dir = populated_root();
        fs::write(dir.path().join("LICENSE"), b"MIT").unwrap();
        let provider = DirectoryProvider::new(dir.path());

        assert!(provider.resolve_unit("LICENSE.Job").unwrap_err().is_not_found());
        assert!(provider.resolve_unit("jobs\0x").unwrap_err().is_not_found());

        let resolver =
            CascadingResolver::new(vec![Arc::new(provider) as Arc<dyn Provider>]).unwrap();
        let error = resolver.resolve_unit("LICENSE.Job").unwrap_err();
        assert!(matches!(error, ResolveError::NotFound { ref name } if name == "LICENSE.Job"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_unit_is_provider_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = populated_root();
        let path = dir.path().join("jobs/Locked.unit");
        fs::write(&path, b"locked").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root.
        if fs::read(&path).is_ok() {
            return;
        }

        let provider = DirectoryProvider::new(dir.path()).with_name("jobs");
        let error = provider.resolve_unit("jobs.Locked").unwrap_err();
        assert!(matches!(error, ResolveError::Provider { ref provider, .. } if provider == "jobs"));
        let source = error.source().expect("io source");
        assert!(source.downcast_ref::<std::io::Error>().is_some());

        let resolver =
            CascadingResolver::new(vec![Arc::new(provider) as Arc<dyn Provider>]).unwrap();
        let error = resolver.resolve_unit("jobs.Locked").unwrap_err();
        assert!(error.is_resolution_failed());
        assert!(matches!(error.wrapped_cause(), Some(ResolveError::Provider { .. })));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
