//! The package step: turns a staged directory into a release archive.

use crate::PackError;
use crate::Result;
use crate::archive::ArchiveBuilder;
use crate::archive::ArchiveReport;
use crate::config::PackConfig;
use crate::manifest;
use crate::manifest::ProjectMetadata;
use std::path::PathBuf;
use tracing::info;

/// Report of a packaging run.
#[derive(Debug, Clone)]
pub struct PackageReport {
    /// Location of the finished archive.
    pub archive_path: PathBuf,
    /// Name and version the archive was named after.
    pub metadata: ProjectMetadata,
    /// Whether an archive from a previous run was replaced.
    pub removed_previous: bool,
    /// Archive build details.
    pub archive: ArchiveReport,
}

/// Runs the package step against a [`PackConfig`].
///
/// # Examples
///
/// ```no_run
/// use distpack_core::PackConfig;
/// use distpack_core::Packager;
///
/// let config = PackConfig::new(".");
/// let report = Packager::new(&config).package()?;
/// println!("created {}", report.archive_path.display());
/// # Ok::<(), distpack_core::PackError>(())
/// ```
#[derive(Debug)]
pub struct Packager<'a> {
    config: &'a PackConfig,
}

impl<'a> Packager<'a> {
    /// Creates a packager for the given configuration.
    #[must_use]
    pub const fn new(config: &'a PackConfig) -> Self {
        Self { config }
    }

    /// Archives the staged directory as `<name>-<version>.zip` in the
    /// project root.
    ///
    /// Name and version come from the staged manifest, so the archive is
    /// named after what it actually contains.
    ///
    /// # Errors
    ///
    /// - [`PackError::StagedDirMissing`] if the stage step has not run
    /// - [`PackError::ManifestField`] if the staged manifest lacks a name
    ///   or version
    /// - any error of [`ArchiveBuilder::build`]
    pub fn package(&self) -> Result<PackageReport> {
        self.config.validate()?;

        let staged_dir = self.config.output_dir();
        if !staged_dir.is_dir() {
            return Err(PackError::StagedDirMissing { path: staged_dir });
        }

        let staged_manifest = manifest::load_manifest(&self.config.staged_manifest_path())?;
        let metadata = ProjectMetadata::from_manifest(&staged_manifest)?;
        let archive_path = self
            .config
            .root
            .join(metadata.archive_file_name(&self.config.archive_extension));
        let removed_previous = archive_path.exists();

        info!(
            name = %metadata.name,
            version = %metadata.version,
            "packaging release"
        );
        let archive = ArchiveBuilder::new(self.config).build(&staged_dir, &archive_path, &metadata)?;

        Ok(PackageReport {
            archive_path,
            metadata,
            removed_previous,
            archive,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::fs::File;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn staged_project(manifest: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dist = temp.path().join("dist");
        fs::create_dir_all(dist.join("views")).unwrap();
        fs::write(dist.join("index.js"), "x").unwrap();
        fs::write(dist.join("views/app.js"), "app").unwrap();
        fs::write(dist.join("package.json"), manifest).unwrap();
        temp
    }

    #[test]
    fn test_package_names_archive_after_staged_manifest() {
        let project = staged_project(r#"{"name":"poi-plugin-x","version":"1.4.0"}"#);
        fs::write(
            project.path().join("package.json"),
            r#"{"name":"ignored","version":"0.0.0"}"#,
        )
        .unwrap();
        let config = PackConfig::new(project.path());

        let report = Packager::new(&config).package().unwrap();

        assert_eq!(
            report.archive_path,
            project.path().join("poi-plugin-x-1.4.0.zip")
        );
        assert!(!report.removed_previous);
        assert_eq!(report.archive.files_added, 3);

        let archive = ZipArchive::new(File::open(&report.archive_path).unwrap()).unwrap();
        assert!(archive.file_names().any(|n| n == "dist/views/app.js"));
    }

    #[test]
    fn test_package_replaces_previous_archive() {
        let project = staged_project(r#"{"name":"p","version":"1.0.0"}"#);
        fs::write(project.path().join("p-1.0.0.zip"), "stale").unwrap();
        let config = PackConfig::new(project.path());

        let report = Packager::new(&config).package().unwrap();
        assert!(report.removed_previous);
        assert!(ZipArchive::new(File::open(&report.archive_path).unwrap()).is_ok());
    }

    #[test]
    fn test_package_keeps_archive_in_project_root() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("project");
        let dist = root.join("dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("index.js"), "x").unwrap();
        fs::write(
            dist.join("package.json"),
            r#"{"name":"p","version":"1/../../victim"}"#,
        )
        .unwrap();
        fs::write(outer.path().join("victim.zip"), "unrelated").unwrap();
        let config = PackConfig::new(&root);

        let report = Packager::new(&config).package().unwrap();

        assert_eq!(report.archive_path.parent(), Some(root.as_path()));
        assert_eq!(
            fs::read_to_string(outer.path().join("victim.zip")).unwrap(),
            "unrelated"
        );
    }

    #[test]
    fn test_package_requires_staged_dir() {
        let temp = TempDir::new().unwrap();
        let config = PackConfig::new(temp.path());

        let err = Packager::new(&config).package().unwrap_err();
        assert!(matches!(err, PackError::StagedDirMissing { .. }));
        assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_package_requires_manifest_version() {
        let project = staged_project(r#"{"name":"p"}"#);
        let config = PackConfig::new(project.path());

        let err = Packager::new(&config).package().unwrap_err();
        assert!(matches!(err, PackError::ManifestField { field: "version" }));
    }
}
