//! Configuration for staging and packaging runs.

use crate::PackError;
use crate::Result;
use crate::filters::ExclusionRule;
use flate2::Compression;
use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Kind of filesystem item a [`CopySpec`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    /// A single regular file.
    File,
    /// A directory subtree.
    Directory,
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// One item of the staging list.
///
/// The path is relative to the project root and is mirrored 1:1 into the
/// staged directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Declared kind of the item.
    pub kind: SpecKind,
    /// Whether absence of the item aborts staging.
    pub required: bool,
}

impl CopySpec {
    /// A required single file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: SpecKind::File,
            required: true,
        }
    }

    /// A required directory subtree.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: SpecKind::Directory,
            required: true,
        }
    }

    /// Marks the item as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Configuration shared by the stage and package steps.
///
/// Every path the pipeline touches is derived from `root`, so a run can be
/// pointed at any directory (tests use temporary roots).
///
/// # Examples
///
/// ```
/// use distpack_core::PackConfig;
///
/// let config = PackConfig::new("/work/plugin");
/// assert_eq!(config.output_dir(), std::path::Path::new("/work/plugin/dist"));
/// assert_eq!(config.compression_level, 9);
/// ```
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Project root all relative paths resolve against.
    pub root: PathBuf,

    /// Staged output directory, relative to `root`.
    ///
    /// Default: `dist`.
    pub output_dir: PathBuf,

    /// Compiled entry point that must exist before staging.
    ///
    /// Default: `index.js`.
    pub entry_point: PathBuf,

    /// Project manifest, relative to `root`. The sanitized copy is written
    /// under the same name at the staged root.
    ///
    /// Default: `package.json`.
    pub manifest: PathBuf,

    /// Items to stage, processed in declared order.
    pub copy_specs: Vec<CopySpec>,

    /// Rules removing entries from staged directory subtrees.
    ///
    /// Default: suffix `.es`, substrings `.DS_Store` and `node_modules`.
    pub exclusions: Vec<ExclusionRule>,

    /// Name of the directory the staged tree is stored under inside the
    /// archive.
    ///
    /// Default: `dist`.
    pub archive_root: String,

    /// Name of the generated installation document.
    ///
    /// Default: `README.txt`.
    pub readme_name: String,

    /// Archive file extension.
    ///
    /// Default: `zip`.
    pub archive_extension: String,

    /// Deflate level (0-9).
    ///
    /// Default: 9 (best compression).
    pub compression_level: u32,
}

impl PackConfig {
    /// Creates a configuration rooted at `root` with the default item list.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_dir: PathBuf::from("dist"),
            entry_point: PathBuf::from("index.js"),
            manifest: PathBuf::from("package.json"),
            copy_specs: default_copy_specs(),
            exclusions: ExclusionRule::defaults(),
            archive_root: "dist".to_string(),
            readme_name: "README.txt".to_string(),
            archive_extension: "zip".to_string(),
            compression_level: Compression::best().level(),
        }
    }

    /// Sets the staging list.
    #[must_use]
    pub fn with_copy_specs(mut self, specs: Vec<CopySpec>) -> Self {
        self.copy_specs = specs;
        self
    }

    /// Sets the exclusion rules.
    #[must_use]
    pub fn with_exclusions(mut self, rules: Vec<ExclusionRule>) -> Self {
        self.exclusions = rules;
        self
    }

    /// Sets the staged output directory (relative to the root).
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the precondition artifact (relative to the root).
    #[must_use]
    pub fn with_entry_point(mut self, path: impl Into<PathBuf>) -> Self {
        self.entry_point = path.into();
        self
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Absolute path of the staged output directory.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    /// Absolute path of the precondition artifact.
    #[must_use]
    pub fn entry_point_path(&self) -> PathBuf {
        self.root.join(&self.entry_point)
    }

    /// Absolute path of the source manifest.
    #[must_use]
    pub fn source_manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }

    /// Absolute path of the sanitized manifest inside the staged directory.
    #[must_use]
    pub fn staged_manifest_path(&self) -> PathBuf {
        self.output_dir().join(file_name_or_self(&self.manifest))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the output directory is not a plain relative path below the root
    ///   (empty, absolute, `.` or `..` components)
    /// - the output directory overlaps a staged item, the entry point or
    ///   the manifest
    /// - the compression level is outside 0-9
    /// - the archive root or README name is empty
    pub fn validate(&self) -> Result<()> {
        let plain = self.output_dir.components().next().is_some()
            && self
                .output_dir
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(PackError::InvalidConfig {
                reason: format!(
                    "output directory must be a relative path below the project root: {}",
                    self.output_dir.display()
                ),
            });
        }

        let inputs = self
            .copy_specs
            .iter()
            .map(|spec| spec.path.as_path())
            .chain([self.entry_point.as_path(), self.manifest.as_path()]);
        for input in inputs {
            if input.starts_with(&self.output_dir) || self.output_dir.starts_with(input) {
                return Err(PackError::InvalidConfig {
                    reason: format!(
                        "output directory {} overlaps project input {}",
                        self.output_dir.display(),
                        input.display()
                    ),
                });
            }
        }

        if self.compression_level > Compression::best().level() {
            return Err(PackError::InvalidConfig {
                reason: format!("compression level must be 0-9, got {}", self.compression_level),
            });
        }
        if self.archive_root.is_empty() || self.readme_name.is_empty() {
            return Err(PackError::InvalidConfig {
                reason: "archive root and README name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// The items every plugin release ships.
pub fn default_copy_specs() -> Vec<CopySpec> {
    vec![
        CopySpec::file("index.js"),
        CopySpec::dir("views"),
        CopySpec::dir("utils"),
        CopySpec::dir("services"),
        CopySpec::dir("i18n"),
        CopySpec::dir("assets"),
        CopySpec::file("package.json"),
    ]
}

fn file_name_or_self(path: &Path) -> &Path {
    path.file_name().map_or(path, Path::new)
}
