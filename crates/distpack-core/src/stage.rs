//! The stage step: builds a clean, filtered copy of the release tree.

use crate::PackError;
use crate::Result;
use crate::config::CopySpec;
use crate::config::PackConfig;
use crate::config::SpecKind;
use crate::copy::CopyOutcome;
use crate::copy::SelectiveCopier;
use crate::manifest;
use crate::stats::DirectoryStats;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;
use tracing::info;
use tracing::warn;

/// One staged item and what copying it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedItem {
    /// Path relative to the project root (and to the staged root).
    pub path: PathBuf,
    /// Kind found on disk.
    pub kind: SpecKind,
    /// Copy counts.
    pub outcome: CopyOutcome,
}

/// Report of a staging run.
#[derive(Debug, Clone)]
pub struct StageReport {
    /// Staged output directory.
    pub output_dir: PathBuf,
    /// Items copied, in declared order.
    pub staged: Vec<StagedItem>,
    /// Optional items that were absent.
    pub skipped: Vec<PathBuf>,
    /// Location of the sanitized manifest.
    pub manifest_path: PathBuf,
    /// Size of the finished staged directory.
    pub stats: DirectoryStats,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl StageReport {
    /// Total entries pruned by exclusion rules across all items.
    #[must_use]
    pub fn entries_excluded(&self) -> u64 {
        self.staged
            .iter()
            .map(|item| item.outcome.entries_excluded)
            .sum()
    }
}

/// Runs the stage step against a [`PackConfig`].
///
/// # Examples
///
/// ```no_run
/// use distpack_core::PackConfig;
/// use distpack_core::Stager;
///
/// let config = PackConfig::new(".");
/// let report = Stager::new(&config).stage()?;
/// println!("{} files staged", report.stats.file_count);
/// # Ok::<(), distpack_core::PackError>(())
/// ```
#[derive(Debug)]
pub struct Stager<'a> {
    config: &'a PackConfig,
}

impl<'a> Stager<'a> {
    /// Creates a stager for the given configuration.
    #[must_use]
    pub const fn new(config: &'a PackConfig) -> Self {
        Self { config }
    }

    /// Rebuilds the staged directory from scratch.
    ///
    /// Steps, in order: wipe and recreate the output directory, check the
    /// compiled entry point, copy every present item, write the sanitized
    /// manifest, measure the result.
    ///
    /// # Errors
    ///
    /// - [`PackError::Precondition`] if the entry point has not been built
    /// - [`PackError::MissingRequiredInput`] if a required item is absent
    /// - [`PackError::Io`] / [`PackError::Json`] on filesystem or manifest
    ///   failures
    pub fn stage(&self) -> Result<StageReport> {
        let start = Instant::now();
        self.config.validate()?;

        let output_dir = self.config.output_dir();
        info!(dir = %output_dir.display(), "cleaning output directory");
        clean_dir(&output_dir)?;

        let entry_point = self.config.entry_point_path();
        if !entry_point.exists() {
            return Err(PackError::Precondition {
                artifact: self.config.entry_point.clone(),
                remediation: "run the transpile step first to compile the .es sources".to_string(),
            });
        }

        let mut copier = SelectiveCopier::new(&self.config.exclusions);
        let mut staged = Vec::with_capacity(self.config.copy_specs.len());
        let mut skipped = Vec::new();

        for spec in &self.config.copy_specs {
            match self.stage_item(&mut copier, spec, &output_dir)? {
                Some(item) => staged.push(item),
                None => {
                    warn!(path = %spec.path.display(), "skipped optional item (not found)");
                    skipped.push(spec.path.clone());
                }
            }
        }

        let manifest_path = self.config.staged_manifest_path();
        let source = manifest::load_manifest(&self.config.source_manifest_path())?;
        manifest::write_manifest(&manifest_path, &manifest::sanitize(&source))?;
        info!(path = %manifest_path.display(), "wrote distribution manifest");

        let stats = DirectoryStats::collect(&output_dir)?;
        info!(
            files = stats.file_count,
            bytes = stats.total_bytes,
            "stage complete"
        );

        Ok(StageReport {
            output_dir,
            staged,
            skipped,
            manifest_path,
            stats,
            duration: start.elapsed(),
        })
    }

    /// Copies one item. Returns `Ok(None)` for an absent optional item.
    fn stage_item(
        &self,
        copier: &mut SelectiveCopier<'_>,
        spec: &CopySpec,
        output_dir: &Path,
    ) -> Result<Option<StagedItem>> {
        let source = self.config.root.join(&spec.path);
        let metadata = match fs::metadata(&source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if spec.required {
                    return Err(PackError::MissingRequiredInput {
                        path: spec.path.clone(),
                        kind: spec.kind,
                    });
                }
                return Ok(None);
            }
            Err(e) => return Err(PackError::io(&source, e)),
        };

        let kind = if metadata.is_dir() {
            SpecKind::Directory
        } else {
            SpecKind::File
        };
        if kind != spec.kind {
            warn!(
                path = %spec.path.display(),
                declared = %spec.kind,
                found = %kind,
                "item kind differs from declaration"
            );
        }

        let outcome = copier.copy(&source, &output_dir.join(&spec.path))?;
        match kind {
            SpecKind::Directory => info!(
                path = %spec.path.display(),
                files = outcome.files_copied,
                excluded = outcome.entries_excluded,
                "copied directory"
            ),
            SpecKind::File => info!(path = %spec.path.display(), "copied file"),
        }

        Ok(Some(StagedItem {
            path: spec.path.clone(),
            kind,
            outcome,
        }))
    }
}

/// Removes `dir` with everything in it, then recreates it empty.
fn clean_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(PackError::io(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| PackError::io(dir, e))
}
