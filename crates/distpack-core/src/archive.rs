//! ZIP archive construction from a staged directory.
//!
//! The staged tree is stored under a fixed root directory inside the
//! archive, next to a generated `README.txt`. Entries are written in sorted
//! order with a fixed timestamp, so an unchanged staged tree always yields
//! the same archive bytes.
//!
//! Entries that disappear between traversal and writing are reported as
//! [`ArchiveWarning`]s and skipped, as are symbolic links. Every other
//! failure aborts the build and leaves no archive behind.

use crate::PackError;
use crate::Result;
use crate::config::PackConfig;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::manifest::ProjectMetadata;
use crate::readme::render_install_readme;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::debug;
use tracing::info;
use tracing::warn;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A recoverable problem met while building an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveWarning {
    /// Entry the warning concerns.
    pub path: PathBuf,
    /// Description of the problem.
    pub message: String,
}

impl fmt::Display for ArchiveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Report of an archive build.
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Files from the staged tree stored in the archive.
    pub files_added: usize,
    /// Directory entries stored in the archive, including the root.
    pub directories_added: usize,
    /// Uncompressed bytes of staged file content.
    pub bytes_written: u64,
    /// Size of the finished archive file.
    pub total_bytes: u64,
    /// Entries skipped because they vanished during the build or are
    /// symbolic links.
    pub warnings: Vec<ArchiveWarning>,
    /// Duration of the build.
    pub duration: Duration,
}

impl ArchiveReport {
    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Space saved by compression, in percent of the staged content.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::ArchiveReport;
    ///
    /// let mut report = ArchiveReport::default();
    /// report.bytes_written = 1000;
    /// report.total_bytes = 250;
    /// assert_eq!(report.compression_percentage(), 75.0);
    ///
    /// report.total_bytes = 2000;
    /// assert_eq!(report.compression_percentage(), 0.0);
    /// ```
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        let saved = self.bytes_written.saturating_sub(self.total_bytes);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }
}

/// Kind of a staged entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// A staged entry scheduled for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    /// Filesystem path.
    pub path: PathBuf,
    /// Path relative to the staged root (empty for the root itself).
    pub relative: PathBuf,
    /// Entry kind.
    pub kind: EntryKind,
}

/// Result of traversing a staged directory.
#[derive(Debug, Clone, Default)]
pub struct CollectedEntries {
    /// Entries in traversal (file-name sorted) order.
    pub entries: Vec<StagedEntry>,
    /// Entries skipped during traversal.
    pub warnings: Vec<ArchiveWarning>,
}

/// Builds release archives.
///
/// # Examples
///
/// ```no_run
/// use distpack_core::ArchiveBuilder;
/// use distpack_core::PackConfig;
/// use distpack_core::ProjectMetadata;
/// use std::path::Path;
///
/// let config = PackConfig::new(".");
/// let meta = ProjectMetadata::new("poi-plugin-x", "1.0.0");
/// let report = ArchiveBuilder::new(&config).build(
///     Path::new("dist"),
///     Path::new("poi-plugin-x-1.0.0.zip"),
///     &meta,
/// )?;
/// println!("archive is {} bytes", report.total_bytes);
/// # Ok::<(), distpack_core::PackError>(())
/// ```
#[derive(Debug)]
pub struct ArchiveBuilder<'a> {
    config: &'a PackConfig,
}

impl<'a> ArchiveBuilder<'a> {
    /// Creates a builder using the archive settings of `config`.
    #[must_use]
    pub const fn new(config: &'a PackConfig) -> Self {
        Self { config }
    }

    /// Traverses `staged_dir` and builds the archive at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`] if the output cannot be replaced or created
    /// and [`PackError::Archive`] for any other failure except vanished
    /// entries.
    pub fn build(
        &self,
        staged_dir: &Path,
        output: &Path,
        meta: &ProjectMetadata,
    ) -> Result<ArchiveReport> {
        let collected = Self::collect_entries(staged_dir)?;
        self.build_from_entries(output, collected, meta)
    }

    /// Lists the entries of `staged_dir` in file-name order.
    ///
    /// Symbolic links are not followed; they are skipped with a warning.
    /// Entries that cannot be found are turned into warnings as well.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Archive`] for traversal failures other than
    /// missing entries.
    pub fn collect_entries(staged_dir: &Path) -> Result<CollectedEntries> {
        let mut collected = CollectedEntries::default();

        for entry in WalkDir::new(staged_dir).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_not_found(e.io_error()) => {
                    let path = e.path().unwrap_or(staged_dir).to_path_buf();
                    collected.warnings.push(vanished(path, &e));
                    continue;
                }
                Err(e) => return Err(PackError::archive("failed to traverse staged directory", e)),
            };

            if entry.path_is_symlink() {
                collected.warnings.push(ArchiveWarning {
                    path: entry.into_path(),
                    message: "skipped symlink".to_string(),
                });
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(staged_dir)
                .map_err(|e| PackError::archive("entry is outside the staged directory", e))?
                .to_path_buf();
            let kind = if entry.file_type().is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            collected.entries.push(StagedEntry {
                path: entry.into_path(),
                relative,
                kind,
            });
        }

        Ok(collected)
    }

    /// Writes the archive from a previously collected entry list.
    ///
    /// An existing file at `output` is removed first. The archive is written
    /// to a temporary file next to `output` and moved into place only once
    /// it is finalized and flushed to disk, so a failed build leaves nothing
    /// at `output`.
    ///
    /// # Errors
    ///
    /// See [`ArchiveBuilder::build`].
    pub fn build_from_entries(
        &self,
        output: &Path,
        collected: CollectedEntries,
        meta: &ProjectMetadata,
    ) -> Result<ArchiveReport> {
        let start = Instant::now();
        let mut report = ArchiveReport {
            warnings: collected.warnings,
            ..ArchiveReport::default()
        };

        if remove_existing(output)? {
            info!(path = %output.display(), "removed previous archive");
        }
        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(parent).map_err(|e| PackError::io(parent, e))?;
        info!(path = %output.display(), entries = collected.entries.len(), "creating archive");

        let mut zip = ZipWriter::new(temp);
        let options = self.file_options();
        let mut buffer = CopyBuffer::new();

        for entry in &collected.entries {
            let name = self.entry_name(&entry.relative)?;
            let added = match entry.kind {
                EntryKind::Directory => add_directory(&mut zip, entry, &name, options),
                EntryKind::File => add_file(&mut zip, entry, &name, options, &mut buffer),
            };

            match added {
                Ok(EntryOutcome::Directory) => report.directories_added += 1,
                Ok(EntryOutcome::File(bytes)) => {
                    report.files_added += 1;
                    report.bytes_written += bytes;
                }
                Ok(EntryOutcome::Vanished(warning)) => report.warnings.push(warning),
                Err(e) => {
                    warn!(path = %output.display(), error = %e, "archive build failed");
                    return Err(e);
                }
            }
        }

        let readme = render_install_readme(meta, &self.config.archive_root);
        zip.start_file(self.config.readme_name.as_str(), options.unix_permissions(0o644))
            .map_err(|e| PackError::archive("failed to add installation README", e))?;
        zip.write_all(readme.as_bytes())
            .map_err(|e| PackError::archive("failed to add installation README", e))?;

        let mut temp = zip
            .finish()
            .map_err(|e| PackError::archive("failed to finish ZIP archive", e))?;
        temp.flush().map_err(|e| PackError::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| PackError::io(temp.path(), e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(|e| PackError::io(temp.path(), e))?;
        }
        temp.persist(output)
            .map_err(|e| PackError::io(output, e.error))?;

        report.total_bytes = fs::metadata(output)
            .map_err(|e| PackError::io(output, e))?
            .len();
        report.duration = start.elapsed();

        for warning in &report.warnings {
            warn!(%warning, "archive entry skipped");
        }
        info!(
            path = %output.display(),
            bytes = report.total_bytes,
            files = report.files_added,
            "archive complete"
        );

        Ok(report)
    }

    fn file_options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        if self.config.compression_level == 0 {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(self.config.compression_level)))
        }
    }

    /// Archive name of a staged entry: `<root>/<relative>` with `/`
    /// separators.
    fn entry_name(&self, relative: &Path) -> Result<String> {
        let mut name = self.config.archive_root.trim_end_matches('/').to_string();
        for component in relative.components() {
            let part = component.as_os_str().to_str().ok_or_else(|| {
                PackError::archive("path is not valid UTF-8", relative.display().to_string())
            })?;
            name.push('/');
            name.push_str(part);
        }
        Ok(name)
    }
}

enum EntryOutcome {
    Directory,
    File(u64),
    Vanished(ArchiveWarning),
}

fn add_directory<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &StagedEntry,
    name: &str,
    options: SimpleFileOptions,
) -> Result<EntryOutcome> {
    match fs::metadata(&entry.path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(EntryOutcome::Vanished(vanished(entry.path.clone(), &e)));
        }
        Err(e) => return Err(PackError::archive(format!("failed to read {name}"), e)),
    }

    zip.add_directory(format!("{name}/"), options)
        .map_err(|e| PackError::archive(format!("failed to add directory {name}"), e))?;
    debug!(entry = name, "added directory");
    Ok(EntryOutcome::Directory)
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &StagedEntry,
    name: &str,
    options: SimpleFileOptions,
    buffer: &mut CopyBuffer,
) -> Result<EntryOutcome> {
    let mut file = match File::open(&entry.path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(EntryOutcome::Vanished(vanished(entry.path.clone(), &e)));
        }
        Err(e) => return Err(PackError::archive(format!("failed to open {name}"), e)),
    };
    let metadata = file
        .metadata()
        .map_err(|e| PackError::archive(format!("failed to read {name}"), e))?;

    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    };
    #[cfg(not(unix))]
    let _ = &metadata;

    zip.start_file(name, options)
        .map_err(|e| PackError::archive(format!("failed to start {name}"), e))?;
    let bytes = copy_with_buffer(&mut file, zip, buffer)
        .map_err(|e| PackError::archive(format!("failed to write {name}"), e))?;

    debug!(entry = name, bytes, "added file");
    Ok(EntryOutcome::File(bytes))
}

/// Removes a previous archive. Returns `true` if one existed.
fn remove_existing(output: &Path) -> Result<bool> {
    match fs::remove_file(output) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PackError::io(output, e)),
    }
}

fn is_not_found(err: Option<&io::Error>) -> bool {
    err.is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

fn vanished(path: PathBuf, err: &dyn fmt::Display) -> ArchiveWarning {
    ArchiveWarning {
        path,
        message: format!("entry not found, skipped ({err})"),
    }
}
