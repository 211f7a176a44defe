//! Selective copying of files and directory subtrees.
//!
//! Directory sources are traversed with `walkdir` in file-name order; every
//! descendant is checked against the exclusion rules and excluded entries are
//! pruned together with their subtrees. Single-file sources are copied
//! verbatim.
//!
//! Symbolic links are dereferenced: the staged tree holds the content behind
//! a link, filtered like any other entry, and never the link itself.

use crate::PackError;
use crate::Result;
use crate::filters::ExclusionRule;
use crate::filters::is_excluded;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Buffer size for file copies (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable buffer for file copying.
///
/// One buffer serves every file a [`SelectiveCopier`] copies, so a staging
/// run does not allocate per file.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies data from reader to writer using the provided buffer.
///
/// Returns the number of bytes copied. `Interrupted` reads are retried.
///
/// # Errors
///
/// Returns an error if reading or writing fails, or if the byte count would
/// overflow `u64`.
///
/// # Examples
///
/// ```
/// use distpack_core::copy::CopyBuffer;
/// use distpack_core::copy::copy_with_buffer;
///
/// let mut buffer = CopyBuffer::new();
/// let mut input: &[u8] = b"module.exports = {}";
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(&mut input, &mut output, &mut buffer)?;
/// assert_eq!(copied, 19);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn copy_with_buffer<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;

        total = total
            .checked_add(bytes_read as u64)
            .ok_or_else(|| io::Error::other("copied byte count overflowed"))?;
    }

    Ok(total)
}

/// Counts of what a single [`SelectiveCopier::copy`] call produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Regular files written.
    pub files_copied: u64,
    /// Directories created below the destination root.
    pub directories_created: u64,
    /// Bytes of file content written.
    pub bytes_copied: u64,
    /// Entries pruned by exclusion rules (a pruned directory counts once).
    pub entries_excluded: u64,
}

/// Copies files and filtered directory subtrees.
///
/// # Examples
///
/// ```no_run
/// use distpack_core::ExclusionRule;
/// use distpack_core::copy::SelectiveCopier;
/// use std::path::Path;
///
/// let rules = ExclusionRule::defaults();
/// let mut copier = SelectiveCopier::new(&rules);
/// let outcome = copier.copy(Path::new("views"), Path::new("dist/views"))?;
/// println!("copied {} files", outcome.files_copied);
/// # Ok::<(), distpack_core::PackError>(())
/// ```
#[derive(Debug)]
pub struct SelectiveCopier<'a> {
    rules: &'a [ExclusionRule],
    buffer: CopyBuffer,
}

impl<'a> SelectiveCopier<'a> {
    /// Creates a copier that prunes entries matching `rules`.
    #[must_use]
    pub fn new(rules: &'a [ExclusionRule]) -> Self {
        Self {
            rules,
            buffer: CopyBuffer::new(),
        }
    }

    /// Copies `source` to `dest`.
    ///
    /// Directories are copied recursively with exclusion filtering; files
    /// are copied as-is. Parent directories of `dest` are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`] if the source is missing or unreadable, or
    /// if the destination cannot be written.
    pub fn copy(&mut self, source: &Path, dest: &Path) -> Result<CopyOutcome> {
        let metadata = fs::metadata(source).map_err(|e| PackError::io(source, e))?;

        if metadata.is_dir() {
            self.copy_dir(source, dest)
        } else {
            create_parent(dest)?;
            let bytes = self.copy_file(source, dest)?;
            Ok(CopyOutcome {
                files_copied: 1,
                bytes_copied: bytes,
                ..CopyOutcome::default()
            })
        }
    }

    fn copy_dir(&mut self, source: &Path, dest: &Path) -> Result<CopyOutcome> {
        let rules = self.rules;
        let mut outcome = CopyOutcome::default();
        let mut excluded = 0u64;

        fs::create_dir_all(dest).map_err(|e| PackError::io(dest, e))?;

        let walker = WalkDir::new(source)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
                let skip = is_excluded(relative, rules);
                if skip {
                    debug!(path = %entry.path().display(), "excluded");
                    excluded += 1;
                }
                !skip
            });

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(source, e))?;
            if entry.depth() == 0 {
                continue;
            }

            let relative = relative_to(source, entry.path())?;
            let target = dest.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target).map_err(|e| PackError::io(&target, e))?;
                outcome.directories_created += 1;
            } else {
                let bytes = self.copy_file(entry.path(), &target)?;
                outcome.files_copied += 1;
                outcome.bytes_copied += bytes;
            }
        }

        outcome.entries_excluded = excluded;
        Ok(outcome)
    }

    /// Copies one file's bytes and permissions. The parent of `dest` must
    /// exist.
    fn copy_file(&mut self, source: &Path, dest: &Path) -> Result<u64> {
        let mut input = File::open(source).map_err(|e| PackError::io(source, e))?;
        let permissions = input
            .metadata()
            .map_err(|e| PackError::io(source, e))?
            .permissions();

        let mut output = File::create(dest).map_err(|e| PackError::io(dest, e))?;
        let bytes = copy_with_buffer(&mut input, &mut output, &mut self.buffer)
            .map_err(|e| PackError::io(dest, e))?;
        output.flush().map_err(|e| PackError::io(dest, e))?;
        fs::set_permissions(dest, permissions).map_err(|e| PackError::io(dest, e))?;

        debug!(from = %source.display(), to = %dest.display(), bytes, "copied file");
        Ok(bytes)
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PackError::io(parent, e))?;
    }
    Ok(())
}

fn relative_to<'p>(root: &Path, path: &'p Path) -> Result<&'p Path> {
    path.strip_prefix(root).map_err(|_| {
        PackError::io(
            path,
            io::Error::other(format!("entry is outside {}", root.display())),
        )
    })
}

/// Converts a traversal error, keeping the path it occurred at.
pub(crate) fn walk_error(root: &Path, err: walkdir::Error) -> PackError {
    let path = err.path().unwrap_or(root).to_path_buf();
    PackError::Io {
        path,
        source: err.into(),
    }
}
