//! Size and file-count accounting for staged directories.

use crate::Result;
use crate::copy::walk_error;
use std::path::Path;
use walkdir::WalkDir;

/// Aggregate size of a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// Sum of the sizes of all regular files in bytes.
    pub total_bytes: u64,
    /// Number of regular files. Directories and symbolic links are not
    /// counted.
    pub file_count: u64,
}

impl DirectoryStats {
    /// Walks `dir` and sums the size of every regular file.
    ///
    /// Symbolic links are not followed; staged trees never contain them.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`](crate::PackError::Io) if the directory or any
    /// entry cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use distpack_core::DirectoryStats;
    /// use std::path::Path;
    ///
    /// let stats = DirectoryStats::collect(Path::new("dist"))?;
    /// println!("{} files, {} bytes", stats.file_count, stats.total_bytes);
    /// # Ok::<(), distpack_core::PackError>(())
    /// ```
    pub fn collect(dir: &Path) -> Result<Self> {
        let mut stats = Self::default();

        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|e| walk_error(dir, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = entry
                .metadata()
                .map_err(|e| walk_error(entry.path(), e))?;
            stats.total_bytes = stats.total_bytes.saturating_add(metadata.len());
            stats.file_count += 1;
        }

        Ok(stats)
    }
}

/// Formats a byte count with binary units, e.g. `1.5 KB`.
///
/// # Examples
///
/// ```
/// use distpack_core::stats::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(3 * 1024 * 1024), "3 MB");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let (value, unit) = if bytes >= GB {
        (bytes as f64 / GB as f64, "GB")
    } else if bytes >= MB {
        (bytes as f64 / MB as f64, "MB")
    } else if bytes >= KB {
        (bytes as f64 / KB as f64, "KB")
    } else {
        return format!("{bytes} B");
    };

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {unit}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PackError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_counts_leaf_files_only() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("top.txt"), "12345").unwrap();
        fs::write(root.join("a/one.txt"), "1").unwrap();
        fs::write(root.join("a/b/c/two.txt"), "22").unwrap();

        let stats = DirectoryStats::collect(root).unwrap();
        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.total_bytes, 8);
    }

    #[test]
    fn test_collect_empty_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();

        let stats = DirectoryStats::collect(temp.path()).unwrap();
        assert_eq!(stats, DirectoryStats::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_ignores_symlinks() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("real.js"), "0123456789").unwrap();
        std::os::unix::fs::symlink("real.js", temp.path().join("alias.js")).unwrap();

        let stats = DirectoryStats::collect(temp.path()).unwrap();
        assert_eq!(stats.file_count, 1);
        assert_eq!(stats.total_bytes, 10);
    }

    #[test]
    fn test_collect_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let result = DirectoryStats::collect(&temp.path().join("nope"));
        assert!(matches!(result, Err(PackError::Io { .. })));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1100), "1.07 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2 GB");
    }
}
