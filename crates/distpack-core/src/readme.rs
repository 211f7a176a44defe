//! Installation instructions shipped at the top of every archive.

use crate::manifest::ProjectMetadata;

/// Renders the installation document for a release.
///
/// `archive_root` is the directory the staged tree is stored under inside
/// the archive; the copy commands refer to it.
///
/// # Examples
///
/// ```
/// use distpack_core::ProjectMetadata;
/// use distpack_core::readme::render_install_readme;
///
/// let text = render_install_readme(&ProjectMetadata::new("poi-plugin-x", "1.0.0"), "dist");
/// assert!(text.starts_with("# poi-plugin-x v1.0.0"));
/// assert!(text.contains("cp -r dist/* /path/to/poi/node_modules/poi-plugin-x/"));
/// ```
#[must_use]
pub fn render_install_readme(meta: &ProjectMetadata, archive_root: &str) -> String {
    let name = &meta.name;
    let version = &meta.version;
    let tarball = meta.archive_file_name("tgz");

    format!(
        r"# {name} v{version}

## Installation

### Manual Installation

1. Extract this ZIP file
2. Copy the contents of the `{archive_root}/` directory to your poi plugins directory:

```bash
# macOS / Linux
cp -r {archive_root}/* /path/to/poi/node_modules/{name}/

# Windows
xcopy {archive_root}\* \path\to\poi\node_modules\{name}\ /E /I
```

3. Restart poi

### Finding poi plugins directory

The plugins directory is typically located at:
- **Windows**: `C:\Users\[YourName]\AppData\Local\Programs\poi\resources\app.asar.unpacked\node_modules`
- **macOS**: `/Applications/poi.app/Contents/Resources/app.asar.unpacked/node_modules`
- **Linux**: `/opt/poi/resources/app.asar.unpacked/node_modules`

If you installed poi from source or npm, the path might be different.

## Alternative: npm Installation

If you have the .tgz file instead, you can install via npm:

```bash
cd /path/to/poi
npm install /path/to/{tarball}
```

---

For more information, visit: https://github.com/poooi/poi
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readme_embeds_name_and_version() {
        let text = render_install_readme(&ProjectMetadata::new("poi-plugin-plan", "0.3.1"), "dist");
        assert!(text.starts_with("# poi-plugin-plan v0.3.1\n"));
        assert!(text.contains("npm install /path/to/poi-plugin-plan-0.3.1.tgz"));
    }

    #[test]
    fn test_readme_has_posix_and_windows_commands() {
        let text = render_install_readme(&ProjectMetadata::new("p", "1.0.0"), "dist");
        assert!(text.contains("cp -r dist/* /path/to/poi/node_modules/p/"));
        assert!(text.contains(r"xcopy dist\* \path\to\poi\node_modules\p\ /E /I"));
    }

    #[test]
    fn test_readme_uses_archive_root() {
        let text = render_install_readme(&ProjectMetadata::new("p", "1.0.0"), "release");
        assert!(text.contains("`release/` directory"));
        assert!(text.contains("cp -r release/*"));
    }
}
