//! Project manifest loading and sanitization.
//!
//! The distributed manifest keeps only the fields a host application needs
//! to load the plugin; scripts, dev dependencies and tooling config are
//! dropped.

use crate::PackError;
use crate::Result;
use serde_json::Map;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Fields copied into the distributed manifest, in output order.
pub const MANIFEST_WHITELIST: [&str; 9] = [
    "name",
    "version",
    "description",
    "main",
    "author",
    "license",
    "repository",
    "peerDependencies",
    "poiPlugin",
];

/// A manifest as a JSON object with insertion order preserved.
pub type Manifest = Map<String, Value>;

/// Reads a manifest file and checks that it is a JSON object.
///
/// # Errors
///
/// Returns [`PackError::Io`] if the file cannot be read,
/// [`PackError::Json`] if it is not valid JSON, or
/// [`PackError::InvalidManifest`] if the top-level value is not an object.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let raw = fs::read_to_string(path).map_err(|e| PackError::io(path, e))?;
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => Ok(map),
        other => Err(PackError::InvalidManifest {
            path: path.to_path_buf(),
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

/// Projects a manifest onto [`MANIFEST_WHITELIST`].
///
/// Absent fields stay absent; present fields keep their values unchanged,
/// including `null`.
///
/// # Examples
///
/// ```
/// use distpack_core::manifest::sanitize;
/// use serde_json::json;
///
/// let source = json!({
///     "name": "p",
///     "version": "1.0.0",
///     "devDependency": "x",
///     "peerDependencies": { "host": "^1" }
/// });
/// let sanitized = sanitize(source.as_object().unwrap());
///
/// let keys: Vec<_> = sanitized.keys().map(String::as_str).collect();
/// assert_eq!(keys, ["name", "version", "peerDependencies"]);
/// ```
pub fn sanitize(manifest: &Manifest) -> Manifest {
    MANIFEST_WHITELIST
        .iter()
        .filter_map(|&field| {
            manifest
                .get(field)
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect()
}

/// Writes a manifest as two-space indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`PackError::Io`] if the file cannot be written.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    fs::write(path, json).map_err(|e| PackError::io(path, e))
}

/// Name and version identifying a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Package name as declared in the manifest.
    pub name: String,
    /// Package version as declared in the manifest.
    pub version: String,
}

impl ProjectMetadata {
    /// Creates metadata from explicit values.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Extracts `name` and `version` from a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::ManifestField`] if either field is missing,
    /// empty, or not a string.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        Ok(Self {
            name: string_field(manifest, "name")?,
            version: string_field(manifest, "version")?,
        })
    }

    /// Archive file name: `<name>-<version>.<extension>`.
    ///
    /// Scoped package names (`@scope/pkg`) are flattened to `scope-pkg`.
    /// Path separators in the version are replaced the same way, so the
    /// result is always a single file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::ProjectMetadata;
    ///
    /// let meta = ProjectMetadata::new("poi-plugin-leveling-plan", "1.2.0");
    /// assert_eq!(meta.archive_file_name("zip"), "poi-plugin-leveling-plan-1.2.0.zip");
    ///
    /// let scoped = ProjectMetadata::new("@poi/plugin", "0.1.0");
    /// assert_eq!(scoped.archive_file_name("zip"), "poi-plugin-0.1.0.zip");
    /// ```
    #[must_use]
    pub fn archive_file_name(&self, extension: &str) -> String {
        let name = file_name_part(self.name.trim_start_matches('@'));
        let version = file_name_part(&self.version);
        format!("{name}-{version}.{extension}")
    }
}

fn file_name_part(value: &str) -> String {
    value.replace(['/', '\\'], "-")
}

fn string_field(manifest: &Manifest, field: &'static str) -> Result<String> {
    manifest
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(PackError::ManifestField { field })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
