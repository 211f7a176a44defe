//! Error types for staging and packaging operations.

use crate::config::SpecKind;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while staging or packaging a release.
#[derive(Error, Debug)]
pub enum PackError {
    /// A required upstream artifact has not been produced yet.
    #[error("required artifact not found: {artifact}")]
    Precondition {
        /// The missing artifact.
        artifact: PathBuf,
        /// Step that produces the artifact.
        remediation: String,
    },

    /// A required copy entry is absent from the source tree.
    #[error("required {kind} not found: {path}")]
    MissingRequiredInput {
        /// Path of the entry, relative to the project root.
        path: PathBuf,
        /// Declared kind of the entry.
        kind: SpecKind,
    },

    /// Filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The project manifest is not a JSON object.
    #[error("invalid manifest {path}: {reason}")]
    InvalidManifest {
        /// Manifest location.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The manifest lacks a field needed to name the archive.
    #[error("manifest field `{field}` is missing or not a string")]
    ManifestField {
        /// Name of the field.
        field: &'static str,
    },

    /// Packaging was requested before staging produced its output.
    #[error("staged directory not found: {path}")]
    StagedDirMissing {
        /// Expected staged directory.
        path: PathBuf,
    },

    /// Manifest (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive construction failed.
    #[error("archive construction failed: {reason}")]
    Archive {
        /// What was being done when it failed.
        reason: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration was rejected.
        reason: String,
    },
}

impl PackError {
    /// Wraps an I/O error together with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wraps any archive-writer failure.
    pub fn archive(
        reason: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Archive {
            reason: reason.into(),
            source: source.into(),
        }
    }

    /// Returns what the user can do about the error, if anything.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::PackError;
    ///
    /// let err = PackError::ManifestField { field: "version" };
    /// assert_eq!(
    ///     err.remediation(),
    ///     Some("set it in package.json and run `distpack stage` again")
    /// );
    /// ```
    #[must_use]
    pub fn remediation(&self) -> Option<&str> {
        match self {
            Self::Precondition { remediation, .. } => Some(remediation),
            Self::MissingRequiredInput { .. } => {
                Some("restore it or run distpack from the project root")
            }
            Self::StagedDirMissing { .. } => Some("run `distpack stage` first"),
            Self::ManifestField { .. } => {
                Some("set it in package.json and run `distpack stage` again")
            }
            _ => None,
        }
    }
}
