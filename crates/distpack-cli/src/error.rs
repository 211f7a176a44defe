//! Error conversion utilities for CLI.
//!
//! Converts distpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use distpack_core::PackError;

/// Converts `PackError` to a user-friendly anyhow error with hints.
pub fn convert_pack_error(err: PackError) -> anyhow::Error {
    let message = match &err {
        PackError::Precondition { artifact, .. } => {
            Some(format!("'{}' not found", artifact.display()))
        }
        PackError::MissingRequiredInput { path, kind } => Some(format!(
            "Required {kind} '{}' is missing from the project",
            path.display()
        )),
        PackError::StagedDirMissing { path } => {
            Some(format!("Staged directory '{}' not found", path.display()))
        }
        PackError::ManifestField { field } => {
            Some(format!("Staged manifest has no usable `{field}`"))
        }
        _ => None,
    };

    let Some(message) = message else {
        let is_manifest = matches!(err, PackError::InvalidManifest { .. } | PackError::Json(_));
        let err = anyhow::Error::from(err);
        return if is_manifest {
            err.context("Could not read package.json")
        } else {
            err
        };
    };

    match err.remediation() {
        Some(hint) => anyhow!("{message}\nHINT: {hint}."),
        None => anyhow!("{message}"),
    }
}

/// Converts the error of a core operation.
pub fn add_pack_context<T>(result: Result<T, PackError>) -> anyhow::Result<T> {
    result.map_err(convert_pack_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use distpack_core::SpecKind;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_precondition_error() {
        let err = PackError::Precondition {
            artifact: PathBuf::from("index.js"),
            remediation: "run the transpile step first".to_string(),
        };
        let msg = format!("{:?}", convert_pack_error(err));
        assert!(msg.contains("index.js"));
        assert!(msg.contains("HINT: run the transpile step first."));
    }

    #[test]
    fn test_convert_missing_input_error() {
        let err = PackError::MissingRequiredInput {
            path: PathBuf::from("views"),
            kind: SpecKind::Directory,
        };
        let msg = format!("{:?}", convert_pack_error(err));
        assert!(msg.contains("Required directory 'views'"));
        assert!(msg.contains("HINT: restore it"));
    }

    #[test]
    fn test_convert_staged_dir_missing_error() {
        let err = PackError::StagedDirMissing {
            path: PathBuf::from("dist"),
        };
        let msg = format!("{:?}", convert_pack_error(err));
        assert!(msg.contains("HINT: run `distpack stage` first."));
    }

    #[test]
    fn test_convert_manifest_field_error() {
        let err = PackError::ManifestField { field: "version" };
        let msg = format!("{:?}", convert_pack_error(err));
        assert!(msg.contains("`version`"));
        assert!(msg.contains("HINT: set it in package.json"));
    }

    #[test]
    fn test_convert_io_error_keeps_path() {
        let err = PackError::io(
            "dist/index.js",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = format!("{:?}", convert_pack_error(err));
        assert!(msg.contains("dist/index.js"));
        assert!(msg.contains("denied"));
    }
}
