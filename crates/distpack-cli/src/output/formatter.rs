//! Output formatter trait for CLI results.

use anyhow::Result;
use distpack_core::PackageReport;
use distpack_core::StageReport;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of `distpack stage`
    fn format_stage_result(&self, report: &StageReport) -> Result<()>;

    /// Format the result of `distpack package`
    fn format_package_result(&self, report: &PackageReport) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data,
        }
    }

    pub fn warning(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Warning,
            data,
        }
    }
}
