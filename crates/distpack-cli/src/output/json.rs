//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use distpack_core::PackageReport;
use distpack_core::StageReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct StagedItemOutput {
    path: String,
    kind: String,
    files_copied: u64,
    directories_created: u64,
    bytes_copied: u64,
    entries_excluded: u64,
}

#[derive(Serialize)]
struct StageOutput {
    output_dir: String,
    staged: Vec<StagedItemOutput>,
    skipped: Vec<String>,
    file_count: u64,
    total_bytes: u64,
    entries_excluded: u64,
    duration_ms: u128,
}

#[derive(Serialize)]
struct PackageOutput {
    archive_path: String,
    name: String,
    version: String,
    removed_previous: bool,
    files_added: usize,
    directories_added: usize,
    bytes_written: u64,
    total_bytes: u64,
    compression_percentage: f64,
    warnings: Vec<String>,
    duration_ms: u128,
}

impl From<&StageReport> for StageOutput {
    fn from(report: &StageReport) -> Self {
        Self {
            output_dir: report.output_dir.display().to_string(),
            staged: report
                .staged
                .iter()
                .map(|item| StagedItemOutput {
                    path: item.path.display().to_string(),
                    kind: item.kind.to_string(),
                    files_copied: item.outcome.files_copied,
                    directories_created: item.outcome.directories_created,
                    bytes_copied: item.outcome.bytes_copied,
                    entries_excluded: item.outcome.entries_excluded,
                })
                .collect(),
            skipped: report
                .skipped
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            file_count: report.stats.file_count,
            total_bytes: report.stats.total_bytes,
            entries_excluded: report.entries_excluded(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl From<&PackageReport> for PackageOutput {
    fn from(report: &PackageReport) -> Self {
        let archive = &report.archive;
        Self {
            archive_path: report.archive_path.display().to_string(),
            name: report.metadata.name.clone(),
            version: report.metadata.version.clone(),
            removed_previous: report.removed_previous,
            files_added: archive.files_added,
            directories_added: archive.directories_added,
            bytes_written: archive.bytes_written,
            total_bytes: archive.total_bytes,
            compression_percentage: archive.compression_percentage(),
            warnings: archive.warnings.iter().map(ToString::to_string).collect(),
            duration_ms: archive.duration.as_millis(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_stage_result(&self, report: &StageReport) -> Result<()> {
        Self::output(&JsonOutput::success("stage", StageOutput::from(report)))
    }

    fn format_package_result(&self, report: &PackageReport) -> Result<()> {
        Self::output(&JsonOutput::success("package", PackageOutput::from(report)))
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::warning(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
