//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use distpack_core::PackageReport;
use distpack_core::StageReport;
use distpack_core::stats::format_bytes;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn headline(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn hint(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("→").cyan()));
        } else {
            let _ = self.term.write_line(&format!("-> {message}"));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_stage_result(&self, report: &StageReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Staged release in {}", report.output_dir.display()));
        let _ = self.term.write_line("");

        if self.verbose {
            for item in &report.staged {
                let _ = self.term.write_line(&format!(
                    "  {:<16} {} file(s), {} dir(s), {}, {} excluded",
                    item.path.display(),
                    item.outcome.files_copied,
                    item.outcome.directories_created,
                    format_bytes(item.outcome.bytes_copied),
                    item.outcome.entries_excluded
                ));
            }
            let _ = self.term.write_line("");
        }

        let _ = self
            .term
            .write_line(&format!("  Files:            {}", report.stats.file_count));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            format_bytes(report.stats.total_bytes)
        ));
        let _ = self
            .term
            .write_line(&format!("  Excluded:         {}", report.entries_excluded()));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        let _ = self.term.write_line("");
        self.hint("Next: run `distpack package` to build the release archive");

        Ok(())
    }

    fn format_package_result(&self, report: &PackageReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let archive = &report.archive;
        self.headline(&format!("Archive created: {}", report.archive_path.display()));
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Release:          {} v{}",
            report.metadata.name, report.metadata.version
        ));
        let _ = self
            .term
            .write_line(&format!("  Files added:      {}", archive.files_added));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            format_bytes(archive.total_bytes)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Directories:      {}", archive.directories_added));
            let _ = self.term.write_line(&format!(
                "  Content size:     {}",
                format_bytes(archive.bytes_written)
            ));
            let _ = self.term.write_line(&format!(
                "  Compression:      {:.1}%",
                archive.compression_percentage()
            ));
            if report.removed_previous {
                let _ = self.term.write_line("  Replaced previous archive");
            }
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", archive.duration));
        }

        if archive.has_warnings() {
            let _ = self
                .term
                .write_line(&format!("  Warnings:         {}", archive.warnings.len()));
        }

        let _ = self.term.write_line("");
        self.hint("Extract the archive and copy its dist/ folder into the poi plugins directory");
        self.hint("See README.txt inside the archive for detailed instructions");

        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
