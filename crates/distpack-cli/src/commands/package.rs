//! Package command implementation.

use crate::error::add_pack_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use distpack_core::PackConfig;
use distpack_core::Packager;
use std::path::Path;

pub fn execute(root: &Path, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = PackConfig::new(root);
    let report = add_pack_context(Packager::new(&config).package())?;

    for warning in &report.archive.warnings {
        formatter.format_warning(&warning.to_string());
    }
    formatter.format_package_result(&report)?;

    Ok(())
}
