//! Stage command implementation.

use crate::error::add_pack_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use distpack_core::PackConfig;
use distpack_core::Stager;
use std::path::Path;

pub fn execute(root: &Path, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = PackConfig::new(root);
    let report = add_pack_context(Stager::new(&config).stage())?;

    for skipped in &report.skipped {
        formatter.format_warning(&format!("skipped {} (not found)", skipped.display()));
    }
    formatter.format_stage_result(&report)?;

    Ok(())
}
