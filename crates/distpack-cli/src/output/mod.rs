//! Output of the `stage` and `package` results.
//!
//! Results go to stdout, either as styled text or as one JSON document per
//! result. Logs are written to stderr separately.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use human::HumanFormatter;
use json::JsonFormatter;

/// Picks the formatter for the global `--json`, `--verbose` and `--quiet`
/// flags. `--json` wins over the other two.
pub fn create_formatter(json: bool, verbose: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter::new(verbose, quiet))
    }
}
