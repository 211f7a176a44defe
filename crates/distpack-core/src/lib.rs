//! Release staging and archive packaging for host-application plugins.
//!
//! `distpack-core` turns a plugin source tree into a distributable release
//! in two steps:
//!
//! - **stage**: rebuild a clean output directory holding only the files
//!   the host needs, with source files, OS metadata and dependency trees
//!   filtered out and the manifest stripped to its runtime fields;
//! - **package**: compress the staged directory into
//!   `<name>-<version>.zip` together with installation instructions.
//!
//! # Examples
//!
//! ```no_run
//! use distpack_core::PackConfig;
//! use distpack_core::Packager;
//! use distpack_core::Stager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackConfig::new("/work/poi-plugin-x");
//! let staged = Stager::new(&config).stage()?;
//! println!("staged {} files", staged.stats.file_count);
//!
//! let packaged = Packager::new(&config).package()?;
//! println!("created {}", packaged.archive_path.display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod copy;
pub mod error;
pub mod filters;
pub mod manifest;
pub mod package;
pub mod readme;
pub mod stage;
pub mod stats;

// Re-export main API types
pub use archive::ArchiveBuilder;
pub use archive::ArchiveReport;
pub use archive::ArchiveWarning;
pub use config::CopySpec;
pub use config::PackConfig;
pub use config::SpecKind;
pub use error::PackError;
pub use error::Result;
pub use filters::ExclusionRule;
pub use manifest::ProjectMetadata;
pub use package::PackageReport;
pub use package::Packager;
pub use stage::StageReport;
pub use stage::Stager;
pub use stats::DirectoryStats;
