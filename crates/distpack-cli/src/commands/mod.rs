//! Subcommand implementations.

pub mod package;
pub mod stage;
