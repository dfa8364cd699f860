//! CLI tool for tiered locality.
//!
//! Provides commands for:
//! - Picking the nearest candidate for a local identity
//! - Inspecting an identity's display, record and wire forms

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
