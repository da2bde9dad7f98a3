//! graphsync-cli library
//!
//! Argument definitions, logging setup, progress reporters and the command
//! implementations behind the `graphsync` binary.

pub mod commands;
pub mod logging;
pub mod progress;

pub use commands::{Cli, Commands, SyncArgs};
pub use logging::setup_logging;
