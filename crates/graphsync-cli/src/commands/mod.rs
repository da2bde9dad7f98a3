//! CLI commands

pub mod sync;
pub mod types;

pub use types::{Cli, Commands, SyncArgs};
