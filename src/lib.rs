//! rbackup - directory tree backup utility
//!
//! Mirrors a source directory into a backup location, pruning dependency
//! caches, build outputs and version-control metadata on the way down.

pub mod config;
pub mod copy;
pub mod error;
pub mod exclude;
pub mod stats;
pub mod utils;

mod engine;
mod progress;

pub use config::BackupConfig;
pub use copy::{mirror, BackupReport};
pub use engine::BackupEngine;
pub use error::{BackupError, CopyFailure, FailureKind};
pub use exclude::ExcludeSet;
pub use progress::{CliProgress, NullProgress, ProgressCallback, ProgressInfo, ProgressState, SharedProgress};
pub use stats::Statistics;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "rbackup";
