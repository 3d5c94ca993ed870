//! Progress reporting for a backup run.
//!
//! The traversal never prints directly. Everything a user sees goes through
//! a [`ProgressCallback`], so the terminal frontend and tests can observe the
//! same run differently.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::CopyFailure;

/// How many successful copies between two terminal progress lines.
pub const PROGRESS_INTERVAL: usize = 100;

/// Current state of a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// Not started
    Idle,
    /// Walking the source and copying files
    Copying,
    /// Stopped by the user
    Cancelled,
    /// Traversal finished
    Completed,
    /// Stopped by a fatal error
    Failed,
}

/// Snapshot of a run in progress
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    pub state: ProgressState,
    /// Source path of the file just copied
    pub current_file: String,
    pub files_done: usize,
    pub dirs_done: usize,
    pub bytes_done: u64,
}

impl Default for ProgressInfo {
    fn default() -> Self {
        Self {
            state: ProgressState::Idle,
            current_file: String::new(),
            files_done: 0,
            dirs_done: 0,
            bytes_done: 0,
        }
    }
}

/// Receives updates from the backup engine.
pub trait ProgressCallback: Send + Sync {
    /// Called after every successful copy and on state changes
    fn on_progress(&self, info: &ProgressInfo);

    /// Called with a line of human readable output
    fn on_log(&self, message: &str);

    /// Called when a single entry could not be mirrored
    fn on_copy_failed(&self, failure: &CopyFailure) {
        self.on_log(&format!("Warning: {failure}"));
    }

    /// Polled between entries; `true` stops the run
    fn is_cancelled(&self) -> bool;
}

/// Discards everything.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
    fn on_log(&self, _message: &str) {}
    fn on_copy_failed(&self, _failure: &CopyFailure) {}
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Terminal frontend: narrative on stdout, warnings on stderr.
pub struct CliProgress {
    cancel_flag: Arc<AtomicBool>,
    interval: usize,
}

impl CliProgress {
    pub fn new() -> Self {
        Self {
            cancel_flag: Arc::new(AtomicBool::new(false)),
            interval: PROGRESS_INTERVAL,
        }
    }

    /// Get a handle to request cancellation
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for CliProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.state {
            ProgressState::Copying => {
                if info.files_done > 0 && info.files_done % self.interval == 0 {
                    print!("  Copied {} files...\r", info.files_done);
                    let _ = std::io::stdout().flush();
                }
            }
            ProgressState::Completed => println!(),
            _ => {}
        }
    }

    fn on_log(&self, message: &str) {
        println!("{message}");
    }

    fn on_copy_failed(&self, failure: &CopyFailure) {
        eprintln!("\nWarning: {failure}");
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Keeps every update in memory. Handy for embedding and for tests.
#[derive(Clone, Default)]
pub struct SharedProgress {
    cancel_flag: Arc<AtomicBool>,
    info: Arc<Mutex<ProgressInfo>>,
    log_messages: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<String>>>,
    progress_events: Arc<Mutex<usize>>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the current run
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Last snapshot received
    pub fn get_info(&self) -> ProgressInfo {
        self.info.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.log_messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rendered failures, in the order they happened
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn progress_events(&self) -> usize {
        *self.progress_events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressCallback for SharedProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        *self.info.lock().unwrap_or_else(PoisonError::into_inner) = info.clone();
        *self.progress_events.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn on_log(&self, message: &str) {
        self.log_messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn on_copy_failed(&self, failure: &CopyFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.to_string());
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}
