use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use rbackup::utils::{init_local_offset, init_logging};
use rbackup::{BackupConfig, BackupEngine, BackupError, CliProgress};

fn main() -> ExitCode {
    // Must run before ctrlc spawns its signal thread.
    init_local_offset();
    init_logging();

    let config = match BackupConfig::builtin() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let progress = Arc::new(CliProgress::new());

    // Handle Ctrl+C
    let cancel_handle = progress.cancel_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\nCancelling...");
        cancel_handle.store(true, Ordering::Relaxed);
    }) {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }

    let engine = BackupEngine::new(config, progress);
    match engine.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(e: &BackupError) -> ExitCode {
    match e {
        BackupError::Cancelled => println!("\n\nBackup cancelled by user."),
        BackupError::SourceMissing(_) => println!("ERROR: {e}"),
        _ => eprintln!("\nERROR: Backup failed: {e}"),
    }
    ExitCode::from(e.exit_code())
}
