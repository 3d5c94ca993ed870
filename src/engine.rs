use std::sync::Arc;

use tracing::{error, info};

use crate::config::BackupConfig;
use crate::copy::{prepare, walk_tree, BackupReport};
use crate::error::BackupError;
use crate::progress::{ProgressCallback, ProgressInfo, ProgressState};
use crate::utils::{format_elapsed, format_timestamp, now};

const RULE_WIDTH: usize = 50;

/// Runs one backup: banner, mirror, summary.
pub struct BackupEngine {
    config: BackupConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl BackupEngine {
    pub fn new(config: BackupConfig, progress: Arc<dyn ProgressCallback>) -> Self {
        Self { config, progress }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    pub fn run(&self) -> Result<BackupReport, BackupError> {
        let result = self.backup();

        let state = match &result {
            Ok(_) => ProgressState::Completed,
            Err(e) if e.is_cancelled() => ProgressState::Cancelled,
            Err(e) => {
                error!(error = %e, "backup failed");
                ProgressState::Failed
            }
        };
        let mut info = ProgressInfo {
            state,
            ..Default::default()
        };
        if let Ok(report) = &result {
            info.files_done = report.stats.files_copied;
            info.dirs_done = report.stats.dirs_created;
            info.bytes_done = report.stats.bytes_copied;
        }
        self.progress.on_progress(&info);

        if let Ok(report) = &result {
            self.log_summary(report);
        }
        result
    }

    fn backup(&self) -> Result<BackupReport, BackupError> {
        let source = &self.config.source;
        let destination = &self.config.destination;
        let rule = "=".repeat(RULE_WIDTH);
        let started = now();

        self.progress.on_log(&format!(
            "{rule}\n\
             Creating backup of {}\n\
             {rule}\n\
             Source: {}\n\
             Backup: {}\n\
             Timestamp: {}\n",
            source_label(&self.config),
            source.display(),
            destination.display(),
            format_timestamp(started),
        ));
        info!(source = %source.display(), destination = %destination.display(), "starting backup");

        prepare(source, destination)?;
        self.progress
            .on_log(&format!("Backup directory ready: {}\n", destination.display()));

        self.progress
            .on_log("Copying files (this may take a few minutes)...");
        self.progress.on_progress(&ProgressInfo {
            state: ProgressState::Copying,
            ..Default::default()
        });

        let report = walk_tree(
            source,
            destination,
            &self.config.exclude,
            self.progress.as_ref(),
            started,
        )?;
        info!(
            files = report.stats.files_copied,
            dirs = report.stats.dirs_created,
            failures = report.failures.len(),
            "backup finished"
        );
        Ok(report)
    }

    fn log_summary(&self, report: &BackupReport) {
        let rule = "=".repeat(RULE_WIDTH);
        let headline = if report.is_clean() {
            "Backup completed successfully!".to_string()
        } else {
            format!(
                "Backup completed with {} entries not copied",
                report.failures.len()
            )
        };
        let destination = self.config.destination.display();

        self.progress.on_log(&format!(
            "\n{rule}\n\
             {headline}\n\
             {rule}\n\
             Backup location: {destination}\n\
             Backup timestamp: {}\n\
             {}\n\
             Elapsed time: {}\n\n\
             Excluded directories: {}\n\n\
             To restore from backup, copy files back from:\n  \
             {destination}\n",
            format_timestamp(report.started),
            report.stats,
            format_elapsed(report.elapsed),
            self.config.excluded_names(),
        ));
    }
}

/// Name of the backed up directory for the banner.
fn source_label(config: &BackupConfig) -> String {
    config
        .source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| config.source.display().to_string())
}
