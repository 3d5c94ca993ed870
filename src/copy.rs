//! The directory mirror.
//!
//! A depth-first walk that lists a directory, prunes excluded children,
//! creates the matching destination directory, copies the files and only
//! then descends. Setup problems are fatal; a file that cannot be copied is
//! recorded and the walk carries on.

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use filetime::FileTime;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::{BackupError, CopyFailure};
use crate::exclude::ExcludeSet;
use crate::progress::{ProgressCallback, ProgressInfo, ProgressState};
use crate::stats::Statistics;
use crate::utils;

/// Outcome of a completed traversal.
#[derive(Debug)]
pub struct BackupReport {
    pub stats: Statistics,
    /// Entries that could not be mirrored, in traversal order
    pub failures: Vec<CopyFailure>,
    pub started: OffsetDateTime,
    pub elapsed: Duration,
}

impl BackupReport {
    pub fn files_copied(&self) -> usize {
        self.stats.files_copied
    }

    pub fn dirs_created(&self) -> usize {
        self.stats.dirs_created
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Mirrors `source` into `destination`, skipping every directory whose name
/// is in `exclude`.
///
/// Nothing is written when `source` is missing. The destination root and any
/// missing parents are created, so running twice converges on the same tree.
pub fn mirror(
    source: &Path,
    destination: &Path,
    exclude: &ExcludeSet,
    progress: &dyn ProgressCallback,
) -> Result<BackupReport, BackupError> {
    let started = utils::now();
    prepare(source, destination)?;
    walk_tree(source, destination, exclude, progress, started)
}

/// Everything that must hold before the first file is copied: the source is
/// a directory, the two roots do not overlap the wrong way round, and the
/// destination root exists.
pub(crate) fn prepare(source: &Path, destination: &Path) -> Result<(), BackupError> {
    check_source(source)?;
    check_overlap(source, destination)?;
    prepare_destination(destination)
}

/// Walks an already prepared source/destination pair.
pub(crate) fn walk_tree(
    source: &Path,
    destination: &Path,
    exclude: &ExcludeSet,
    progress: &dyn ProgressCallback,
    started: OffsetDateTime,
) -> Result<BackupReport, BackupError> {
    let clock = Instant::now();
    let mut walker = TreeWalker {
        exclude,
        prune: destination_inside_source(source, destination),
        progress,
        stats: Statistics::new(),
        failures: Vec::new(),
    };
    walker.copy_directory(source, destination, Path::new(""))?;

    Ok(BackupReport {
        stats: walker.stats,
        failures: walker.failures,
        started,
        elapsed: clock.elapsed(),
    })
}

fn check_source(source: &Path) -> Result<(), BackupError> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BackupError::SourceNotDirectory(source.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(BackupError::SourceMissing(source.to_path_buf()))
        }
        Err(e) => Err(BackupError::ReadDirectory {
            path: source.to_path_buf(),
            source: e,
        }),
    }
}

/// Rejects a destination that is the source or one of its ancestors; in both
/// cases mirrored directories would land inside the source tree.
/// A destination that does not exist yet cannot overlap an existing source.
fn check_overlap(source: &Path, destination: &Path) -> Result<(), BackupError> {
    let (Ok(source), Ok(destination)) = (fs::canonicalize(source), fs::canonicalize(destination)) else {
        return Ok(());
    };
    if source == destination {
        return Err(BackupError::DestinationIsSource(destination));
    }
    if source.starts_with(&destination) {
        return Err(BackupError::SourceInsideDestination {
            source_dir: source,
            backup_dir: destination,
        });
    }
    Ok(())
}

fn prepare_destination(destination: &Path) -> Result<(), BackupError> {
    fs::create_dir_all(destination).map_err(|source| BackupError::CreateDestination {
        path: destination.to_path_buf(),
        source,
    })
}

/// Canonical destination when it sits below the source, so the walk can
/// step over it instead of copying the backup into itself.
fn destination_inside_source(source: &Path, destination: &Path) -> Option<PathBuf> {
    let source = fs::canonicalize(source).ok()?;
    let destination = fs::canonicalize(destination).ok()?;
    (destination != source && destination.starts_with(&source)).then_some(destination)
}

enum EntryKind {
    File,
    Dir,
    Skip(&'static str),
}

fn classify(entry: &DirEntry) -> io::Result<EntryKind> {
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
        return Ok(EntryKind::Dir);
    }
    if file_type.is_file() {
        return Ok(EntryKind::File);
    }
    if file_type.is_symlink() {
        // Links are not descended; links to files are copied by content and
        // dangling ones fail in copy_file like any unreadable file.
        return Ok(match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => EntryKind::Skip("symlink to directory"),
            Ok(meta) if !meta.is_file() => EntryKind::Skip("symlink to special file"),
            _ => EntryKind::File,
        });
    }
    Ok(EntryKind::Skip("special file"))
}

fn read_entries(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, io::Error>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Copies content, permissions and access/modification times.
fn copy_file(src_path: &Path, dst_path: &Path) -> io::Result<u64> {
    let src_meta = fs::metadata(src_path)?;
    let bytes = fs::copy(src_path, dst_path)?;
    filetime::set_file_times(
        dst_path,
        FileTime::from_last_access_time(&src_meta),
        FileTime::from_last_modification_time(&src_meta),
    )?;
    Ok(bytes)
}

struct TreeWalker<'a> {
    exclude: &'a ExcludeSet,
    prune: Option<PathBuf>,
    progress: &'a dyn ProgressCallback,
    stats: Statistics,
    failures: Vec<CopyFailure>,
}

impl TreeWalker<'_> {
    fn copy_directory(&mut self, src_dir: &Path, dst_dir: &Path, rel_path: &Path) -> Result<(), BackupError> {
        if self.progress.is_cancelled() {
            return Err(BackupError::Cancelled);
        }
        let is_root = rel_path.as_os_str().is_empty();

        let entries = match read_entries(src_dir) {
            Ok(entries) => entries,
            Err(source) if is_root => {
                return Err(BackupError::ReadDirectory {
                    path: src_dir.to_path_buf(),
                    source,
                });
            }
            Err(source) => {
                self.stats.add_dir_failed();
                self.record_failure(CopyFailure::directory(src_dir.to_path_buf(), source));
                return Ok(());
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            match classify(&entry) {
                Ok(EntryKind::File) => files.push((path, entry.file_name())),
                Ok(EntryKind::Dir) => {
                    let name = entry.file_name();
                    if self.exclude.is_excluded(&name.to_string_lossy()) {
                        debug!(path = %path.display(), "excluded directory");
                        self.stats.add_dir_excluded();
                    } else if self.is_destination(&path) {
                        debug!(path = %path.display(), "skipping backup destination inside source");
                        self.stats.add_entry_skipped();
                    } else {
                        subdirs.push((path, name));
                    }
                }
                Ok(EntryKind::Skip(reason)) => {
                    debug!(path = %path.display(), reason, "skipped entry");
                    self.progress
                        .on_log(&format!("Skipping {reason}: {}", path.display()));
                    self.stats.add_entry_skipped();
                }
                Err(source) => {
                    self.stats.add_file_failed();
                    self.record_failure(CopyFailure::file(path, source));
                }
            }
        }

        fs::create_dir_all(dst_dir).map_err(|source| BackupError::CreateDirectory {
            path: dst_dir.to_path_buf(),
            source,
        })?;
        if !is_root {
            debug!(dir = %rel_path.display(), "created directory");
            self.stats.add_dir_created();
        }

        for (src_path, name) in files {
            if self.progress.is_cancelled() {
                return Err(BackupError::Cancelled);
            }
            let dst_path = dst_dir.join(&name);
            match copy_file(&src_path, &dst_path) {
                Ok(bytes) => {
                    debug!(file = %src_path.display(), bytes, "copied");
                    self.stats.add_file_copied(bytes);
                    self.progress.on_progress(&ProgressInfo {
                        state: ProgressState::Copying,
                        current_file: src_path.to_string_lossy().to_string(),
                        files_done: self.stats.files_copied,
                        dirs_done: self.stats.dirs_created,
                        bytes_done: self.stats.bytes_copied,
                    });
                }
                Err(source) => {
                    self.stats.add_file_failed();
                    self.record_failure(CopyFailure::file(src_path, source));
                }
            }
        }

        for (src_path, name) in subdirs {
            self.copy_directory(&src_path, &dst_dir.join(&name), &rel_path.join(&name))?;
        }
        Ok(())
    }

    fn is_destination(&self, dir: &Path) -> bool {
        match &self.prune {
            Some(prune) => fs::canonicalize(dir).is_ok_and(|dir| &dir == prune),
            None => false,
        }
    }

    fn record_failure(&mut self, failure: CopyFailure) {
        warn!(path = %failure.path.display(), error = %failure.source, "entry not copied");
        self.progress.on_copy_failed(&failure);
        self.failures.push(failure);
    }
}
