use std::fmt;

/// Counters for a single run. Only the traversal thread touches them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub dirs_created: usize,
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub dirs_excluded: usize,
    pub entries_skipped: usize,
    pub files_failed: usize,
    pub dirs_failed: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir_created(&mut self) {
        self.dirs_created += 1;
    }

    pub fn add_file_copied(&mut self, bytes: u64) {
        self.files_copied += 1;
        self.bytes_copied += bytes;
    }

    pub fn add_dir_excluded(&mut self) {
        self.dirs_excluded += 1;
    }

    pub fn add_entry_skipped(&mut self) {
        self.entries_skipped += 1;
    }

    pub fn add_file_failed(&mut self) {
        self.files_failed += 1;
    }

    pub fn add_dir_failed(&mut self) {
        self.dirs_failed += 1;
    }

    pub fn failures(&self) -> usize {
        self.files_failed + self.dirs_failed
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files copied: {}", self.files_copied)?;
        writeln!(f, "Directories created: {}", self.dirs_created)?;
        writeln!(f, "Bytes copied: {}", self.bytes_copied)?;
        writeln!(f, "Directories excluded: {}", self.dirs_excluded)?;
        writeln!(f, "Entries skipped: {}", self.entries_skipped)?;
        write!(f, "Failures: {}", self.failures())
    }
}
