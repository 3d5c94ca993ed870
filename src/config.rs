use std::path::PathBuf;

use crate::error::BackupError;
use crate::exclude::ExcludeSet;

/// Directory that gets backed up. Overridable only when the binary is built.
pub const DEFAULT_SOURCE: &str = match option_env!("RBACKUP_SOURCE") {
    Some(path) => path,
    None => "/home/van/reward-project",
};

/// Where the backup lands. Overridable only when the binary is built.
pub const DEFAULT_DESTINATION: &str = match option_env!("RBACKUP_DESTINATION") {
    Some(path) => path,
    None => "/home/van/Reward Project backup",
};

/// Dependency caches, build outputs and VCS metadata.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git", "__pycache__", ".next", "dist", "build"];

#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub exclude: ExcludeSet,
}

impl BackupConfig {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, exclude: ExcludeSet) -> Self {
        BackupConfig {
            source: source.into(),
            destination: destination.into(),
            exclude,
        }
    }

    /// The configuration compiled into the binary.
    pub fn builtin() -> Result<Self, BackupError> {
        let exclude = ExcludeSet::new(DEFAULT_EXCLUDE_DIRS.iter().copied())?;
        Ok(Self::new(DEFAULT_SOURCE, DEFAULT_DESTINATION, exclude))
    }

    /// Comma separated exclusion list for the run banner and summary.
    pub fn excluded_names(&self) -> String {
        self.exclude.names().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_uses_compiled_defaults() {
        let config = BackupConfig::builtin().unwrap();
        assert_eq!(config.source, PathBuf::from(DEFAULT_SOURCE));
        assert_eq!(config.destination, PathBuf::from(DEFAULT_DESTINATION));
        assert!(config.source.is_absolute());
        assert!(config.destination.is_absolute());
        assert_eq!(config.exclude.names().len(), DEFAULT_EXCLUDE_DIRS.len());
    }

    #[test]
    fn excluded_names_keep_declaration_order() {
        let config = BackupConfig::builtin().unwrap();
        assert_eq!(
            config.excluded_names(),
            "node_modules, .git, __pycache__, .next, dist, build"
        );
    }
}
