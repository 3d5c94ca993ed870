use glob::Pattern;

use crate::error::BackupError;

/// Directory base names that are pruned wherever they appear in the tree.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    names: Vec<String>,
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    pub fn new<I, S>(names: I) -> Result<Self, BackupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = ExcludeSet {
            names: Vec::new(),
            patterns: Vec::new(),
        };
        for name in names {
            let name = name.into();
            if set.names.contains(&name) {
                continue;
            }
            let pattern = Pattern::new(&name).map_err(|source| BackupError::InvalidExclude {
                name: name.clone(),
                source,
            })?;
            set.names.push(name);
            set.patterns.push(pattern);
        }
        Ok(set)
    }

    /// An exclusion set that matches nothing.
    pub fn empty() -> Self {
        ExcludeSet {
            names: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Checks a directory's base name, never its full path.
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(dir_name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
