// Registered namespace prefix and its search directories

use crate::error::{ConfigError, Result};
use std::path::PathBuf;

/// A prefix from the autoload table together with the directories that
/// hold files for symbols under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixEntry {
    prefix: String,
    prefix_length: usize,
    bucket: char,
    base_directories: Vec<PathBuf>,
}

impl PrefixEntry {
    /// Create an entry, deriving its length and bucket from the prefix.
    ///
    /// # Errors
    /// `EmptyPrefix` for `""`, `EmptyDirectories` when no directory is given.
    pub fn new(prefix: impl Into<String>, base_directories: Vec<PathBuf>) -> Result<Self> {
        let prefix = prefix.into();
        let bucket = prefix.chars().next().ok_or(ConfigError::EmptyPrefix)?;

        if base_directories.is_empty() {
            return Err(ConfigError::EmptyDirectories { prefix });
        }

        Ok(Self {
            prefix_length: prefix_length_of(&prefix),
            prefix,
            bucket,
            base_directories,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Length of the prefix in characters
    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    /// First character of the prefix, used to group candidate prefixes
    pub fn bucket(&self) -> char {
        self.bucket
    }

    pub fn base_directories(&self) -> &[PathBuf] {
        &self.base_directories
    }

    /// Remainder of `symbol` after this prefix, if the prefix matches it.
    pub fn strip<'a>(&self, symbol: &'a str) -> Option<&'a str> {
        symbol.strip_prefix(self.prefix.as_str())
    }
}

pub(crate) fn prefix_length_of(prefix: &str) -> usize {
    prefix.chars().count()
}

/// Compare a length declared by an external table with the derived one.
pub(crate) fn check_declared_length(prefix: &str, declared: usize) -> Result<()> {
    let actual = prefix_length_of(prefix);
    if declared != actual {
        return Err(ConfigError::LengthMismatch {
            prefix: prefix.to_string(),
            declared,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_derived() {
        let entry = PrefixEntry::new("Dkan\\Datastore\\", vec![PathBuf::from("src")]).unwrap();
        assert_eq!(entry.prefix_length(), 15);
        assert_eq!(entry.bucket(), 'D');
        assert!(check_declared_length(entry.prefix(), 15).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        let entry = PrefixEntry::new("Über::", vec![PathBuf::from("src")]).unwrap();
        assert_eq!(entry.prefix_length(), 6);
        assert_eq!(entry.bucket(), 'Ü');
    }

    #[test]
    fn test_declared_length_mismatch() {
        match check_declared_length("Acme\\", 4) {
            Err(ConfigError::LengthMismatch {
                declared, actual, ..
            }) => {
                assert_eq!(declared, 4);
                assert_eq!(actual, 5);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_inputs() {
        assert!(matches!(
            PrefixEntry::new("", vec![PathBuf::from("src")]),
            Err(ConfigError::EmptyPrefix)
        ));
        assert!(matches!(
            PrefixEntry::new("Acme\\", Vec::new()),
            Err(ConfigError::EmptyDirectories { .. })
        ));
    }

    #[test]
    fn test_strip() {
        let entry = PrefixEntry::new("Acme\\", vec![PathBuf::from("src")]).unwrap();
        assert_eq!(entry.strip("Acme\\Widget"), Some("Widget"));
        assert_eq!(entry.strip("Acm\\Widget"), None);
    }
}
