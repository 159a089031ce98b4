// Autoload table configuration (autoload.json)

use crate::entry::{check_declared_length, prefix_length_of};
use crate::error::{ConfigError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Static prefix table consumed by [`crate::PrefixResolver`].
///
/// `prefix_dirs` maps each namespace prefix to its ordered base directories.
/// `prefix_lengths` is the optional companion table grouping prefixes by
/// first character with their declared lengths; when present it must agree
/// with `prefix_dirs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoloadConfig {
    /// Directory that relative base directories are joined to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    #[serde(default = "default_separator")]
    pub separator: String,

    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_lengths: Option<BTreeMap<String, BTreeMap<String, usize>>>,

    #[serde(default)]
    pub prefix_dirs: BTreeMap<String, Vec<PathBuf>>,

    /// Directory of the manifest this table was loaded from
    #[serde(skip)]
    manifest_dir: Option<PathBuf>,
}

fn default_separator() -> String {
    "\\".to_string()
}

fn default_extension() -> String {
    "php".to_string()
}

impl Default for AutoloadConfig {
    fn default() -> Self {
        Self {
            root: None,
            separator: default_separator(),
            extension: default_extension(),
            prefix_lengths: None,
            prefix_dirs: BTreeMap::new(),
            manifest_dir: None,
        }
    }
}

impl AutoloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(prefix, directories)` pairs.
    pub fn from_pairs<I, P, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, D)>,
        P: Into<String>,
        D: IntoIterator,
        D::Item: Into<PathBuf>,
    {
        let mut config = Self::default();
        for (prefix, dirs) in pairs {
            config.add_prefix(prefix, dirs, false);
        }
        config
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Register directories for a prefix.
    ///
    /// Directories for an already registered prefix are appended, or
    /// prepended when `prepend` is set. Directories already present are
    /// skipped. A new prefix also gets a length entry if the lengths table
    /// is in use.
    pub fn add_prefix<P, D>(&mut self, prefix: P, dirs: D, prepend: bool) -> &mut Self
    where
        P: Into<String>,
        D: IntoIterator,
        D::Item: Into<PathBuf>,
    {
        let prefix = prefix.into();
        let incoming: Vec<PathBuf> = dirs.into_iter().map(Into::into).collect();

        if let Some(lengths) = self.prefix_lengths.as_mut() {
            if let Some(first) = prefix.chars().next() {
                lengths
                    .entry(first.to_string())
                    .or_default()
                    .entry(prefix.clone())
                    .or_insert_with(|| prefix_length_of(&prefix));
            }
        }

        let existing = self.prefix_dirs.entry(prefix.clone()).or_default();
        let mut fresh = Vec::with_capacity(incoming.len());
        for dir in incoming {
            if existing.contains(&dir) || fresh.contains(&dir) {
                warn!("Ignoring duplicate directory {} for '{}'", dir.display(), prefix);
                continue;
            }
            fresh.push(dir);
        }

        if prepend {
            existing.splice(0..0, fresh);
        } else {
            existing.extend(fresh);
        }

        self
    }

    /// Fill `prefix_lengths` from `prefix_dirs`, replacing any existing table.
    pub fn generate_prefix_lengths(&mut self) -> &mut Self {
        let mut lengths: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for prefix in self.prefix_dirs.keys() {
            if let Some(first) = prefix.chars().next() {
                lengths
                    .entry(first.to_string())
                    .or_default()
                    .insert(prefix.clone(), prefix_length_of(prefix));
            }
        }
        self.prefix_lengths = Some(lengths);
        self
    }

    /// Parse autoload.json from file
    ///
    /// Relative directories in a manifest are taken relative to the
    /// manifest's own directory (or to its `root`, itself relative to it).
    /// `root` keeps the value written in the manifest, so saving the table
    /// back writes the same paths.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_str(&content)?;
        config.manifest_dir = Some(
            path.parent()
                .unwrap_or_else(|| Path::new(""))
                .to_path_buf(),
        );

        debug!(
            "Loaded autoload manifest {} ({} prefixes)",
            path.display(),
            config.prefix_dirs.len()
        );
        Ok(config)
    }

    /// Parse autoload.json from string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: AutoloadConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write manifest to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_string_pretty()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the table for anything that would break lookups.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }

        if !is_valid_extension(&self.extension) {
            return Err(ConfigError::InvalidExtension(self.extension.clone()));
        }

        for (prefix, dirs) in &self.prefix_dirs {
            if prefix.is_empty() {
                return Err(ConfigError::EmptyPrefix);
            }
            if !prefix.ends_with(self.separator.as_str()) {
                return Err(ConfigError::MissingTrailingSeparator {
                    prefix: prefix.clone(),
                    separator: self.separator.clone(),
                });
            }
            if dirs.is_empty() {
                return Err(ConfigError::EmptyDirectories {
                    prefix: prefix.clone(),
                });
            }
        }

        if let Some(lengths) = &self.prefix_lengths {
            self.validate_lengths(lengths)?;
        }

        Ok(())
    }

    fn validate_lengths(&self, lengths: &BTreeMap<String, BTreeMap<String, usize>>) -> Result<()> {
        let mut declared_count = 0;

        for (bucket, prefixes) in lengths {
            for (prefix, &declared) in prefixes {
                let first = prefix.chars().next().ok_or(ConfigError::EmptyPrefix)?;
                if !bucket.chars().eq(std::iter::once(first)) {
                    return Err(ConfigError::BucketMismatch {
                        bucket: bucket.clone(),
                        prefix: prefix.clone(),
                    });
                }

                if !self.prefix_dirs.contains_key(prefix) {
                    return Err(ConfigError::UnknownPrefix {
                        prefix: prefix.clone(),
                    });
                }

                check_declared_length(prefix, declared)?;

                declared_count += 1;
            }
        }

        if declared_count != self.prefix_dirs.len() {
            let missing = self
                .prefix_dirs
                .keys()
                .find(|prefix| !declares(lengths, prefix));
            if let Some(prefix) = missing {
                return Err(ConfigError::MissingLength {
                    prefix: prefix.clone(),
                });
            }
        }

        Ok(())
    }

    /// Base directories for `prefix`, joined to `root`.
    pub fn base_dirs_for(&self, prefix: &str) -> Option<Vec<PathBuf>> {
        self.prefix_dirs
            .get(prefix)
            .map(|dirs| dirs.iter().map(|dir| self.join_root(dir)).collect())
    }

    /// Directory of the manifest this table came from, if loaded from a file
    pub fn manifest_dir(&self) -> Option<&Path> {
        self.manifest_dir.as_deref()
    }

    fn join_root(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            return dir.to_path_buf();
        }

        match (&self.manifest_dir, &self.root) {
            (Some(base), Some(root)) => base.join(root).join(dir),
            (Some(base), None) => base.join(dir),
            (None, Some(root)) => root.join(dir),
            (None, None) => dir.to_path_buf(),
        }
    }
}

fn declares(lengths: &BTreeMap<String, BTreeMap<String, usize>>, prefix: &str) -> bool {
    prefix
        .chars()
        .next()
        .and_then(|first| lengths.get(&first.to_string()))
        .is_some_and(|bucket| bucket.contains_key(prefix))
}

/// Extension must be a single plain file-name suffix without the dot
fn is_valid_extension(extension: &str) -> bool {
    if extension.is_empty() || extension.starts_with('.') {
        return false;
    }

    let mut components = Path::new(extension).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = r#"{
        "root": "..",
        "prefixLengths": {
            "D": { "Dkan\\Datastore\\": 15 }
        },
        "prefixDirs": {
            "Dkan\\Datastore\\": ["fmizzell/datastore/src"]
        }
    }"#;

    #[test]
    fn test_parse_generated_manifest() {
        let config = AutoloadConfig::from_str(GENERATED).unwrap();
        assert_eq!(config.separator, "\\");
        assert_eq!(config.extension, "php");
        assert_eq!(config.root, Some(PathBuf::from("..")));
        assert_eq!(
            config.base_dirs_for("Dkan\\Datastore\\").unwrap(),
            vec![PathBuf::from("../fmizzell/datastore/src")]
        );
    }

    #[test]
    fn test_length_table_must_agree() {
        let json = r#"{
            "prefixLengths": { "D": { "Dkan\\Datastore\\": 14 } },
            "prefixDirs": { "Dkan\\Datastore\\": ["src"] }
        }"#;
        assert!(matches!(
            AutoloadConfig::from_str(json),
            Err(ConfigError::LengthMismatch {
                declared: 14,
                actual: 15,
                ..
            })
        ));
    }

    #[test]
    fn test_length_table_bucket_and_coverage() {
        let wrong_bucket = r#"{
            "prefixLengths": { "X": { "Dkan\\": 5 } },
            "prefixDirs": { "Dkan\\": ["src"] }
        }"#;
        assert!(matches!(
            AutoloadConfig::from_str(wrong_bucket),
            Err(ConfigError::BucketMismatch { .. })
        ));

        let unknown = r#"{
            "prefixLengths": { "D": { "Dkan\\": 5, "Drupal\\": 7 } },
            "prefixDirs": { "Dkan\\": ["src"] }
        }"#;
        assert!(matches!(
            AutoloadConfig::from_str(unknown),
            Err(ConfigError::UnknownPrefix { .. })
        ));

        let missing = r#"{
            "prefixLengths": { "D": { "Dkan\\": 5 } },
            "prefixDirs": { "Dkan\\": ["src"], "Acme\\": ["lib"] }
        }"#;
        match AutoloadConfig::from_str(missing) {
            Err(ConfigError::MissingLength { prefix }) => assert_eq!(prefix, "Acme\\"),
            other => panic!("expected missing length, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_directories_rejected() {
        let json = r#"{ "prefixDirs": { "Dkan\\": [] } }"#;
        assert!(matches!(
            AutoloadConfig::from_str(json),
            Err(ConfigError::EmptyDirectories { .. })
        ));
    }

    #[test]
    fn test_prefix_must_end_with_separator() {
        let config = AutoloadConfig::from_pairs([("Widgets", ["src"])]).with_separator("::");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingTrailingSeparator { .. })
        ));
    }

    #[test]
    fn test_extension_validation() {
        assert!(is_valid_extension("php"));
        assert!(is_valid_extension("d.ts"));
        assert!(!is_valid_extension(""));
        assert!(!is_valid_extension(".php"));
        assert!(!is_valid_extension("a/b"));
        assert!(!is_valid_extension(".."));

        let config = AutoloadConfig::new().with_extension("");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExtension(_))
        ));
        let config = AutoloadConfig::new().with_separator("");
        assert!(matches!(config.validate(), Err(ConfigError::EmptySeparator)));
    }

    #[test]
    fn test_add_prefix_merges_directories() {
        let mut config = AutoloadConfig::from_pairs([("Acme\\", ["a", "b"])]);
        config.add_prefix("Acme\\", ["c", "a"], false);
        config.add_prefix("Acme\\", ["z"], true);

        assert_eq!(
            config.prefix_dirs["Acme\\"],
            vec![
                PathBuf::from("z"),
                PathBuf::from("a"),
                PathBuf::from("b"),
                PathBuf::from("c")
            ]
        );
    }

    #[test]
    fn test_add_prefix_keeps_lengths_in_sync() {
        let mut config = AutoloadConfig::from_pairs([("Acme\\", ["src"])]);
        config.generate_prefix_lengths();
        config.add_prefix("Beta\\", ["lib"], false);

        let lengths = config.prefix_lengths.as_ref().unwrap();
        assert_eq!(lengths["A"]["Acme\\"], 5);
        assert_eq!(lengths["B"]["Beta\\"], 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absolute_dirs_ignore_root() {
        let config = AutoloadConfig::from_pairs([("Acme\\", ["/opt/acme/src", "rel"])])
            .with_root("/vendor");
        assert_eq!(
            config.base_dirs_for("Acme\\").unwrap(),
            vec![PathBuf::from("/opt/acme/src"), PathBuf::from("/vendor/rel")]
        );
        assert_eq!(config.base_dirs_for("Other\\"), None);
    }

    #[test]
    fn test_serialize_roundtrip_keeps_tables() {
        let mut config = AutoloadConfig::from_pairs([("Dkan\\Datastore\\", ["src"])]);
        config.generate_prefix_lengths();
        let json = config.to_string_pretty().unwrap();
        assert!(json.contains("prefixLengths"));
        assert!(json.contains("prefixDirs"));
        assert!(!json.contains("\"root\""));

        let parsed = AutoloadConfig::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
