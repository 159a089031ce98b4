// Prefix resolver: maps fully qualified symbol names to candidate source files

use crate::config::AutoloadConfig;
use crate::entry::PrefixEntry;
use crate::error::{ConfigError, Result};
use crate::probe::Probe;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Result of a successful prefix lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Prefix that matched the symbol
    pub prefix: String,
    /// Remainder of the symbol converted to a relative file path
    pub relative_path: PathBuf,
    /// `base_dir / relative_path` for every base directory, in search order
    pub candidates: Vec<PathBuf>,
}

impl Resolution {
    /// Candidate under the first base directory
    pub fn first(&self) -> Option<&Path> {
        self.candidates.first().map(PathBuf::as_path)
    }

    pub fn into_candidates(self) -> Vec<PathBuf> {
        self.candidates
    }
}

/// Immutable longest-prefix lookup table.
///
/// Entries are grouped by the first character of their prefix. Within a
/// group they are ordered longest first, so the first prefix that matches
/// a symbol is the most specific one.
#[derive(Debug, Clone)]
pub struct PrefixResolver {
    separator: String,
    extension: String,
    buckets: BTreeMap<char, Vec<PrefixEntry>>,
    len: usize,
}

impl PrefixResolver {
    /// Build a resolver from a validated table.
    ///
    /// # Errors
    /// Any [`ConfigError`] from [`AutoloadConfig::validate`] or from building
    /// an entry. No resolver is produced for a table with a single bad entry.
    pub fn new(config: &AutoloadConfig) -> Result<Self> {
        config.validate()?;

        let mut buckets: BTreeMap<char, Vec<PrefixEntry>> = BTreeMap::new();
        let mut len = 0;

        for prefix in config.prefix_dirs.keys() {
            let dirs = config
                .base_dirs_for(prefix)
                .ok_or_else(|| ConfigError::EmptyDirectories {
                    prefix: prefix.clone(),
                })?;
            let entry = PrefixEntry::new(prefix.clone(), dirs)?;

            buckets.entry(entry.bucket()).or_default().push(entry);
            len += 1;
        }

        for entries in buckets.values_mut() {
            entries.sort_by(|a, b| {
                b.prefix_length()
                    .cmp(&a.prefix_length())
                    .then_with(|| a.prefix().cmp(b.prefix()))
            });
        }

        debug!(
            "Built prefix resolver: {} prefixes in {} buckets",
            len,
            buckets.len()
        );

        Ok(Self {
            separator: config.separator.clone(),
            extension: config.extension.clone(),
            buckets,
            len,
        })
    }

    /// Resolve a symbol to its candidate files.
    ///
    /// Returns `None` when no prefix matches, or when the symbol does not
    /// name a file below its prefix (nothing after the prefix, empty
    /// segments, `.`/`..` or path separators inside a segment).
    pub fn resolve(&self, symbol_name: &str) -> Option<Resolution> {
        let symbol = self.normalize(symbol_name);

        let Some(entry) = self.longest_match(symbol) else {
            trace!("No prefix matches '{}'", symbol);
            return None;
        };

        let remainder = entry.strip(symbol)?;
        let Some(relative_path) = self.remainder_to_path(remainder) else {
            trace!(
                "'{}' matched '{}' but does not name a file",
                symbol,
                entry.prefix()
            );
            return None;
        };

        trace!("'{}' matched prefix '{}'", symbol, entry.prefix());

        let candidates = entry
            .base_directories()
            .iter()
            .map(|dir| dir.join(&relative_path))
            .collect();

        Some(Resolution {
            prefix: entry.prefix().to_string(),
            relative_path,
            candidates,
        })
    }

    /// Ordered candidate paths; empty when the symbol is unresolved.
    pub fn candidates(&self, symbol_name: &str) -> Vec<PathBuf> {
        self.resolve(symbol_name)
            .map(Resolution::into_candidates)
            .unwrap_or_default()
    }

    /// First candidate the probe reports as existing.
    pub fn find_file<P: Probe + ?Sized>(&self, symbol_name: &str, probe: &P) -> Option<PathBuf> {
        let found = self
            .resolve(symbol_name)?
            .into_candidates()
            .into_iter()
            .find(|candidate| probe.exists(candidate));

        if let Some(path) = &found {
            trace!("Found '{}' at {}", symbol_name, path.display());
        }
        found
    }

    /// Most specific registered prefix of `symbol`
    fn longest_match(&self, symbol: &str) -> Option<&PrefixEntry> {
        let first = symbol.chars().next()?;
        self.buckets
            .get(&first)?
            .iter()
            .find(|entry| entry.strip(symbol).is_some())
    }

    /// `Sub\Thing` -> `Sub/Thing.<ext>`
    fn remainder_to_path(&self, remainder: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = remainder.split(self.separator.as_str()).collect();
        let (last, parents) = segments.split_last()?;

        let mut path = PathBuf::new();
        for segment in parents {
            if !is_plain_segment(segment) {
                return None;
            }
            path.push(segment);
        }

        if !is_plain_segment(last) {
            return None;
        }
        path.push(format!("{}.{}", last, self.extension));

        Some(path)
    }

    /// Drop a single leading separator (`\Foo\Bar` names `Foo\Bar`)
    pub(crate) fn normalize<'a>(&self, symbol_name: &'a str) -> &'a str {
        symbol_name
            .strip_prefix(self.separator.as_str())
            .unwrap_or(symbol_name)
    }

    /// All entries, grouped by first character and longest first within a group
    pub fn entries(&self) -> impl Iterator<Item = &PrefixEntry> {
        self.buckets.values().flatten()
    }

    pub fn entry(&self, prefix: &str) -> Option<&PrefixEntry> {
        let first = prefix.chars().next()?;
        self.buckets
            .get(&first)?
            .iter()
            .find(|entry| entry.prefix() == prefix)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// A segment must map to exactly one ordinary path component
fn is_plain_segment(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }

    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == segment
    )
}
