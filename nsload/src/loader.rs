// Loader: prefix resolution plus probing, with a shared result cache

use crate::probe::{FsProbe, Probe};
use crate::resolver::PrefixResolver;
use dashmap::DashMap;
use log::trace;
use std::path::PathBuf;

/// Finds source files for symbols and remembers the answer.
///
/// Found files and confirmed misses are cached, keyed by the symbol with
/// its leading separator removed. Names that match no prefix are not
/// cached: they belong to some other loader and are answered without
/// touching the probe. Entries live until `clear_cache`. The loader is
/// `Send + Sync`; share it through an `Arc`.
pub struct Loader<P = FsProbe> {
    resolver: PrefixResolver,
    probe: P,
    /// Cache: symbol → located file (None for a confirmed miss)
    cache: DashMap<String, Option<PathBuf>>,
}

impl Loader<FsProbe> {
    /// Loader that checks the real filesystem
    pub fn with_fs(resolver: PrefixResolver) -> Self {
        Self::new(resolver, FsProbe)
    }
}

impl<P: Probe> Loader<P> {
    pub fn new(resolver: PrefixResolver, probe: P) -> Self {
        Self {
            resolver,
            probe,
            cache: DashMap::new(),
        }
    }

    /// Locate the file defining `symbol_name`.
    pub fn find_file(&self, symbol_name: &str) -> Option<PathBuf> {
        let key = self.resolver.normalize(symbol_name);

        if let Some(cached) = self.cache.get(key) {
            trace!("Cache hit for '{}'", key);
            return cached.value().clone();
        }

        let resolution = self.resolver.resolve(symbol_name)?;
        let found = resolution
            .into_candidates()
            .into_iter()
            .find(|candidate| self.probe.exists(candidate));

        self.cache.insert(key.to_string(), found.clone());
        found
    }

    /// Whether a previous lookup for `symbol_name` found nothing
    pub fn is_missing(&self, symbol_name: &str) -> bool {
        let key = self.resolver.normalize(symbol_name);
        self.cache
            .get(key)
            .is_some_and(|cached| cached.value().is_none())
    }

    pub fn is_cached(&self, symbol_name: &str) -> bool {
        self.cache
            .contains_key(self.resolver.normalize(symbol_name))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached answer, e.g. after files were installed.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn resolver(&self) -> &PrefixResolver {
        &self.resolver
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}
