//! Package version resolution
//!
//! Generation asks a `VersionSource` for every dependency it writes into a
//! manifest. The live implementation is `VersionResolver`, which layers a
//! persistent cache and registry lookups over a bundled fallback table;
//! `PinnedVersions` freezes one set of answers so a generation run is
//! reproducible.

mod fallback;
mod fetcher;
mod range;
mod resolver;
mod store;

pub use fallback::{bundled_names, fallback_version};
pub use fetcher::{registry_url, FetchError, HttpFetcher, JsonFetcher};
pub use range::{caret_range, is_installable, parse_version, LATEST};
pub use resolver::{ResolverOptions, VersionResolver, FETCH_TIMEOUT, REFRESH_WINDOW};
pub use store::{CacheRecord, JsonFileStore, KeyValueStore, MemoryStore, StoreError, CACHE_KEY};

use std::collections::BTreeMap;

/// Answers "which version range should this package get?"
pub trait VersionSource {
    fn version(&self, name: &str) -> String;
}

/// A fixed set of answers
///
/// Names it was not given resolve through the bundled table, then `latest`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedVersions {
    versions: BTreeMap<String, String>,
}

impl PinnedVersions {
    pub fn new(versions: BTreeMap<String, String>) -> Self {
        Self { versions }
    }

    /// Only the bundled table; fully offline and deterministic
    pub fn bundled() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, version: &str) -> Self {
        self.versions.insert(name.to_string(), version.to_string());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.versions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl VersionSource for PinnedVersions {
    fn version(&self, name: &str) -> String {
        self.versions
            .get(name)
            .cloned()
            .unwrap_or_else(|| resolver::offline_version(name))
    }
}

impl<T: VersionSource + ?Sized> VersionSource for &T {
    fn version(&self, name: &str) -> String {
        (**self).version(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_versions_fall_back() {
        let pinned = PinnedVersions::bundled().with("express", "^5.0.0");
        assert_eq!(pinned.version("express"), "^5.0.0");
        assert_eq!(pinned.version("cors"), "^2.8.5");
        assert_eq!(pinned.version("no-such-package"), LATEST);
    }

    #[test]
    fn test_every_bundled_name_resolves_offline_to_a_valid_range() {
        let pinned = PinnedVersions::bundled();
        for name in bundled_names() {
            let version = pinned.version(name);
            assert!(is_installable(&version), "{} -> {}", name, version);
            assert_ne!(version, LATEST);
        }
    }
}
