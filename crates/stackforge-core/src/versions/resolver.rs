//! Tiered version resolution: fresh cache, registry, stale cache, bundled table

use super::fallback::{bundled_names, fallback_version};
use super::fetcher::{registry_url, FetchError, JsonFetcher};
use super::range::{caret_range, LATEST};
use super::store::{CacheRecord, KeyValueStore, StoreError, CACHE_KEY};
use super::{PinnedVersions, VersionSource};
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

/// How long a cache record counts as fresh
pub const REFRESH_WINDOW: Duration = Duration::from_secs(6 * 60 * 60);

/// Per-lookup registry timeout
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub registry: Url,
    pub refresh_window: Duration,
    pub fetch_timeout: Duration,
    /// Skip the registry tier entirely
    pub offline: bool,
}

impl ResolverOptions {
    pub fn new(registry: Url) -> Self {
        Self {
            registry,
            refresh_window: REFRESH_WINDOW,
            fetch_timeout: FETCH_TIMEOUT,
            offline: false,
        }
    }

    /// Defaults from the product config, with environment overrides applied
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.registry_url_env())
            .unwrap_or_else(|_| config.default_registry_url().to_string());
        let registry =
            Url::parse(&url_str).with_context(|| format!("Invalid registry URL: {}", url_str))?;
        let mut options = Self::new(registry);
        options.offline = std::env::var_os(config.offline_env()).is_some();
        Ok(options)
    }
}

/// Resolves package names to installable version ranges
///
/// Never fails: every lookup ends at the bundled table or `latest`.
pub struct VersionResolver<S, F> {
    store: S,
    fetcher: F,
    options: ResolverOptions,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl<S: KeyValueStore, F: JsonFetcher> VersionResolver<S, F> {
    pub fn new(store: S, fetcher: F, options: ResolverOptions) -> Self {
        Self {
            store,
            fetcher,
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Current cache contents
    pub fn cache(&self) -> CacheRecord {
        CacheRecord::load(&self.store)
    }

    fn fresh_cache(&self) -> Option<CacheRecord> {
        let record = self.cache();
        let window = self.options.refresh_window.as_millis() as u64;
        record.is_fresh(now_millis(), window).then_some(record)
    }

    /// Cache (any age), then bundled table, then `latest`. No network.
    pub fn resolve_cached(&self, name: &str) -> String {
        self.cache()
            .versions
            .get(name)
            .cloned()
            .unwrap_or_else(|| offline_version(name))
    }

    /// Fresh cache, then registry, then stale cache, then bundled table
    pub async fn resolve(&self, name: &str) -> String {
        self.resolve_many([name])
            .await
            .remove(name)
            .unwrap_or_else(|| self.resolve_cached(name))
    }

    /// Resolve many names concurrently
    ///
    /// Names missing from a fresh cache are looked up in parallel, each with
    /// its own timeout. A failed lookup only falls back for that name. All
    /// successful lookups are merged into the cache in a single write.
    pub async fn resolve_many<'a, I>(&self, names: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: BTreeSet<&str> = names.into_iter().collect();
        let mut resolved = BTreeMap::new();

        let mut pending = Vec::new();
        let fresh = self.fresh_cache();
        for name in &names {
            match fresh.as_ref().and_then(|record| record.versions.get(*name)) {
                Some(version) => {
                    resolved.insert(name.to_string(), version.clone());
                }
                None => pending.push(*name),
            }
        }

        if !pending.is_empty() {
            let fetched = self.fetch_all(&pending).await;
            resolved.extend(fetched);
        }

        let stale = self.cache();
        for name in names {
            if !resolved.contains_key(name) {
                let version = stale
                    .versions
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| offline_version(name));
                resolved.insert(name.to_string(), version);
            }
        }

        resolved
    }

    /// Refresh every bundled package name from the registry
    ///
    /// Returns how many names got a live answer.
    pub async fn prefetch_common(&self) -> usize {
        let names: Vec<&str> = bundled_names().collect();
        self.fetch_all(&names).await.len()
    }

    /// Resolve `names` and pin the answers for one generation run
    pub async fn snapshot<'a, I>(&self, names: I) -> PinnedVersions
    where
        I: IntoIterator<Item = &'a str>,
    {
        PinnedVersions::new(self.resolve_many(names).await)
    }

    /// Drop every cached answer
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(CACHE_KEY)
    }

    /// Look `names` up in the registry and merge the successes into the cache
    async fn fetch_all(&self, names: &[&str]) -> BTreeMap<String, String> {
        if self.options.offline {
            log::debug!("Offline mode, skipping registry lookup");
            return BTreeMap::new();
        }

        let mut lookups = FuturesUnordered::new();
        for name in names {
            lookups.push(async move { (*name, self.fetch_one(name).await) });
        }

        let mut fetched = BTreeMap::new();
        while let Some((name, result)) = lookups.next().await {
            match result {
                Ok(version) => {
                    fetched.insert(name.to_string(), version);
                }
                Err(e) => log::debug!("Version lookup for {} failed: {}", name, e),
            }
        }

        if !fetched.is_empty() {
            let mut record = self.cache();
            record.versions.extend(fetched.clone());
            record.last_fetch = now_millis();
            if let Err(e) = record.save(&self.store) {
                log::warn!("Could not update version cache: {}", e);
            }
        }

        fetched
    }

    async fn fetch_one(&self, name: &str) -> Result<String, FetchError> {
        let url = registry_url(&self.options.registry, name)?;
        let timeout = self.options.fetch_timeout;

        let body = tokio::time::timeout(timeout, self.fetcher.fetch_json(&url, timeout))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.clone(),
                timeout,
            })??;

        body.get("version")
            .and_then(|v| v.as_str())
            .and_then(caret_range)
            .ok_or_else(|| FetchError::Decode {
                url,
                message: "missing or invalid \"version\" field".to_string(),
            })
    }
}

impl<S: KeyValueStore, F: JsonFetcher> VersionSource for VersionResolver<S, F> {
    fn version(&self, name: &str) -> String {
        self.resolve_cached(name)
    }
}

/// Bundled table, then `latest`
pub(crate) fn offline_version(name: &str) -> String {
    fallback_version(name).unwrap_or(LATEST).to_string()
}
