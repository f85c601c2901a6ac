//! Time-bounded catalog cache
//!
//! [`CachedCatalog`] implements [`ReferenceCatalog`] on top of any
//! [`CatalogFetcher`]. Entries are keyed by source (and prefecture/city for
//! town lists) and expire after the configured TTL. A TTL of zero disables
//! cache hits: every read refetches and overwrites the stored entry.
//!
//! Fetch failures are retried while transient, then logged and reported to
//! the engine as an empty table; failures are never cached.

use crate::fetcher::{CatalogFetcher, SourceFetcher};
use crate::retry::retry_transient;
use crate::source::CatalogSource;
use crate::FetchError;
use async_trait::async_trait;
use jpaddr_common::config::ResolvedConfig;
use jpaddr_common::{PrefectureTable, ReferenceCatalog, TownRecord};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default upper bound on retrying a transient failure
pub const DEFAULT_MAX_RETRY_WAIT: Duration = Duration::from_millis(2000);

#[derive(Debug)]
struct CacheEntry<T> {
    value: Arc<T>,
    stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: Arc<T>) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    fn fresh(&self, ttl: Duration) -> Option<Arc<T>> {
        (!ttl.is_zero() && self.stored_at.elapsed() < ttl).then(|| Arc::clone(&self.value))
    }
}

type TownKey = (String, String, String);

/// Reference catalog backed by a fetcher, with TTL caching
pub struct CachedCatalog<F> {
    fetcher: F,
    source: CatalogSource,
    ttl: RwLock<Duration>,
    max_retry_wait: Duration,
    prefectures: RwLock<HashMap<String, CacheEntry<PrefectureTable>>>,
    towns: RwLock<HashMap<TownKey, CacheEntry<Vec<TownRecord>>>>,
}

impl CachedCatalog<SourceFetcher> {
    /// Catalog for the configured endpoint, timeout, TTL and retry limit
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, FetchError> {
        let source = CatalogSource::parse(&config.endpoint)?;
        let fetcher = SourceFetcher::with_timeout(config.request_timeout)?;
        Ok(Self::new(fetcher, source, config.cache_ttl).with_max_retry_wait(config.max_retry_wait))
    }
}

impl<F: CatalogFetcher> CachedCatalog<F> {
    pub fn new(fetcher: F, source: CatalogSource, ttl: Duration) -> Self {
        Self {
            fetcher,
            source,
            ttl: RwLock::new(ttl),
            max_retry_wait: DEFAULT_MAX_RETRY_WAIT,
            prefectures: RwLock::new(HashMap::new()),
            towns: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_max_retry_wait(mut self, max_retry_wait: Duration) -> Self {
        self.max_retry_wait = max_retry_wait;
        self
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn time_to_live(&self) -> Duration {
        *self.ttl.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the TTL; every cached entry is dropped before this returns
    pub fn set_time_to_live(&self, ttl: Duration) {
        *self.ttl.write().unwrap_or_else(PoisonError::into_inner) = ttl;
        self.clear();
        debug!(ttl_secs = ttl.as_secs(), "Catalog cache TTL changed, entries cleared");
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.prefectures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.towns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached entries (prefecture tables plus town lists)
    pub fn cached_entries(&self) -> usize {
        let prefectures = self.prefectures.read().unwrap_or_else(PoisonError::into_inner).len();
        let towns = self.towns.read().unwrap_or_else(PoisonError::into_inner).len();
        prefectures + towns
    }

    fn source_key(&self) -> String {
        self.source.to_string()
    }
}

#[async_trait]
impl<F: CatalogFetcher> ReferenceCatalog for CachedCatalog<F> {
    async fn prefecture_table(&self) -> Arc<PrefectureTable> {
        let key = self.source_key();
        let ttl = self.time_to_live();

        if let Some(hit) = self
            .prefectures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .and_then(|entry| entry.fresh(ttl))
        {
            return hit;
        }

        let fetched = retry_transient("prefecture table", self.max_retry_wait, || {
            self.fetcher.fetch_prefecture_table(&self.source)
        })
        .await;

        match fetched {
            Ok(table) => {
                let table = Arc::new(table);
                self.prefectures
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, CacheEntry::new(Arc::clone(&table)));
                table
            }
            Err(e) => {
                warn!(source = %self.source, error = %e, "Prefecture table unavailable");
                Arc::new(PrefectureTable::new())
            }
        }
    }

    async fn towns(&self, prefecture: &str, city: &str) -> Arc<Vec<TownRecord>> {
        let key = (self.source_key(), prefecture.to_string(), city.to_string());
        let ttl = self.time_to_live();

        if let Some(hit) = self
            .towns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .and_then(|entry| entry.fresh(ttl))
        {
            return hit;
        }

        let fetched = retry_transient("town list", self.max_retry_wait, || {
            self.fetcher.fetch_towns(&self.source, prefecture, city)
        })
        .await;

        match fetched {
            Ok(towns) => {
                let towns = Arc::new(towns);
                self.towns
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, CacheEntry::new(Arc::clone(&towns)));
                towns
            }
            Err(e) => {
                warn!(
                    source = %self.source,
                    prefecture = %prefecture,
                    city = %city,
                    error = %e,
                    "Town list unavailable"
                );
                Arc::new(Vec::new())
            }
        }
    }
}
