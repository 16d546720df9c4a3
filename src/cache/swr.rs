//! Stale-while-revalidate cache in front of the product query service.

use std::sync::{Arc, Mutex};

use metrics::counter;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::application::error::QueryError;
use crate::application::pagination::ResultPage;
use crate::application::query::ProductQueryService;
use crate::domain::filters::FilterSpec;

use super::clock::{Clock, SystemClock};
use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::mutex_lock;
use super::store::{CacheTable, Lookup};

const SOURCE: &str = "cache::swr";

const METRIC_HIT: &str = "vetrina_cache_hit_total";
const METRIC_MISS: &str = "vetrina_cache_miss_total";
const METRIC_STALE: &str = "vetrina_cache_stale_total";
const METRIC_REVALIDATE: &str = "vetrina_cache_revalidate_total";
const METRIC_REVALIDATE_FAILED: &str = "vetrina_cache_revalidate_failed_total";

/// How a read was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Cache disabled: the backend answered directly.
    Bypass,
    Miss,
    Fresh,
    Stale,
}

/// A page together with the moment it was fetched from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Refreshed {
    pub data: ResultPage,
    pub fetched_at: OffsetDateTime,
}

/// A cached page as seen without touching the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub data: ResultPage,
    pub fetched_at: OffsetDateTime,
    pub fresh: bool,
}

/// Outcome of [`ProductCache::read`].
#[derive(Debug)]
pub struct CacheRead {
    pub data: ResultPage,
    pub status: CacheStatus,
    /// The background refresh scheduled by this read, if it claimed one.
    pub revalidation: Option<JoinHandle<()>>,
}

/// Process-wide product list cache. Cloning shares the table.
#[derive(Clone)]
pub struct ProductCache {
    inner: Arc<Inner>,
}

struct Inner {
    config: CacheConfig,
    service: Arc<ProductQueryService>,
    clock: Arc<dyn Clock>,
    table: Mutex<CacheTable>,
}

impl ProductCache {
    pub fn new(config: CacheConfig, service: Arc<ProductQueryService>) -> Self {
        Self::with_clock(config, service, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: CacheConfig,
        service: Arc<ProductQueryService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                service,
                clock,
                table: Mutex::new(CacheTable::new()),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn service(&self) -> &Arc<ProductQueryService> {
        &self.inner.service
    }

    pub fn now(&self) -> OffsetDateTime {
        self.inner.clock.now()
    }

    /// Return the page for `filters`, fetching only on a miss.
    pub async fn get(&self, filters: &FilterSpec) -> Result<ResultPage, QueryError> {
        self.read(filters).await.map(|read| read.data)
    }

    /// Like [`ProductCache::get`], but also reports how the read was answered
    /// and hands back the background refresh it scheduled.
    #[instrument(skip(self, filters), fields(cache_key = %filters))]
    pub async fn read(&self, filters: &FilterSpec) -> Result<CacheRead, QueryError> {
        if !self.inner.config.enabled {
            let data = self.inner.service.query(filters).await?;
            return Ok(CacheRead {
                data,
                status: CacheStatus::Bypass,
                revalidation: None,
            });
        }

        let key = CacheKey::for_filters(filters);
        let lookup = {
            let mut table = mutex_lock(&self.inner.table, SOURCE, "read");
            table.lookup(&key, self.now(), self.inner.config.duration())
        };

        match lookup {
            Lookup::Miss => {
                counter!(METRIC_MISS).increment(1);
                debug!("Cache miss, fetching in foreground");
                let refreshed = self.refresh(filters).await?;
                Ok(CacheRead {
                    data: refreshed.data,
                    status: CacheStatus::Miss,
                    revalidation: None,
                })
            }
            Lookup::Fresh { data, .. } => {
                counter!(METRIC_HIT).increment(1);
                Ok(CacheRead {
                    data,
                    status: CacheStatus::Fresh,
                    revalidation: None,
                })
            }
            Lookup::Stale {
                data,
                fetched_at,
                claim,
            } => {
                counter!(METRIC_STALE).increment(1);
                debug!(%fetched_at, claimed = claim.is_some(), "Serving stale entry");
                let revalidation = claim
                    .map(|generation| self.spawn_revalidation(key, generation, filters.clone()));
                Ok(CacheRead {
                    data,
                    status: CacheStatus::Stale,
                    revalidation,
                })
            }
        }
    }

    /// Fetch in the foreground and store the result. Errors propagate and
    /// leave any existing entry untouched.
    pub async fn refresh(&self, filters: &FilterSpec) -> Result<Refreshed, QueryError> {
        let data = self.inner.service.query(filters).await?;
        let fetched_at = self.now();
        if self.inner.config.enabled {
            let mut table = mutex_lock(&self.inner.table, SOURCE, "refresh");
            table.insert(CacheKey::for_filters(filters), data.clone(), fetched_at);
        }
        Ok(Refreshed { data, fetched_at })
    }

    /// Refresh an existing entry regardless of its age, honouring the
    /// one-refresh-per-key claim.
    ///
    /// Returns `Ok(None)` when the key is not cached, a refresh is already
    /// in flight, or the entry was invalidated before the refresh landed. On
    /// failure the stale data stays and the claim is released.
    pub async fn revalidate(&self, filters: &FilterSpec) -> Result<Option<Refreshed>, QueryError> {
        let key = CacheKey::for_filters(filters);
        let claim = {
            let mut table = mutex_lock(&self.inner.table, SOURCE, "revalidate");
            table.claim_refresh(&key)
        };
        let Some(generation) = claim else {
            debug!(%key, "Revalidation skipped, nothing to claim");
            return Ok(None);
        };
        self.run_revalidation(&key, generation, filters).await
    }

    fn spawn_revalidation(
        &self,
        key: CacheKey,
        generation: u64,
        filters: FilterSpec,
    ) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            // Failures are logged and counted inside; no reader is waiting.
            let _ = cache.run_revalidation(&key, generation, &filters).await;
        })
    }

    /// Only the entry generation that was claimed may be updated or released.
    async fn run_revalidation(
        &self,
        key: &CacheKey,
        generation: u64,
        filters: &FilterSpec,
    ) -> Result<Option<Refreshed>, QueryError> {
        counter!(METRIC_REVALIDATE).increment(1);
        match self.inner.service.query(filters).await {
            Ok(data) => {
                let fetched_at = self.now();
                let applied = {
                    let mut table = mutex_lock(&self.inner.table, SOURCE, "complete_refresh");
                    table.complete_refresh(key, generation, data.clone(), fetched_at)
                };
                if !applied {
                    debug!(%key, generation, "Entry invalidated during revalidation, result dropped");
                    return Ok(None);
                }
                info!(%key, generation, count = data.count, "Cache entry revalidated");
                Ok(Some(Refreshed { data, fetched_at }))
            }
            Err(err) => {
                mutex_lock(&self.inner.table, SOURCE, "release").release(key, generation);
                counter!(METRIC_REVALIDATE_FAILED).increment(1);
                warn!(%key, error = %err, "Background revalidation failed, keeping stale data");
                Err(err)
            }
        }
    }

    /// Inspect the entry for `filters` without fetching or claiming anything.
    pub fn peek(&self, filters: &FilterSpec) -> Option<CachedPage> {
        let key = CacheKey::for_filters(filters);
        let now = self.now();
        let table = mutex_lock(&self.inner.table, SOURCE, "peek");
        table.get(&key).map(|entry| CachedPage {
            data: entry.data.clone(),
            fetched_at: entry.fetched_at,
            fresh: entry.is_fresh(now, self.inner.config.duration()),
        })
    }

    pub fn cached_at(&self, filters: &FilterSpec) -> Option<OffsetDateTime> {
        let key = CacheKey::for_filters(filters);
        mutex_lock(&self.inner.table, SOURCE, "cached_at")
            .get(&key)
            .map(|entry| entry.fetched_at)
    }

    /// Whether a background refresh for `filters` is currently in flight.
    pub fn is_refetching(&self, filters: &FilterSpec) -> bool {
        let key = CacheKey::for_filters(filters);
        mutex_lock(&self.inner.table, SOURCE, "is_refetching")
            .get(&key)
            .is_some_and(|entry| entry.refetching)
    }

    /// Drop the entry for `filters`. Returns whether one existed.
    pub fn invalidate(&self, filters: &FilterSpec) -> bool {
        let key = CacheKey::for_filters(filters);
        let removed = mutex_lock(&self.inner.table, SOURCE, "invalidate")
            .remove(&key)
            .is_some();
        debug!(%key, removed, "Cache entry invalidated");
        removed
    }

    pub fn clear(&self) {
        let mut table = mutex_lock(&self.inner.table, SOURCE, "clear");
        let dropped = table.len();
        table.clear();
        info!(dropped, "Product cache cleared");
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.inner.table, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
