//! Time-keyed cache in front of the price provider.
//!
//! Entries are keyed by `(ticker, start, end)` and expire a fixed TTL after
//! they were stored. Time always comes from a [`Clock`] passed in by the
//! caller, so expiry can be tested without waiting.

use crate::ticker::Ticker;
use crate::time_series::{DateRange, PriceProvider, PriceSeries};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lifetime of a cached price series, in seconds.
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: std::sync::Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A stored value and the time it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
}

/// Keyed store whose entries go stale `ttl` after insertion.
///
/// There is no size bound; stale entries are dropped by [`TtlCache::purge_expired`].
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            entries: HashMap::new(),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.ttl
    }

    /// Returns the value for `key` if it was stored less than `ttl` ago.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| &entry.value)
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    /// Drops every stale entry and returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| now - entry.stored_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity of one price query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: Ticker,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheKey {
    pub fn new(ticker: &Ticker, range: &DateRange) -> Self {
        CacheKey {
            ticker: ticker.clone(),
            start: range.start,
            end: range.end,
        }
    }
}

/// Counters reported by [`PriceCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CacheState {
    store: TtlCache<CacheKey, Arc<PriceSeries>>,
    in_flight: HashMap<CacheKey, Arc<Mutex<()>>>,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn lookup(&mut self, key: &CacheKey, now: DateTime<Utc>) -> Option<Arc<PriceSeries>> {
        let cached = self.store.get(key, now).cloned();
        if cached.is_some() {
            self.hits += 1;
        }
        cached
    }
}

/// Caching wrapper around a [`PriceProvider`].
///
/// A fresh entry is returned without touching the provider; otherwise the
/// provider is called and its result, empty or not, is stored with the
/// current time. Provider failures are logged and reported as an empty
/// series but are not stored, so the next request tries again.
///
/// The store lock is never held across a download. Each missing key gets its
/// own in-flight lock, so concurrent requests for the same key wait for the
/// first download while other keys are served as usual.
pub struct PriceCache<P> {
    provider: P,
    state: Mutex<CacheState>,
}

impl<P: PriceProvider> PriceCache<P> {
    /// Creates a cache with the default one-hour TTL.
    pub fn new(provider: P) -> Self {
        Self::with_ttl(provider, Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    pub fn with_ttl(provider: P, ttl: Duration) -> Self {
        PriceCache {
            provider,
            state: Mutex::new(CacheState {
                store: TtlCache::new(ttl),
                in_flight: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the series for `(ticker, range)`, downloading it on a miss.
    pub async fn fetch_cached(
        &self,
        ticker: &Ticker,
        range: &DateRange,
        now: DateTime<Utc>,
    ) -> Arc<PriceSeries> {
        let key = CacheKey::new(ticker, range);

        let key_lock = {
            let mut state = self.state.lock().await;
            if let Some(series) = state.lookup(&key, now) {
                tracing::debug!(%ticker, start = %range.start, end = %range.end, "price cache hit");
                return series;
            }
            Arc::clone(state.in_flight.entry(key.clone()).or_default())
        };

        let _downloading = key_lock.lock().await;

        {
            let mut state = self.state.lock().await;
            // Filled by the download we were waiting on.
            if let Some(series) = state.lookup(&key, now) {
                tracing::debug!(%ticker, start = %range.start, end = %range.end, "price cache hit after wait");
                return series;
            }
            state.misses += 1;
            let purged = state.store.purge_expired(now);
            tracing::debug!(%ticker, start = %range.start, end = %range.end, purged, "price cache miss");
        }

        let result = self.provider.fetch(ticker, range).await;

        let mut state = self.state.lock().await;
        state.in_flight.remove(&key);
        match result {
            Ok(series) => {
                let series = Arc::new(series);
                state.store.insert(key, Arc::clone(&series), now);
                series
            }
            Err(err) => {
                tracing::warn!(%ticker, error = %err, "price download failed");
                Arc::new(PriceSeries::empty())
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.store.len(),
        }
    }
}
