//! Keeps the most recently fetched worksheet in memory so that re-rendering does not refetch it.

use crate::model::Transactions;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

/// How long a fetched worksheet is served from memory when nothing else is configured.
pub const DEFAULT_TTL_MINUTES: u32 = 10;

/// Identifies a fetch. The `refresh` counter belongs to the caller: bumping it makes the next
/// lookup miss, which forces a refetch.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CacheKey {
    worksheet: String,
    refresh: u64,
}

impl CacheKey {
    pub fn new(worksheet: impl Into<String>, refresh: u64) -> Self {
        Self {
            worksheet: worksheet.into(),
            refresh,
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    pub fn refresh(&self) -> u64 {
        self.refresh
    }
}

#[derive(Debug, Clone)]
struct Entry {
    key: CacheKey,
    fetched_at: DateTime<Utc>,
    transactions: Transactions,
}

/// A single-entry cache with a time-to-live.
#[derive(Debug, Clone)]
pub struct DataCache {
    ttl: Duration,
    entry: Option<Entry>,
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MINUTES)
    }
}

impl DataCache {
    pub fn new(ttl_minutes: u32) -> Self {
        Self {
            ttl: Duration::minutes(i64::from(ttl_minutes)),
            entry: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached transactions if they were stored under `key` less than one TTL before
    /// `now`.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&Transactions> {
        let entry = self.entry.as_ref()?;
        if &entry.key != key {
            trace!("Cache miss for {key:?}, holding {:?}", entry.key);
            return None;
        }
        let age = now - entry.fetched_at;
        if age >= self.ttl {
            debug!(
                "Cached '{}' expired after {} seconds",
                key.worksheet(),
                age.num_seconds()
            );
            return None;
        }
        Some(&entry.transactions)
    }

    /// Stores `transactions` under `key`, replacing whatever was held before.
    pub fn insert(&mut self, key: CacheKey, transactions: Transactions, now: DateTime<Utc>) {
        self.entry = Some(Entry {
            key,
            fetched_at: now,
            transactions,
        });
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
