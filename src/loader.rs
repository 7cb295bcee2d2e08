//! Gets the transactions a report is built from, either from the configured sheet through the
//! in-memory cache or from the local snapshot.

use crate::api::{self, Mode, Sheet};
use crate::cache::{CacheKey, DataCache};
use crate::model::Transactions;
use crate::snapshot::Snapshot;
use crate::{Config, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info};

enum Source {
    Sheet(Box<dyn Sheet + Send>),
    Snapshot(PathBuf),
}

/// Owns the data source, the cache and the refresh counter that keys it.
pub struct Loader {
    source: Source,
    worksheet: String,
    columns: Option<Vec<usize>>,
    cache: DataCache,
    refresh: u64,
}

impl Loader {
    /// Reads from the sheet configured in `config`, or from its snapshot when `offline` is set.
    pub async fn from_config(config: &Config, mode: Mode, offline: bool) -> Result<Self> {
        let source = if offline {
            Source::Snapshot(config.snapshot_path())
        } else {
            Source::Sheet(api::sheet(config, mode).await?)
        };
        Ok(Self {
            source,
            worksheet: config.worksheet().to_string(),
            columns: config.columns().map(<[usize]>::to_vec),
            cache: DataCache::new(config.cache_ttl_minutes()),
            refresh: 0,
        })
    }

    /// Reads `worksheet` from `sheet`, keeping `columns` when given.
    pub fn new(
        sheet: Box<dyn Sheet + Send>,
        worksheet: impl Into<String>,
        columns: Option<&[usize]>,
        cache: DataCache,
    ) -> Self {
        Self {
            source: Source::Sheet(sheet),
            worksheet: worksheet.into(),
            columns: columns.map(<[usize]>::to_vec),
            cache,
            refresh: 0,
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.source, Source::Snapshot(_))
    }

    /// The current value of the refresh counter.
    pub fn refresh_count(&self) -> u64 {
        self.refresh
    }

    /// Bumps the refresh counter so that the next `load` misses the cache.
    pub fn refresh(&mut self) -> u64 {
        self.refresh += 1;
        debug!("Refresh counter is now {}", self.refresh);
        self.refresh
    }

    /// Returns the cached transactions while they are fresh and fetches them otherwise.
    pub async fn load(&mut self, now: DateTime<Utc>) -> Result<Transactions> {
        let key = CacheKey::new(self.worksheet.as_str(), self.refresh);
        if let Some(transactions) = self.cache.get(&key, now) {
            debug!("Serving '{}' from the cache", self.worksheet);
            return Ok(transactions.clone());
        }

        let transactions = match &mut self.source {
            Source::Sheet(sheet) => {
                info!("Fetching '{}'", self.worksheet);
                api::fetch_transactions(sheet.as_mut(), &self.worksheet, self.columns.as_deref())
                    .await?
            }
            Source::Snapshot(path) => {
                info!("Reading the snapshot at {}", path.display());
                Snapshot::load(path.as_path()).await?
            }
        };
        self.cache.insert(key, transactions.clone(), now);
        Ok(transactions)
    }
}
