//! A file-backed cache for the downloaded expense table.
//!
//! The entry is stored as `{ "fetched_at": ..., "value": ... }` in the cache directory and is
//! used until it is older than the configured TTL or is cleared.

use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const TABLE_JSON: &str = "table.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<T> {
    fetched_at: DateTime<Utc>,
    value: T,
}

/// A single cached value with a time-to-live.
#[derive(Debug, Clone)]
pub struct Cache {
    path: PathBuf,
    ttl: Duration,
}

impl Cache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// The cache for the expense table of this configuration.
    pub fn for_table(config: &Config) -> Self {
        Self::new(config.cache_dir().join(TABLE_JSON), config.cache_ttl())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached value if there is one that was fetched less than the TTL before `now`.
    /// A cache file that cannot be read is treated as absent.
    pub async fn get<T>(&self, now: DateTime<Utc>) -> Option<T>
    where
        T: DeserializeOwned,
    {
        if !self.path.is_file() {
            return None;
        }
        let entry: CacheEntry<T> = match utils::deserialize(&self.path).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache file: {e:#}");
                return None;
            }
        };
        let age = now.signed_duration_since(entry.fetched_at).to_std().ok()?;
        if age < self.ttl {
            debug!("Using cached data fetched {}s ago", age.as_secs());
            Some(entry.value)
        } else {
            debug!("Cached data expired {}s ago", (age - self.ttl).as_secs());
            None
        }
    }

    /// Stores `value` as fetched at `now`.
    pub async fn put<T>(&self, value: &T, now: DateTime<Utc>) -> Result<()>
    where
        T: Serialize,
    {
        let entry = CacheEntry {
            fetched_at: now,
            value,
        };
        let json = serde_json::to_string(&entry).context("Unable to serialize the cache entry")?;
        utils::write(&self.path, json).await
    }

    /// Removes the cached value. Returns `false` if nothing was cached.
    pub async fn clear(&self) -> Result<bool> {
        utils::remove_file(&self.path).await
    }
}
