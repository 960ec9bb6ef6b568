//! Content-addressed result cache.
//!
//! One pretty-printed JSON record per query lives in the cache directory,
//! named by the SHA-256 hex digest of the exact query text. A bounded
//! [`moka`] cache fronts the directory so repeated reads in one process
//! skip the filesystem.
//!
//! Freshness is enforced only by [`ResultCache::sweep`], which runs when the
//! cache is opened: reads never check age, so an entry written before the
//! sweep stays readable for the rest of the process.
//!
//! Two distinct queries with the same digest would share a record. The
//! stored `query` field is informational and is not compared on read.
//! Concurrent writers of one key race; the last write wins.

use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SearchError;
use crate::types::ResultSet;

/// Maximum number of records held in the in-process layer.
const MAX_MEMO_ENTRIES: u64 = 256;

const RECORD_EXTENSION: &str = "json";

/// One cached query and its merged results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The original query text.
    pub query: String,
    /// Fetch time in seconds since the Unix epoch.
    pub timestamp: f64,
    /// The merged, deduplicated result lines.
    pub results: ResultSet,
}

impl CacheEntry {
    /// Creation time as a UTC datetime, if the timestamp is representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.timestamp * 1000.0) as i64)
    }
}

/// Persistent per-query result cache.
pub struct ResultCache {
    dir: PathBuf,
    memo: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("dir", &self.dir)
            .field("memo_entries", &self.memo.entry_count())
            .finish()
    }
}

impl ResultCache {
    /// Open the cache directory and sweep records older than `max_age`.
    ///
    /// Creates the directory if needed. The sweep runs synchronously before
    /// this returns, so no search can observe an expired record.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the directory cannot be created or
    /// listed.
    pub fn open(dir: impl Into<PathBuf>, max_age: Duration) -> Result<Self, SearchError> {
        let cache = Self::open_without_sweep(dir)?;
        let removed = cache.sweep(max_age)?;
        tracing::info!(
            dir = %cache.dir.display(),
            removed,
            max_age_secs = max_age.as_secs(),
            "result cache opened"
        );
        Ok(cache)
    }

    /// Open the cache directory without sweeping.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the directory cannot be created.
    pub fn open_without_sweep(dir: impl Into<PathBuf>) -> Result<Self, SearchError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            SearchError::Cache(format!(
                "failed to create cache dir {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self {
            dir,
            memo: Cache::builder().max_capacity(MAX_MEMO_ENTRIES).build(),
        })
    }

    /// The directory holding the cache records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic digest of the exact query text.
    pub fn cache_key(query: &str) -> String {
        format!("{:x}", Sha256::digest(query.as_bytes()))
    }

    /// Path of the record for `query`.
    pub fn entry_path(&self, query: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{RECORD_EXTENSION}", Self::cache_key(query)))
    }

    /// Look up the record for `query`.
    ///
    /// Age is not checked here. Unreadable or corrupt records count as a miss.
    pub async fn get(&self, query: &str) -> Option<CacheEntry> {
        let key = Self::cache_key(query);
        if let Some(entry) = self.memo.get(&key).await {
            return Some(entry);
        }

        let path = self.entry_path(query);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache record unreadable");
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&raw) {
            Ok(entry) => {
                self.memo.insert(key, entry.clone()).await;
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache record corrupt");
                None
            }
        }
    }

    /// Write (or overwrite) the record for `query`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the record cannot be serialised or
    /// written.
    pub async fn put(&self, query: &str, results: ResultSet) -> Result<CacheEntry, SearchError> {
        let entry = CacheEntry {
            query: query.to_owned(),
            timestamp: unix_seconds(Utc::now()),
            results,
        };
        self.write_entry(&entry).await?;
        Ok(entry)
    }

    /// Write a fully-formed record, keeping its timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the record cannot be serialised or
    /// written.
    pub async fn write_entry(&self, entry: &CacheEntry) -> Result<(), SearchError> {
        let path = self.entry_path(&entry.query);
        let body = serde_json::to_vec_pretty(entry)
            .map_err(|e| SearchError::Cache(format!("failed to encode cache record: {e}")))?;
        tokio::fs::write(&path, body).await.map_err(|e| {
            SearchError::Cache(format!(
                "failed to write cache record {}: {e}",
                path.display()
            ))
        })?;
        self.memo
            .insert(Self::cache_key(&entry.query), entry.clone())
            .await;
        tracing::debug!(path = %path.display(), results = entry.results.len(), "cache record written");
        Ok(())
    }

    /// Delete every record older than `max_age`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the directory cannot be listed.
    pub fn sweep(&self, max_age: Duration) -> Result<usize, SearchError> {
        self.sweep_at(max_age, Utc::now())
    }

    /// [`sweep`](Self::sweep) against an explicit clock.
    ///
    /// A record's age comes from its `timestamp` field. Records that cannot
    /// be parsed fall back to the file modification time.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the directory cannot be listed.
    pub fn sweep_at(&self, max_age: Duration, now: DateTime<Utc>) -> Result<usize, SearchError> {
        let cutoff = unix_seconds(now) - max_age.as_secs_f64();
        let mut removed = 0;

        for path in self.record_paths()? {
            let Some(created) = record_timestamp(&path) else {
                tracing::warn!(path = %path.display(), "cache record has no usable timestamp");
                continue;
            };
            if created >= cutoff {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove expired record");
                }
            }
        }

        self.memo.invalidate_all();
        if removed > 0 {
            tracing::debug!(removed, "expired cache records swept");
        }
        Ok(removed)
    }

    /// Delete every record regardless of age. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the directory cannot be listed.
    pub fn clear(&self) -> Result<usize, SearchError> {
        let mut removed = 0;
        for path in self.record_paths()? {
            if std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        self.memo.invalidate_all();
        Ok(removed)
    }

    fn record_paths(&self) -> Result<Vec<PathBuf>, SearchError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            SearchError::Cache(format!(
                "failed to list cache dir {}: {e}",
                self.dir.display()
            ))
        })?;
        Ok(entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXTENSION)
            })
            .collect())
    }
}

fn unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

fn record_timestamp(path: &Path) -> Option<f64> {
    let parsed = std::fs::read(path)
        .ok()
        .and_then(|raw| serde_json::from_slice::<CacheEntry>(&raw).ok());
    if let Some(entry) = parsed {
        return Some(entry.timestamp);
    }
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map(|since| since.as_secs_f64())
}
