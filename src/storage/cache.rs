// src/storage/cache.rs

//! Short-lived post snapshot cache.
//!
//! The snapshot is advisory: every failure here is logged and reported as a
//! miss, and anything unreadable is deleted so the next write starts clean.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{CacheConfig, Post};
use crate::storage::KeyValueStore;

/// Serialized shape of the slot.
#[derive(Serialize)]
struct CacheEntry<'a> {
    data: &'a [Post],
    timestamp: i64,
}

/// Metadata about the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    /// Number of cached posts
    pub count: usize,
    /// When the snapshot was written
    pub written_at: DateTime<Utc>,
    /// Whether the snapshot is past its lifetime
    pub expired: bool,
}

/// Post snapshot cache over a key-value slot.
#[derive(Clone)]
pub struct PostCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    ttl: Duration,
}

impl PostCache {
    /// Create a cache over `store` using slot `key`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self::new(store, config.key.clone(), config.ttl())
    }

    /// Slot key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store a snapshot stamped with the current time.
    pub async fn set(&self, posts: &[Post]) {
        self.set_at(posts, Utc::now()).await
    }

    /// Store a snapshot stamped with `now`.
    pub async fn set_at(&self, posts: &[Post], now: DateTime<Utc>) {
        let entry = CacheEntry {
            data: posts,
            timestamp: now.timestamp_millis(),
        };

        let result = match serde_json::to_string(&entry) {
            Ok(json) => self.store.write(&self.key, &json).await,
            Err(e) => Err(AppError::Json(e)),
        };

        match result {
            Ok(()) => log::debug!("Cached {} posts under {:?}", posts.len(), self.key),
            Err(e) => {
                log::warn!("Failed to cache posts: {}", e);
                self.discard().await;
            }
        }
    }

    /// Fresh snapshot, or `None` on a miss.
    pub async fn get(&self) -> Option<Vec<Post>> {
        self.get_at(Utc::now()).await
    }

    /// Fresh snapshot as of `now`, or `None` on a miss.
    ///
    /// Missing, malformed and expired entries are all misses; the latter two
    /// are removed from the store.
    pub async fn get_at(&self, now: DateTime<Utc>) -> Option<Vec<Post>> {
        let raw = match self.store.read(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to retrieve cached posts: {}", e);
                self.discard().await;
                return None;
            }
        };

        let (posts, written_at) = match decode_entry(&raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Discarding corrupt cache entry {:?}: {}", self.key, e);
                self.discard().await;
                return None;
            }
        };

        if self.is_expired(written_at, now) {
            log::debug!("Cache entry {:?} expired", self.key);
            self.discard().await;
            return None;
        }

        Some(posts)
    }

    /// Inspect the snapshot without removing anything.
    pub async fn status_at(&self, now: DateTime<Utc>) -> Result<Option<CacheStatus>> {
        let Some(raw) = self.store.read(&self.key).await? else {
            return Ok(None);
        };
        let (posts, written_at) = decode_entry(&raw)?;
        Ok(Some(CacheStatus {
            count: posts.len(),
            written_at,
            expired: self.is_expired(written_at, now),
        }))
    }

    /// Drop the snapshot.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(&self.key).await
    }

    fn is_expired(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let age_ms = now.timestamp_millis() - written_at.timestamp_millis();
        age_ms > i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    async fn discard(&self) {
        if let Err(e) = self.store.remove(&self.key).await {
            log::warn!("Failed to clear cache entry {:?}: {}", self.key, e);
        }
    }
}

/// Validate the slot shape and decode it.
fn decode_entry(raw: &str) -> Result<(Vec<Post>, DateTime<Utc>)> {
    let mut value: Value = serde_json::from_str(raw)?;

    let timestamp = value
        .get("timestamp")
        .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f as i64)))
        .ok_or_else(|| AppError::validation("cache entry has no numeric timestamp"))?;

    let data = match value.get_mut("data") {
        Some(data) if data.is_array() => data.take(),
        _ => return Err(AppError::validation("cache entry has no data array")),
    };

    let posts: Vec<Post> = serde_json::from_value(data)?;
    let written_at = DateTime::<Utc>::from_timestamp_millis(timestamp)
        .ok_or_else(|| AppError::validation("cache timestamp out of range"))?;

    Ok((posts, written_at))
}
