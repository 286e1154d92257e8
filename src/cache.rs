//! In-memory result cache with per-entry TTL
//!
//! One [`ResultCache`] is constructed at startup and shared behind an `Arc`.
//! Values are stored as-is and handed out by clone, so callers typically
//! cache `Arc`-wrapped payloads. Expired entries read as misses; a background
//! sweeper started with [`ResultCache::spawn_sweeper`] removes them.

use crate::config::CacheConfig;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    /// `None` never expires
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Key/value store with time-based expiry
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V> ResultCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty cache using the store-wide TTL from `config`
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: config.default_ttl,
        }
    }

    /// Value stored under `key`, if present and not expired
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            debug!(key, "Cache entry expired");
        }
        None
    }

    /// Store `value` under `key`, replacing any previous entry
    ///
    /// `ttl` of `None` uses the store-wide default; a zero TTL never expires.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        let key = key.into();

        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache entry stored");
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Remove `key`; returns whether an entry was present
    pub async fn delete(&self, key: &str) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            debug!(key, "Cache entry deleted");
        }
        removed
    }

    /// Drop every expired entry; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Expired cache entries swept");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Start a task that purges expired entries every `period`
    ///
    /// The task holds only a weak reference, so it ends when the cache is
    /// dropped or `cancel_token` is cancelled, whichever comes first.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        period: Duration,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let period = period.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let Some(cache) = cache.upgrade() else {
                            debug!("Cache dropped, stopping sweeper");
                            break;
                        };
                        cache.purge_expired().await;
                    }
                    _ = cancel_token.cancelled() => {
                        debug!("Cache sweeper cancelled");
                        break;
                    }
                }
            }
        })
    }
}
