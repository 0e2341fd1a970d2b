use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::diary::models::DiaryEntry;

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Tokio's clock; pausable in tests via `tokio::time::pause`.
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CachedEntries {
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
    entries: Vec<DiaryEntry>,
}

/// Parsed diary entries memoized per Notion page id.
///
/// Entries expire lazily on read; there is no background sweep. The lock is
/// never held across an await, so two requests missing at the same time will
/// both fetch and the later `put` wins.
#[derive(Clone)]
pub struct DiaryCache {
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
    entries: Arc<Mutex<HashMap<String, CachedEntries>>>,
}

impl DiaryCache {
    /// A TTL of zero or less disables caching.
    pub fn new(ttl_seconds: i64) -> Self {
        Self::with_clock(ttl_seconds, Arc::new(TokioClock))
    }

    pub fn with_clock(ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        let ttl = (ttl_seconds > 0).then(|| Duration::from_secs(ttl_seconds as u64));
        Self {
            ttl,
            clock,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<DiaryEntry>> {
        self.ttl?;
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some(cached) if cached.expires_at.map_or(true, |at| at > now) => {
                debug!("Diary cache hit for {key}");
                Some(cached.entries.clone())
            }
            Some(_) => {
                debug!("Diary cache entry for {key} expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, value: Vec<DiaryEntry>) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let expires_at = self.clock.now().checked_add(ttl);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                key.to_string(),
                CachedEntries {
                    expires_at,
                    entries: value,
                },
            );
    }
}
