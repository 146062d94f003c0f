use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::tag::Tag;

/// Cache key: query endpoint name plus a digest of its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: &'static str,
    args: String,
}

impl CacheKey {
    pub fn new(endpoint: &'static str, args: &Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(args.to_string().as_bytes());
        Self {
            endpoint,
            args: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, &self.args[..12.min(self.args.len())])
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    tags: Vec<Tag>,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    epoch: u64,
    // Fetches begun before this epoch predate the last reset
    reset_epoch: u64,
    in_flight: usize,
    // Invalidations seen while fetches were in flight, cleared once none are
    invalidations: Vec<(u64, Tag)>,
}

/// Tag-invalidated response cache. Entries never expire on their own; a
/// mutation drops every entry carrying a tag it declares. Last fetch wins.
#[derive(Debug, Clone)]
pub struct QueryCache {
    state: Arc<RwLock<CacheState>>,
    enabled: bool,
}

/// Marks a fetch in flight so that an invalidation landing before the
/// response keeps that (now stale) response out of the cache.
#[derive(Debug)]
pub struct FetchTicket {
    started_at: u64,
    state: Arc<RwLock<CacheState>>,
}

impl Drop for FetchTicket {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 {
            state.invalidations.clear();
        }
    }
}

impl QueryCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached value for `key`, if present and decodable as `T`
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let entry = state.entries.get(key)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("cached value for {} did not decode: {}", key, e);
                None
            }
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.contains_key(key)
    }

    pub fn fetched_at(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.get(key).map(|entry| entry.fetched_at)
    }

    pub fn begin(&self) -> FetchTicket {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.in_flight += 1;
        FetchTicket {
            started_at: state.epoch,
            state: Arc::clone(&self.state),
        }
    }

    /// Store a fetched value. Returns false when caching is disabled or a
    /// matching invalidation happened after the fetch began.
    pub fn store(&self, ticket: FetchTicket, key: CacheKey, tags: Vec<Tag>, value: Value) -> bool {
        if !self.enabled {
            return false;
        }

        let stored = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let stale = ticket.started_at < state.reset_epoch
                || state.invalidations.iter().any(|(epoch, invalidated)| {
                    *epoch > ticket.started_at && tags.iter().any(|tag| invalidated.matches(tag))
                });

            if stale {
                tracing::warn!("not caching {}: invalidated while in flight", key);
                false
            } else {
                state.entries.insert(
                    key,
                    CacheEntry {
                        value,
                        tags,
                        fetched_at: Utc::now(),
                    },
                );
                true
            }
        };

        drop(ticket);
        stored
    }

    /// Drop every entry providing a tag matched by `tags`. Returns the
    /// number of entries removed.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        if tags.is_empty() {
            return 0;
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.epoch += 1;
        if state.in_flight > 0 {
            let epoch = state.epoch;
            state
                .invalidations
                .extend(tags.iter().cloned().map(|tag| (epoch, tag)));
        }

        let before = state.entries.len();
        state.entries.retain(|_, entry| {
            !tags
                .iter()
                .any(|invalidated| entry.tags.iter().any(|provided| invalidated.matches(provided)))
        });
        before - state.entries.len()
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.remove(key).is_some()
    }

    pub fn reset(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.epoch += 1;
        state.reset_epoch = state.epoch;
    }

    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(true)
    }
}
