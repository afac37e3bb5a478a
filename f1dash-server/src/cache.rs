//! Bounded session cache
//!
//! Loaded sessions are kept by the string form of their key and evicted
//! least-recently-used once the cache is full. Failed loads are never
//! stored.

use f1dash_core::{Result, Session, SessionKey};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Shared reference to a loaded session
pub type SessionHandle = Arc<Session>;

pub const DEFAULT_CAPACITY: usize = 8;

struct CacheEntry {
    handle: SessionHandle,
    last_used: u64,
}

pub struct SessionCache {
    capacity: usize,
    entries: HashMap<String, CacheEntry>,
    clock: u64,
}

impl SessionCache {
    /// A cache holding at most `capacity` sessions (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.entries.contains_key(&key.cache_key())
    }

    /// Look up a session, marking it as most recently used
    pub fn get(&mut self, key: &SessionKey) -> Option<SessionHandle> {
        self.clock += 1;
        let now = self.clock;

        match self.entries.get_mut(&key.cache_key()) {
            Some(entry) => {
                entry.last_used = now;
                debug!("Session cache hit for {}", key);
                Some(entry.handle.clone())
            }
            None => {
                debug!("Session cache miss for {}", key);
                None
            }
        }
    }

    /// Store a session, replacing any entry under the same key, and return
    /// the stored handle
    pub fn insert(&mut self, key: &SessionKey, session: Session) -> SessionHandle {
        self.clock += 1;
        let cache_key = key.cache_key();

        if !self.entries.contains_key(&cache_key) && self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }

        let handle = Arc::new(session);
        self.entries.insert(
            cache_key,
            CacheEntry {
                handle: handle.clone(),
                last_used: self.clock,
            },
        );
        handle
    }

    /// Return the cached session or load, store and return it
    pub fn get_or_load(
        &mut self,
        key: &SessionKey,
        load: impl FnOnce(&SessionKey) -> Result<Session>,
    ) -> Result<SessionHandle> {
        if let Some(handle) = self.get(key) {
            return Ok(handle);
        }
        let session = load(key)?;
        Ok(self.insert(key, session))
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            debug!("Evicting {} from the session cache", key);
            self.entries.remove(&key);
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use f1dash_core::{DashboardError, SessionType};

    fn key(event: &str) -> SessionKey {
        SessionKey::new(2024, event, SessionType::Race).unwrap()
    }

    fn session(key: &SessionKey) -> Session {
        Session {
            key: key.clone(),
            event_name: key.event().to_string(),
            laps: Vec::new(),
            results: Vec::new(),
        }
    }

    #[test]
    fn test_same_key_returns_same_instance() {
        let mut cache = SessionCache::default();
        let k = key("Monaco Grand Prix");

        let first = cache.get_or_load(&k, |k| Ok(session(k))).unwrap();
        let second = cache
            .get_or_load(&k, |_| panic!("second request must not reload"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_keys_never_share_a_handle() {
        let mut cache = SessionCache::default();
        let race = key("Monaco Grand Prix");
        let quali = SessionKey::new(2024, "Monaco Grand Prix", SessionType::Qualifying).unwrap();

        let a = cache.get_or_load(&race, |k| Ok(session(k))).unwrap();
        let b = cache.get_or_load(&quali, |k| Ok(session(k))).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.key, quali);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut cache = SessionCache::default();
        let k = key("Atlantis Grand Prix");

        let result = cache.get_or_load(&k, |_| {
            Err(DashboardError::DataUnavailable("unknown event".to_string()))
        });
        assert!(matches!(result, Err(DashboardError::DataUnavailable(_))));
        assert!(cache.is_empty());
        assert!(!cache.contains(&k));
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = SessionCache::new(2);
        let (a, b, c) = (key("Bahrain Grand Prix"), key("Miami Grand Prix"), key("Singapore Grand Prix"));

        cache.insert(&a, session(&a));
        cache.insert(&b, session(&b));
        // touch `a` so `b` becomes the oldest
        assert!(cache.get(&a).is_some());
        cache.insert(&c, session(&c));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn test_reinsert_overwrites_without_evicting() {
        let mut cache = SessionCache::new(2);
        let (a, b) = (key("Bahrain Grand Prix"), key("Miami Grand Prix"));

        let first = cache.insert(&a, session(&a));
        cache.insert(&b, session(&b));
        let second = cache.insert(&a, session(&a));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&b));
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&cache.get(&a).unwrap(), &second));
    }

    #[test]
    fn test_zero_capacity_still_holds_one_session() {
        let mut cache = SessionCache::new(0);
        assert_eq!(cache.capacity(), 1);
        let a = key("Bahrain Grand Prix");
        cache.insert(&a, session(&a));
        assert!(cache.contains(&a));
    }
}
