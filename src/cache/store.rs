//! Cache storage for product list pages.
//!
//! The table itself is synchronous; callers hold it behind a mutex and never
//! keep the guard across an await point.

use std::collections::HashMap;

use time::{Duration, OffsetDateTime};

use crate::application::pagination::ResultPage;

use super::keys::CacheKey;

/// One cached product list.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: ResultPage,
    pub fetched_at: OffsetDateTime,
    /// Set while a background refresh for this key is in flight.
    pub refetching: bool,
    /// Identifies this entry across removal and re-insertion of its key.
    pub generation: u64,
}

impl CacheEntry {
    fn new(data: ResultPage, fetched_at: OffsetDateTime, generation: u64) -> Self {
        Self {
            data,
            fetched_at,
            refetching: false,
            generation,
        }
    }

    /// Fresh while the entry's age is within `duration`, inclusive.
    pub fn is_fresh(&self, now: OffsetDateTime, duration: Duration) -> bool {
        now - self.fetched_at <= duration
    }
}

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Miss,
    Fresh {
        data: ResultPage,
        fetched_at: OffsetDateTime,
    },
    Stale {
        data: ResultPage,
        fetched_at: OffsetDateTime,
        /// Generation of the entry when this lookup took ownership of the
        /// background refresh.
        claim: Option<u64>,
    },
}

#[derive(Debug, Default)]
pub struct CacheTable {
    entries: HashMap<CacheKey, CacheEntry>,
    next_generation: u64,
}

impl CacheTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `key` and, for a stale entry with no refresh in flight, claim
    /// the refresh in the same step.
    pub fn lookup(&mut self, key: &CacheKey, now: OffsetDateTime, duration: Duration) -> Lookup {
        let Some(entry) = self.entries.get_mut(key) else {
            return Lookup::Miss;
        };

        if entry.is_fresh(now, duration) {
            return Lookup::Fresh {
                data: entry.data.clone(),
                fetched_at: entry.fetched_at,
            };
        }

        let claim = (!entry.refetching).then_some(entry.generation);
        entry.refetching = true;
        Lookup::Stale {
            data: entry.data.clone(),
            fetched_at: entry.fetched_at,
            claim,
        }
    }

    /// Claim the refresh of an existing entry regardless of its age.
    ///
    /// Returns the claimed generation, or `None` when the key is absent or a
    /// refresh is already in flight.
    pub fn claim_refresh(&mut self, key: &CacheKey) -> Option<u64> {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.refetching => {
                entry.refetching = true;
                Some(entry.generation)
            }
            _ => None,
        }
    }

    /// Store a foreground result, replacing any previous entry for the key.
    ///
    /// An in-flight refresh keeps its claim so it is not issued twice.
    pub fn insert(&mut self, key: CacheKey, data: ResultPage, fetched_at: OffsetDateTime) {
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.data = data;
                entry.fetched_at = fetched_at;
            }
            None => {
                self.next_generation += 1;
                let entry = CacheEntry::new(data, fetched_at, self.next_generation);
                self.entries.insert(key, entry);
            }
        }
    }

    /// Apply a successful background refresh and release the claim.
    ///
    /// Returns `false` when the claimed entry was invalidated while the
    /// refresh ran. The result is then dropped: the key is not resurrected and
    /// an entry re-created since then is left alone.
    pub fn complete_refresh(
        &mut self,
        key: &CacheKey,
        generation: u64,
        data: ResultPage,
        fetched_at: OffsetDateTime,
    ) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                entry.data = data;
                entry.fetched_at = fetched_at;
                entry.refetching = false;
                true
            }
            _ => false,
        }
    }

    /// Release the claim after a failed refresh, leaving the stale data in place.
    pub fn release(&mut self, key: &CacheKey, generation: u64) {
        match self.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => entry.refetching = false,
            _ => {}
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
