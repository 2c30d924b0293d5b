//! Time-bounded cache for the externally fetched reference table.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ReferenceTable, Result};

/// A cached value and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self { value, fetched_at }
    }

    /// Time since the value was fetched.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Whether the entry is younger than `ttl` at `now`.
    ///
    /// Entries stamped in the future are treated as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = self.age(now);
        age >= Duration::zero() && age < ttl
    }
}

/// Holds at most one reference table and reloads it once it expires.
#[derive(Debug, Clone)]
pub struct ReferenceCache {
    ttl: Duration,
    entry: Option<CacheEntry<ReferenceTable>>,
}

impl ReferenceCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Start from a previously stored entry.
    pub fn with_entry(mut self, entry: CacheEntry<ReferenceTable>) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn entry(&self) -> Option<&CacheEntry<ReferenceTable>> {
        self.entry.as_ref()
    }

    /// The cached table, if still fresh at `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<&ReferenceTable> {
        self.entry
            .as_ref()
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| &entry.value)
    }

    /// Replace the cached table.
    pub fn store(&mut self, table: ReferenceTable, now: DateTime<Utc>) -> &ReferenceTable {
        &self.entry.insert(CacheEntry::new(table, now)).value
    }

    /// The cached table if fresh, otherwise the result of `fetch`.
    ///
    /// A failed fetch leaves any stale entry in place.
    pub fn get_or_fetch<F>(&mut self, now: DateTime<Utc>, fetch: F) -> Result<&ReferenceTable>
    where
        F: FnOnce() -> Result<ReferenceTable>,
    {
        let entry = match self.entry.take() {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                debug!("Using cached reference table");
                entry
            }
            stale => {
                debug!("Reference cache empty or expired, fetching");
                match fetch() {
                    Ok(table) => CacheEntry::new(table, now),
                    Err(e) => {
                        self.entry = stale;
                        return Err(e);
                    }
                }
            }
        };

        Ok(&self.entry.insert(entry).value)
    }

    /// Drop the cached table.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
