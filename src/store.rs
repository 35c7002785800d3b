//! Keyed result store owned by the service layer.
//!
//! Analysis results are parked here under an opaque key for a bounded
//! retention window. Entries are timestamped at insert; a read after
//! expiry observes "not found" even before the eviction sweep has run,
//! so a get racing a concurrent sweep needs no extra serialization.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use crate::models::AnalysisResult;

#[derive(Debug)]
struct StoredEntry {
    result: AnalysisResult,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ResultStore {
    entries: HashMap<String, StoredEntry>,
    ttl: Duration,
    counter: u64,
}

impl ResultStore {
    /// Default retention matches the service's one-hour session window.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(1))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            counter: 0,
        }
    }

    /// Park a result and return its key.
    pub fn insert(&mut self, result: AnalysisResult) -> String {
        let created_at = Utc::now();
        self.counter += 1;
        let seed = format!("{}|{}", created_at.timestamp_nanos_opt().unwrap_or(0), self.counter);
        let key = format!("{:016x}", xxh3_64(seed.as_bytes()));

        self.entries.insert(
            key.clone(),
            StoredEntry {
                result,
                created_at,
                expires_at: created_at + self.ttl,
            },
        );
        debug!("Result stored - key={}, ttl={}s", key, self.ttl.num_seconds());
        key
    }

    /// Fetch a parked result. Expired entries read as absent regardless
    /// of whether the sweep has removed them yet.
    pub fn get(&self, key: &str) -> Option<&AnalysisResult> {
        let entry = self.entries.get(key)?;
        if Utc::now() > entry.expires_at {
            return None;
        }
        Some(&entry.result)
    }

    pub fn created_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|e| e.created_at)
    }

    /// Evict every expired entry; returns how many were removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.expires_at);
        let removed = before - self.entries.len();
        if removed > 0 {
            info!("Expired sessions cleaned - removed={}, remaining={}", removed, self.entries.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate;
    use crate::models::{AnalysisSummary, ThemeSet};

    fn result() -> AnalysisResult {
        let themes = ThemeSet {
            themes: Vec::new(),
            total_themes: 0,
            coverage: 0.0,
            quality_score: 0.0,
        };
        AnalysisResult {
            summary: AnalysisSummary {
                total_reviews: 0,
                processed_reviews: 0,
                text_column: "review".to_string(),
                analysis_date: Utc::now(),
                processing_ms: 0,
            },
            sentiments: Vec::new(),
            metrics: aggregate(&[], &themes),
            themes,
            insights: Vec::new(),
        }
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let mut store = ResultStore::new();
        let key = store.insert(result());
        assert!(store.get(&key).is_some());
        assert!(store.get("unknown").is_none());
    }

    #[test]
    fn keys_are_unique() {
        let mut store = ResultStore::new();
        let a = store.insert(result());
        let b = store.insert(result());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn expired_entries_read_as_absent_before_sweep() {
        let mut store = ResultStore::with_ttl(Duration::milliseconds(-1));
        let key = store.insert(result());
        // already past its expiry; still physically present
        assert_eq!(store.len(), 1);
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn sweep_evicts_only_expired_entries() {
        let mut store = ResultStore::with_ttl(Duration::milliseconds(-1));
        store.insert(result());
        store.insert(result());
        assert_eq!(store.sweep_expired(), 2);
        assert!(store.is_empty());

        let mut fresh = ResultStore::new();
        fresh.insert(result());
        assert_eq!(fresh.sweep_expired(), 0);
        assert_eq!(fresh.len(), 1);
    }
}
