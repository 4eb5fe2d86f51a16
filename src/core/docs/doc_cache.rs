use super::docs_models::DocumentText;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CachedDoc {
    doc: Arc<DocumentText>,
    fetched_at: Instant,
}

/// Bounded, time-limited cache of flattened documents.
///
/// Entries older than `ttl` are treated as missing. When the cache is full the
/// entry fetched longest ago is evicted to make room.
pub struct DocCache {
    entries: DashMap<String, CachedDoc>,
    ttl: Duration,
    capacity: usize,
}

impl DocCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity,
        }
    }

    pub fn get(&self, file_id: &str) -> Option<Arc<DocumentText>> {
        let cached = self.entries.get(file_id).map(|e| e.clone())?;
        if cached.fetched_at.elapsed() < self.ttl {
            return Some(cached.doc);
        }

        self.entries.remove(file_id);
        None
    }

    pub fn insert(&self, doc: Arc<DocumentText>) {
        if self.capacity == 0 {
            return;
        }

        if !self.entries.contains_key(&doc.id) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        self.entries.insert(
            doc.id.clone(),
            CachedDoc {
                doc,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().fetched_at)
            .map(|e| e.key().clone());

        if let Some(key) = oldest {
            tracing::debug!(file_id = %key, "Evicting cached document");
            self.entries.remove(&key);
        }
    }
}
