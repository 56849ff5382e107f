use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;

use erdscope_core::TableDescriptor;

use crate::options::CacheOptions;

struct Entry {
    tables: Arc<Vec<TableDescriptor>>,
    stored_at: Instant,
}

/// Table metadata per database, bounded in size and age.
///
/// Least recently used databases are evicted once `capacity` is reached, and
/// entries older than `ttl` are treated as missing.
pub struct MetadataCache {
    entries: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
}

impl MetadataCache {
    pub fn new(options: &CacheOptions) -> Self {
        let capacity = NonZeroUsize::new(options.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: options.ttl,
        }
    }

    pub fn get(&self, database: &str) -> Option<Arc<Vec<TableDescriptor>>> {
        self.get_at(database, Instant::now())
    }

    fn get_at(&self, database: &str, now: Instant) -> Option<Arc<Vec<TableDescriptor>>> {
        let mut entries = self.lock();
        let expired = match entries.peek(database) {
            Some(entry) => now.saturating_duration_since(entry.stored_at) >= self.ttl,
            None => return None,
        };
        if expired {
            entries.pop(database);
            return None;
        }
        entries.get(database).map(|entry| Arc::clone(&entry.tables))
    }

    pub fn insert(
        &self,
        database: &str,
        tables: Vec<TableDescriptor>,
    ) -> Arc<Vec<TableDescriptor>> {
        let tables = Arc::new(tables);
        self.lock().put(
            database.to_string(),
            Entry {
                tables: Arc::clone(&tables),
                stored_at: Instant::now(),
            },
        );
        tables
    }

    pub fn flush_all(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
