use std::time::Duration;

/// Options that control which tables introspection returns.
#[derive(Debug, Clone, Default)]
pub struct IntrospectOptions {
    /// Include views next to base tables.
    pub include_views: bool,
}

/// Bounds of the metadata cache.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// How long fetched metadata stays valid.
    pub ttl: Duration,
    /// Maximum number of databases kept at once.
    pub capacity: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(100),
            capacity: 16,
        }
    }
}
