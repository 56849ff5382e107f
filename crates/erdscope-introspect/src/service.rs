use std::sync::Arc;

use serde::Serialize;

use erdscope_core::{Graph, Result, TableDescriptor, build_graph};

use crate::adapter::Adapter;
use crate::cache::MetadataCache;
use crate::options::{CacheOptions, IntrospectOptions};
use crate::rows::process_rows;

/// Databases the server exposes, and the one currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseList {
    pub db_names: Vec<String>,
    pub current_db_name: String,
}

/// Reads table metadata through an [`Adapter`], caching it per database.
pub struct MetadataService {
    adapter: Arc<dyn Adapter>,
    cache: MetadataCache,
    options: IntrospectOptions,
    current_database: String,
}

impl MetadataService {
    pub fn new(
        adapter: Arc<dyn Adapter>,
        current_database: impl Into<String>,
        options: IntrospectOptions,
        cache: &CacheOptions,
    ) -> Self {
        Self {
            adapter,
            cache: MetadataCache::new(cache),
            options,
            current_database: current_database.into(),
        }
    }

    pub fn current_database(&self) -> &str {
        &self.current_database
    }

    /// Tables of `database`, from the cache while the entry is fresh.
    pub async fn tables(&self, database: &str) -> Result<Arc<Vec<TableDescriptor>>> {
        if let Some(tables) = self.cache.get(database) {
            tracing::debug!(event = "metadata_cache_hit", database);
            return Ok(tables);
        }

        tracing::info!(event = "metadata_fetch_start", database, engine = %self.adapter.engine());
        let rows = self
            .adapter
            .fetch_metadata_rows(database, &self.options)
            .await?;
        let row_count = rows.len();
        let tables = process_rows(rows);
        tracing::info!(
            event = "metadata_fetch_finish",
            database,
            rows = row_count,
            tables = tables.len()
        );
        Ok(self.cache.insert(database, tables))
    }

    /// The full graph of `database`.
    pub async fn graph(&self, database: &str) -> Result<Graph> {
        let tables = self.tables(database).await?;
        Ok(build_graph(&tables)?)
    }

    pub async fn database_list(&self) -> Result<DatabaseList> {
        let db_names = self.adapter.list_databases().await?;
        Ok(DatabaseList {
            db_names,
            current_db_name: self.current_database.clone(),
        })
    }

    /// Drop every cached entry so the next read goes to the database.
    pub fn flush_cache(&self) {
        tracing::info!(event = "metadata_cache_flushed", entries = self.cache.len());
        self.cache.flush_all();
    }
}
