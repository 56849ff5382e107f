use sqlx::MySqlPool;

use erdscope_core::Result;

use crate::adapter::Adapter;
use crate::connection::Engine;
use crate::options::IntrospectOptions;
use crate::rows::MetadataRow;

mod queries;

/// Adapter for MySQL and MariaDB servers.
#[derive(Debug, Clone)]
pub struct MySqlAdapter {
    pool: MySqlPool,
}

impl MySqlAdapter {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Adapter for MySqlAdapter {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        queries::show_databases(&self.pool).await
    }

    async fn fetch_metadata_rows(
        &self,
        database: &str,
        opts: &IntrospectOptions,
    ) -> Result<Vec<MetadataRow>> {
        queries::list_metadata_rows(&self.pool, database, opts.include_views).await
    }
}
