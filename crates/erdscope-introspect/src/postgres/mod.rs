use sqlx::PgPool;

use erdscope_core::Result;

use crate::adapter::Adapter;
use crate::connection::Engine;
use crate::options::IntrospectOptions;
use crate::rows::MetadataRow;

mod queries;

/// Adapter for PostgreSQL databases. Each schema of the connected database
/// is listed as its own database.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        queries::list_schemas(&self.pool).await
    }

    async fn fetch_metadata_rows(
        &self,
        database: &str,
        opts: &IntrospectOptions,
    ) -> Result<Vec<MetadataRow>> {
        queries::list_metadata_rows(&self.pool, database, opts.include_views).await
    }
}
