use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;

use erdscope_core::{Error, Result};

use crate::connection::{ConnectionInfo, Engine};
use crate::mysql::MySqlAdapter;
use crate::options::IntrospectOptions;
use crate::postgres::PostgresAdapter;
use crate::rows::MetadataRow;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait implemented by database adapters that can read table metadata.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn engine(&self) -> Engine;

    /// Names that can be passed as `database` to [`Adapter::fetch_metadata_rows`].
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// Column and key constraint rows of every table in `database`, ordered
    /// by table name and then by column position.
    async fn fetch_metadata_rows(
        &self,
        database: &str,
        opts: &IntrospectOptions,
    ) -> Result<Vec<MetadataRow>>;
}

/// Open a connection pool for `url` and wrap it in the matching adapter.
pub async fn connect(url: &str) -> Result<(Arc<dyn Adapter>, ConnectionInfo)> {
    let info = ConnectionInfo::parse(url)?;
    tracing::info!(
        event = "connecting",
        engine = %info.engine,
        url = %info.redacted
    );

    let adapter: Arc<dyn Adapter> = match info.engine {
        Engine::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect(url)
                .await
                .map_err(db_error)?;
            Arc::new(PostgresAdapter::new(pool))
        }
        Engine::MySql => {
            let pool = MySqlPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect(url)
                .await
                .map_err(db_error)?;
            Arc::new(MySqlAdapter::new(pool))
        }
    };
    Ok((adapter, info))
}

pub(crate) fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}
