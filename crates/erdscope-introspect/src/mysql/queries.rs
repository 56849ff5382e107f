use sqlx::MySqlPool;

use erdscope_core::Result;

use crate::adapter::db_error;
use crate::rows::MetadataRow;

pub async fn show_databases(pool: &MySqlPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT CAST(SCHEMA_NAME AS CHAR) FROM INFORMATION_SCHEMA.SCHEMATA ORDER BY SCHEMA_NAME",
    )
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn list_metadata_rows(
    pool: &MySqlPool,
    database: &str,
    include_views: bool,
) -> Result<Vec<MetadataRow>> {
    sqlx::query_as::<_, MetadataRow>(
        r#"
        SELECT
          CAST(T.TABLE_NAME AS CHAR) AS table_name,
          CAST(C.COLUMN_NAME AS CHAR) AS column_name,
          CAST(C.COLUMN_TYPE AS CHAR) AS column_type,
          CAST(N.CONSTRAINT_TYPE AS CHAR) AS constraint_type,
          CAST(K.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table_name,
          CAST(K.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column_name
        FROM INFORMATION_SCHEMA.TABLES T
        LEFT JOIN INFORMATION_SCHEMA.COLUMNS C
          USING (TABLE_SCHEMA, TABLE_NAME)
        LEFT JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE K
          USING (TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME)
        LEFT JOIN INFORMATION_SCHEMA.TABLE_CONSTRAINTS N
          USING (TABLE_SCHEMA, TABLE_NAME, CONSTRAINT_NAME)
        WHERE T.TABLE_SCHEMA = ?
          AND (T.TABLE_TYPE = 'BASE TABLE' OR (? AND T.TABLE_TYPE = 'VIEW'))
        ORDER BY T.TABLE_NAME, C.ORDINAL_POSITION
        "#,
    )
    .bind(database)
    .bind(include_views)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}
