use sqlx::PgPool;

use erdscope_core::Result;

use crate::adapter::db_error;
use crate::rows::MetadataRow;

pub async fn list_schemas(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select schema_name::text
        from information_schema.schemata
        where schema_name not in ('pg_catalog', 'information_schema')
          and schema_name not like 'pg\_%'
        order by schema_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

/// Referenced columns are matched by position, so composite foreign keys
/// pair each column with its own counterpart.
pub async fn list_metadata_rows(
    pool: &PgPool,
    schema: &str,
    include_views: bool,
) -> Result<Vec<MetadataRow>> {
    sqlx::query_as::<_, MetadataRow>(
        r#"
        select
          t.table_name::text as table_name,
          c.column_name::text as column_name,
          case
            when c.character_maximum_length is not null
              then c.data_type || '(' || c.character_maximum_length || ')'
            else c.data_type
          end::text as column_type,
          tc.constraint_type::text as constraint_type,
          rk.table_name::text as referenced_table_name,
          rk.column_name::text as referenced_column_name
        from information_schema.tables t
        left join information_schema.columns c
          on c.table_schema = t.table_schema
         and c.table_name = t.table_name
        left join information_schema.key_column_usage k
          on k.table_schema = c.table_schema
         and k.table_name = c.table_name
         and k.column_name = c.column_name
        left join information_schema.table_constraints tc
          on tc.constraint_schema = k.constraint_schema
         and tc.constraint_name = k.constraint_name
        left join information_schema.referential_constraints rc
          on tc.constraint_type = 'FOREIGN KEY'
         and rc.constraint_schema = tc.constraint_schema
         and rc.constraint_name = tc.constraint_name
        left join information_schema.key_column_usage rk
          on rk.constraint_schema = rc.unique_constraint_schema
         and rk.constraint_name = rc.unique_constraint_name
         and rk.ordinal_position = k.position_in_unique_constraint
        where t.table_schema = $1
          and (t.table_type = 'BASE TABLE' or ($2 and t.table_type = 'VIEW'))
        order by t.table_name, c.ordinal_position
        "#,
    )
    .bind(schema)
    .bind(include_views)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}
