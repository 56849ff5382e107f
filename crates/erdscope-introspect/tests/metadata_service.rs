use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use erdscope_core::{Error, GraphError, RelationshipType};
use erdscope_introspect::{
    Adapter, CacheOptions, Engine, IntrospectOptions, MetadataRow, MetadataService,
};

struct InMemoryAdapter {
    rows: Vec<MetadataRow>,
    fetches: AtomicUsize,
}

impl InMemoryAdapter {
    fn new(rows: Vec<MetadataRow>) -> Self {
        Self {
            rows,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Adapter for InMemoryAdapter {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    async fn list_databases(&self) -> erdscope_core::Result<Vec<String>> {
        Ok(vec!["garage".to_string(), "information_schema".to_string()])
    }

    async fn fetch_metadata_rows(
        &self,
        database: &str,
        _opts: &IntrospectOptions,
    ) -> erdscope_core::Result<Vec<MetadataRow>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if database == "garage" {
            Ok(self.rows.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

fn row(table: &str, column: &str, column_type: &str) -> MetadataRow {
    MetadataRow {
        table_name: table.to_string(),
        column_name: Some(column.to_string()),
        column_type: Some(column_type.to_string()),
        ..MetadataRow::default()
    }
}

fn garage_rows() -> Vec<MetadataRow> {
    vec![
        MetadataRow {
            constraint_type: Some("PRIMARY KEY".to_string()),
            ..row("car", "id", "int(11)")
        },
        MetadataRow {
            constraint_type: Some("FOREIGN KEY".to_string()),
            referenced_table_name: Some("person".to_string()),
            referenced_column_name: Some("id".to_string()),
            ..row("car", "owner_id", "int(11)")
        },
        MetadataRow {
            constraint_type: Some("PRIMARY KEY".to_string()),
            ..row("person", "id", "int(11)")
        },
        row("person", "name", "varchar(255)"),
    ]
}

fn service(adapter: Arc<InMemoryAdapter>) -> MetadataService {
    MetadataService::new(
        adapter,
        "garage",
        IntrospectOptions::default(),
        &CacheOptions::default(),
    )
}

#[tokio::test]
async fn builds_graph_from_fetched_rows() -> Result<()> {
    let adapter = Arc::new(InMemoryAdapter::new(garage_rows()));
    let service = service(Arc::clone(&adapter));

    let graph = service.graph("garage").await?;
    assert_eq!(graph.table_names(), vec!["car", "person"]);
    assert_eq!(graph.links.len(), 1);
    let link = &graph.links[0];
    assert_eq!((link.source, link.destination), (0, 1));
    assert_eq!(link.source_relationship_type, RelationshipType::Many);
    assert_eq!(link.destination_relationship_type, RelationshipType::One);
    Ok(())
}

#[tokio::test]
async fn metadata_is_cached_until_flushed() -> Result<()> {
    let adapter = Arc::new(InMemoryAdapter::new(garage_rows()));
    let service = service(Arc::clone(&adapter));

    let first = service.tables("garage").await?;
    let second = service.tables("garage").await?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(adapter.fetches.load(Ordering::SeqCst), 1);

    service.flush_cache();
    service.tables("garage").await?;
    assert_eq!(adapter.fetches.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn empty_database_cannot_be_drawn() {
    let adapter = Arc::new(InMemoryAdapter::new(garage_rows()));
    let service = service(adapter);

    let err = service.graph("empty").await.unwrap_err();
    assert!(matches!(err, Error::Graph(GraphError::EmptyInput)));
}

#[tokio::test]
async fn database_list_reports_current_database() -> Result<()> {
    let adapter = Arc::new(InMemoryAdapter::new(Vec::new()));
    let service = service(adapter);

    let list = service.database_list().await?;
    assert_eq!(list.current_db_name, "garage");
    assert_eq!(
        serde_json::to_value(&list)?,
        serde_json::json!({
            "dbNames": ["garage", "information_schema"],
            "currentDbName": "garage"
        })
    );
    Ok(())
}
