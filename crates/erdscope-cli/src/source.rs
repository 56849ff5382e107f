use std::path::Path;

use serde_json::Value;

use erdscope_core::{Graph, build_graph_from_json};
use erdscope_introspect::{ConnectionInfo, DatabaseList, MetadataService, connect};

use crate::CliError;
use crate::config::Settings;

/// Where table metadata comes from: a live server, or a JSON file holding the
/// table list in the shape the graph builder accepts.
pub enum Source {
    Database(MetadataService),
    Json { name: String, tables: Value },
}

impl Source {
    pub async fn connect(
        url: &str,
        database: Option<String>,
        settings: &Settings,
    ) -> Result<Self, CliError> {
        let info = ConnectionInfo::parse(url)?;
        let database = database
            .or_else(|| info.default_database())
            .ok_or_else(|| {
                CliError::InvalidConfig(format!(
                    "no database selected for {}; pass --db or set database.name",
                    info.redacted
                ))
            })?;
        let (adapter, _) = connect(url).await?;
        Ok(Source::Database(MetadataService::new(
            adapter,
            database,
            settings.introspect_options(),
            &settings.cache_options(),
        )))
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = serde_json::from_str(&content)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "metadata".to_string());
        Ok(Source::Json { name, tables })
    }

    pub fn current_database(&self) -> &str {
        match self {
            Source::Database(service) => service.current_database(),
            Source::Json { name, .. } => name,
        }
    }

    pub async fn graph(&self, database: &str) -> Result<Graph, CliError> {
        match self {
            Source::Database(service) => Ok(service.graph(database).await?),
            Source::Json { name, tables } if name == database => Ok(build_graph_from_json(tables)?),
            Source::Json { name, .. } => Err(CliError::InvalidConfig(format!(
                "metadata file only holds `{name}`, not `{database}`"
            ))),
        }
    }

    pub async fn database_list(&self) -> Result<DatabaseList, CliError> {
        match self {
            Source::Database(service) => Ok(service.database_list().await?),
            Source::Json { name, .. } => Ok(DatabaseList {
                db_names: vec![name.clone()],
                current_db_name: name.clone(),
            }),
        }
    }

    /// Forget cached metadata so the next read hits the server.
    pub fn refresh(&self) {
        if let Source::Database(service) = self {
            service.flush_cache();
        }
    }
}
