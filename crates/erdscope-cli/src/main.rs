mod config;
mod logging;
mod shell;
mod source;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use erdscope_core::store::{
    Action, Store, load_graph, search_displayed, sorted_table_names, suggest,
};
use erdscope_core::{Error as CoreError, Graph, GraphError};
use schemars::schema_for;
use serde::Serialize;
use thiserror::Error;

use config::{ConfigError, load_settings};
use logging::init_logging;
use source::Source;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<GraphError> for CliError {
    fn from(err: GraphError) -> Self {
        CliError::Core(CoreError::Graph(err))
    }
}

impl CliError {
    /// Text for end users, for errors that have one.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            CliError::Core(err) => Some(err.user_message()),
            _ => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "erdscope",
    version,
    about = "Entity-relationship graphs from database metadata"
)]
struct Cli {
    /// Configuration file (defaults to ./erdscope.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Database connection string.
    #[arg(long, global = true, value_name = "CONNECTION_STRING")]
    conn: Option<String>,
    /// Database (MySQL) or schema (Postgres) to show.
    #[arg(long, global = true, value_name = "NAME")]
    db: Option<String>,
    /// Read table metadata from a JSON file instead of a database.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "conn")]
    metadata: Option<PathBuf>,
    /// Include views next to base tables.
    #[arg(long, global = true, default_value_t = false)]
    include_views: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full graph as JSON.
    Graph(OutArgs),
    /// Print the part of the graph around one table as JSON.
    Search(SearchArgs),
    /// Suggest tables for a partial table or column name.
    Suggest { query: String },
    /// List every table, sorted.
    Tables,
    /// List databases on the server.
    Databases,
    /// Print the JSON Schema of the graph output.
    Schema(OutArgs),
    /// Explore interactively, reading commands from stdin.
    Shell,
}

#[derive(Args, Debug)]
struct OutArgs {
    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Table to center the graph on.
    table: String,
    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(event = "command_failed", error = %err);
            match err.user_message() {
                Some(message) => eprintln!("{message}\n  caused by: {err}"),
                None => eprintln!("error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(conn) = cli.conn.clone() {
        settings.database.url = Some(conn);
    }
    if let Some(db) = cli.db.clone() {
        settings.database.name = Some(db);
    }
    if cli.include_views {
        settings.database.include_views = true;
    }
    init_logging(&settings.logging)?;

    if let Command::Schema(args) = &cli.command {
        let schema = schema_for!(Graph);
        write_json(&schema, args.out.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let source = open_source(&cli, &settings).await?;
    let database = source.current_database().to_string();
    tracing::info!(event = "command_started", command = ?cli.command, database = %database);

    match cli.command {
        Command::Databases => {
            let list = source.database_list().await?;
            println!("{}", shell::mark_current(&list.db_names, &list.current_db_name));
        }
        Command::Tables => match source.graph(&database).await {
            Ok(graph) => {
                let store = new_store(&database, graph);
                for name in sorted_table_names(store.get_state()) {
                    println!("{name}");
                }
            }
            Err(CliError::Core(CoreError::Graph(GraphError::EmptyInput))) => {
                println!("The database has no tables.");
            }
            Err(err) => return Err(err),
        },
        Command::Graph(args) => {
            let graph = source.graph(&database).await?;
            write_json(&graph, args.out.as_deref())?;
        }
        Command::Search(args) => {
            let mut store = new_store(&database, source.graph(&database).await?);
            match search_displayed(&mut store, &args.table) {
                Ok(()) => {
                    let shown = store.get_state().displayed_metadata.graph();
                    write_json(&shown, args.out.as_deref())?;
                }
                Err(err @ GraphError::TargetNotFound(_)) => {
                    eprintln!("{}", err.user_message());
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Suggest { query } => {
            let store = new_store(&database, source.graph(&database).await?);
            for table in suggest(store.get_state(), &query) {
                println!("{table}");
            }
        }
        Command::Shell => {
            let mut store = new_store(&database, source.graph(&database).await?);
            let stdin = io::stdin();
            shell::run_shell(&source, &mut store, stdin.lock(), io::stdout()).await?;
        }
        Command::Schema(_) => {}
    }

    Ok(ExitCode::SUCCESS)
}

async fn open_source(cli: &Cli, settings: &config::Settings) -> Result<Source, CliError> {
    if let Some(path) = &cli.metadata {
        return Source::from_file(path);
    }
    let url = settings.database.url.as_deref().ok_or_else(|| {
        CliError::InvalidConfig(format!(
            "connection string is required; pass --conn or set {}",
            config::DATABASE_URL_ENV
        ))
    })?;
    Source::connect(url, settings.database.name.clone(), settings).await
}

/// A store holding the full graph of `database`, with everything shown.
pub fn new_store(database: &str, graph: Graph) -> Store {
    let mut store = Store::new();
    store.subscribe(|state| {
        tracing::debug!(
            event = "displayed_graph_changed",
            database = %state.current_db_name,
            tables = state.displayed_metadata.cells.len(),
            links = state.displayed_metadata.links.len()
        );
    });
    store.dispatch(Action::ReplaceCurrentDatabaseName(database.to_string()));
    load_graph(&mut store, graph);
    store
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, json).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(event = "output_written", path = %path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|source| CliError::Io {
                path: "<stdout>".into(),
                source,
            })?;
        }
    }
    Ok(())
}
