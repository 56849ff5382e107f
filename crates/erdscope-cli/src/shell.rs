//! Line-oriented session over one [`Store`], for exploring a schema without
//! reconnecting between searches.

use std::io::{BufRead, Write};

use erdscope_core::GraphError;
use erdscope_core::store::{
    Action, Store, load_graph, reset_visualization, search_displayed, sorted_table_names, suggest,
};

use crate::CliError;
use crate::source::Source;

const HELP: &str = "\
commands:
  search <table>   show the tables around <table>
  reset            show the whole database again
  suggest <text>   tables matching a table or column name
  tables           list every table
  shown            list the tables currently shown
  databases        list databases
  use <database>   switch database
  refresh          reload metadata from the server
  json             print the shown graph as JSON
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    Reset,
    Suggest(String),
    Tables,
    Shown,
    Databases,
    Use(String),
    Refresh,
    Json,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let argument = |name: &str| {
            if rest.is_empty() {
                Err(format!("`{name}` needs an argument"))
            } else {
                Ok(rest.to_string())
            }
        };

        match word {
            "search" => argument("search").map(ShellCommand::Search),
            "suggest" => argument("suggest").map(ShellCommand::Suggest),
            "use" => argument("use").map(ShellCommand::Use),
            "reset" => Ok(ShellCommand::Reset),
            "tables" => Ok(ShellCommand::Tables),
            "shown" => Ok(ShellCommand::Shown),
            "databases" => Ok(ShellCommand::Databases),
            "refresh" => Ok(ShellCommand::Refresh),
            "json" => Ok(ShellCommand::Json),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command `{other}`; try `help`")),
        }
    }
}

pub async fn run_shell<R, W>(
    source: &Source,
    store: &mut Store,
    input: R,
    mut output: W,
) -> Result<(), CliError>
where
    R: BufRead,
    W: Write,
{
    let io_err = |source| CliError::Io {
        path: "<stdout>".into(),
        source,
    };

    for line in input.lines() {
        let line = line.map_err(|source| CliError::Io {
            path: "<stdin>".into(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "{message}").map_err(io_err)?;
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        let reply = match execute(source, store, command).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(event = "shell_command_failed", error = %err);
                err.user_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string())
            }
        };
        writeln!(output, "{reply}").map_err(io_err)?;
    }
    Ok(())
}

async fn execute(
    source: &Source,
    store: &mut Store,
    command: ShellCommand,
) -> Result<String, CliError> {
    let reply = match command {
        ShellCommand::Search(target) => match search_displayed(store, &target) {
            Ok(()) => store.get_state().displayed_metadata.table_names.join("\n"),
            Err(err @ GraphError::TargetNotFound(_)) => err.user_message().to_string(),
            Err(err) => return Err(err.into()),
        },
        ShellCommand::Reset => {
            reset_visualization(store);
            format!(
                "showing all {} tables",
                store.get_state().displayed_metadata.cells.len()
            )
        }
        ShellCommand::Suggest(query) => suggest(store.get_state(), &query).join("\n"),
        ShellCommand::Tables => sorted_table_names(store.get_state()).join("\n"),
        ShellCommand::Shown => store.get_state().displayed_metadata.table_names.join("\n"),
        ShellCommand::Databases => {
            let list = source.database_list().await?;
            store.dispatch(Action::ReplaceDatabaseNames(list.db_names));
            let state = store.get_state();
            mark_current(&state.db_names, &state.current_db_name)
        }
        ShellCommand::Use(database) => {
            let graph = source.graph(&database).await?;
            store.dispatch(Action::ReplaceCurrentDatabaseName(database.clone()));
            load_graph(store, graph);
            format!("using {database}")
        }
        ShellCommand::Refresh => {
            source.refresh();
            let database = store.get_state().current_db_name.clone();
            let graph = source.graph(&database).await?;
            load_graph(store, graph);
            format!("reloaded {database}")
        }
        ShellCommand::Json => {
            serde_json::to_string_pretty(&store.get_state().displayed_metadata.graph())?
        }
        ShellCommand::Help | ShellCommand::Quit => HELP.to_string(),
    };
    Ok(reply)
}

/// One database per line, the current one marked with `*`.
pub fn mark_current(db_names: &[String], current: &str) -> String {
    db_names
        .iter()
        .map(|name| {
            let marker = if name == current { '*' } else { ' ' };
            format!("{marker} {name}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
