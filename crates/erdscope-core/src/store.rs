//! Application state shared by everything that draws or queries the graph.
//!
//! State only changes through [`Store::dispatch`], which runs the action
//! through pure reducers and then notifies subscribers.

use std::fmt;

use crate::autocomplete::{ColumnIndex, autocomplete_search, build_column_index};
use crate::error::GraphResult;
use crate::graph::{Cell, Graph, Link};
use crate::search::search_graph;

/// The full graph of the current database, plus lookups derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllMetadata {
    pub cells: Vec<Cell>,
    pub links: Vec<Link>,
    pub column_names_to_table_names: ColumnIndex,
    pub table_names: Vec<String>,
}

impl AllMetadata {
    pub fn graph(&self) -> Graph {
        Graph::new(self.cells.clone(), self.links.clone())
    }
}

/// The graph currently on screen: the full graph or a search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedMetadata {
    pub cells: Vec<Cell>,
    pub links: Vec<Link>,
    pub table_names: Vec<String>,
}

impl DisplayedMetadata {
    pub fn graph(&self) -> Graph {
        Graph::new(self.cells.clone(), self.links.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub current_db_name: String,
    pub db_names: Vec<String>,
    pub all_metadata: AllMetadata,
    pub displayed_metadata: DisplayedMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ReplaceAllMetadata { cells: Vec<Cell>, links: Vec<Link> },
    ReplaceDisplayedMetadata { cells: Vec<Cell>, links: Vec<Link> },
    ReplaceDatabaseNames(Vec<String>),
    ReplaceCurrentDatabaseName(String),
}

impl Action {
    pub fn replace_all(graph: Graph) -> Self {
        Action::ReplaceAllMetadata {
            cells: graph.cells,
            links: graph.links,
        }
    }

    pub fn replace_displayed(graph: Graph) -> Self {
        Action::ReplaceDisplayedMetadata {
            cells: graph.cells,
            links: graph.links,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Action::ReplaceAllMetadata { .. } => "REPLACE_ALL_METADATA",
            Action::ReplaceDisplayedMetadata { .. } => "REPLACE_DISPLAYED_METADATA",
            Action::ReplaceDatabaseNames(_) => "REPLACE_DATABASE_NAMES",
            Action::ReplaceCurrentDatabaseName(_) => "REPLACE_CURRENT_DATABASE_NAME",
        }
    }
}

fn table_names(cells: &[Cell]) -> Vec<String> {
    cells.iter().map(|cell| cell.table_name.clone()).collect()
}

/// Reduce an action into the next state. Slices an action does not touch are
/// carried over unchanged.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::ReplaceAllMetadata { cells, links } => AppState {
            all_metadata: AllMetadata {
                column_names_to_table_names: build_column_index(&cells),
                table_names: table_names(&cells),
                cells,
                links,
            },
            ..state
        },
        Action::ReplaceDisplayedMetadata { cells, links } => AppState {
            displayed_metadata: DisplayedMetadata {
                table_names: table_names(&cells),
                cells,
                links,
            },
            ..state
        },
        Action::ReplaceDatabaseNames(db_names) => AppState { db_names, ..state },
        Action::ReplaceCurrentDatabaseName(current_db_name) => AppState {
            current_db_name,
            ..state
        },
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&AppState) + Send + Sync>;

/// Owns the [`AppState`] and notifies listeners after every dispatch.
#[derive(Default)]
pub struct Store {
    state: AppState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::debug!(event = "action_dispatched", action = action.name());
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        for (_, listener) in &self.listeners {
            listener(&self.state);
        }
    }

    /// Register a listener; listeners run in subscription order.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }
}

/// Replace the full graph and show all of it.
pub fn load_graph(store: &mut Store, graph: Graph) {
    store.dispatch(Action::replace_all(graph.clone()));
    store.dispatch(Action::replace_displayed(graph));
}

/// Show the part of the full graph around `target`. On failure the displayed
/// graph is left as it was.
pub fn search_displayed(store: &mut Store, target: &str) -> GraphResult<()> {
    let result = search_graph(target, &store.get_state().all_metadata.graph())?;
    store.dispatch(Action::replace_displayed(result));
    Ok(())
}

/// Show the full graph again after a search.
pub fn reset_visualization(store: &mut Store) {
    let all = store.get_state().all_metadata.graph();
    store.dispatch(Action::replace_displayed(all));
}

/// Suggestions for a partially typed table or column name.
pub fn suggest(state: &AppState, query: &str) -> Vec<String> {
    autocomplete_search(
        query,
        &state.all_metadata.column_names_to_table_names,
        &state.all_metadata.table_names,
    )
}

/// All table names of the current database, sorted.
pub fn sorted_table_names(state: &AppState) -> Vec<String> {
    let mut names = state.all_metadata.table_names.clone();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::GraphError;
    use crate::relationship::RelationshipType;

    fn graph() -> Graph {
        let cell = |id: usize, name: &str, columns: &[&str]| Cell {
            id,
            table_name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        };
        Graph::new(
            vec![
                cell(0, "person", &["id: int PK"]),
                cell(1, "car", &["id: int PK", "owner: int"]),
                cell(2, "boat", &["id: int PK"]),
            ],
            vec![Link::new(
                1,
                0,
                RelationshipType::Many,
                RelationshipType::One,
            )],
        )
    }

    #[test]
    fn replacing_all_metadata_derives_lookups() {
        let state = reduce(AppState::default(), Action::replace_all(graph()));
        assert_eq!(state.all_metadata.table_names, vec!["person", "car", "boat"]);
        assert_eq!(
            state.all_metadata.column_names_to_table_names["owner"],
            vec!["car"]
        );
        assert!(state.displayed_metadata.cells.is_empty());
    }

    #[test]
    fn unrelated_slices_survive_a_dispatch() {
        let state = reduce(
            AppState::default(),
            Action::ReplaceCurrentDatabaseName("garage".to_string()),
        );
        let state = reduce(
            state,
            Action::ReplaceDatabaseNames(vec!["garage".to_string(), "zoo".to_string()]),
        );
        assert_eq!(state.current_db_name, "garage");
        assert_eq!(state.db_names.len(), 2);
    }

    #[test]
    fn listeners_are_notified_until_unsubscribed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = Store::new();
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |state| {
            sink.lock().unwrap().push(state.current_db_name.clone());
        });

        store.dispatch(Action::ReplaceCurrentDatabaseName("first".to_string()));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::ReplaceCurrentDatabaseName("second".to_string()));

        assert_eq!(*seen.lock().unwrap(), vec!["first".to_string()]);
        assert_eq!(store.get_state().current_db_name, "second");
    }

    #[test]
    fn search_then_reset_swaps_the_displayed_graph() {
        let mut store = Store::new();
        load_graph(&mut store, graph());
        assert_eq!(store.get_state().displayed_metadata.cells.len(), 3);

        search_displayed(&mut store, "car").unwrap();
        assert_eq!(
            store.get_state().displayed_metadata.table_names,
            vec!["car", "person"]
        );

        let err = search_displayed(&mut store, "plane").unwrap_err();
        assert_eq!(err, GraphError::TargetNotFound("plane".to_string()));
        assert_eq!(store.get_state().displayed_metadata.cells.len(), 2);

        reset_visualization(&mut store);
        assert_eq!(store.get_state().displayed_metadata.cells.len(), 3);
    }

    #[test]
    fn suggestions_and_table_listing_read_all_metadata() {
        let mut store = Store::new();
        load_graph(&mut store, graph());
        assert_eq!(suggest(store.get_state(), "own"), vec!["car"]);
        assert_eq!(
            sorted_table_names(store.get_state()),
            vec!["boat", "car", "person"]
        );
    }
}
