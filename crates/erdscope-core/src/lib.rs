//! Core contracts for erdscope.
//!
//! Turns relational table metadata into a cell-and-link graph for an
//! entity-relationship diagram, and searches that graph for the part of the
//! schema around one table.

pub mod autocomplete;
pub mod error;
pub mod format;
pub mod graph;
pub mod metadata;
pub mod relationship;
pub mod search;
pub mod store;

pub use autocomplete::{ColumnIndex, autocomplete_search, build_column_index};
pub use error::{Error, ErrorKind, GraphError, GraphResult, Result};
pub use format::{format_column, format_columns};
pub use graph::{Cell, Graph, Link, build_graph, build_graph_from_json};
pub use metadata::{ColumnDescriptor, TableDescriptor};
pub use relationship::{RelationshipDescriptor, RelationshipType};
pub use search::{
    has_many_destination_side_toward_other, has_many_source_side_toward_other, search_graph,
};
pub use store::{Action, AppState, Store, SubscriptionId};
