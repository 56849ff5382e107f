//! Reads table metadata from live databases for erdscope.

pub mod adapter;
pub mod cache;
pub mod connection;
pub mod mysql;
pub mod options;
pub mod postgres;
pub mod rows;
pub mod service;

pub use adapter::{Adapter, connect};
pub use cache::MetadataCache;
pub use connection::{ConnectionInfo, Engine};
pub use mysql::MySqlAdapter;
pub use options::{CacheOptions, IntrospectOptions};
pub use postgres::PostgresAdapter;
pub use rows::{MetadataRow, process_rows};
pub use service::{DatabaseList, MetadataService};
