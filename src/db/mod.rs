// ABOUTME: Database module exports for Client Book
// ABOUTME: Contains the SQLite client store, table definitions and the lookup predicate builder

pub mod filter;
pub mod schema;
pub mod store;

pub use filter::ClientField;
pub use schema::SchemaInfo;
pub use store::{ClientStore, StoreError};
