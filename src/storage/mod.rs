//! Database access: connection pool, schema migration and per-entity CRUD

pub mod db;

pub use db::{create_pool, get_connection, DbConnection, DbPool};
