//! SQLite pool and schema for class documents and profiles

pub mod connection;
pub mod migrations;

pub use connection::{
    describe_pool, get_connection_info, get_db_pool, initialize_database_pool, DatabaseConfig, DatabaseError,
    DatabasePool, DatabaseType, DEFAULT_SQLITE_PATH,
};
