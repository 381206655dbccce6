//! Persistence for Somara: the SQLite pool, its migrations, the stored
//! record types and the repositories that fall back to memory without a
//! database.

pub mod database;
pub mod models;
pub mod repository;
