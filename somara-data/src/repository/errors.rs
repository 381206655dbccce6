use std::sync::PoisonError;

use thiserror::Error;

use crate::database::DatabaseError;

/// Failure of a class or profile repository call.
///
/// A missing row is not an error; lookups answer with `Option`.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The record cannot be stored as given
    #[error("Invalid record: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("SQLite query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("No pooled connection available: {0}")]
    Pool(#[from] r2d2::Error),

    /// A writer panicked while holding the in-memory store
    #[error("In-memory store lock poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::MutexLock(error.to_string())
    }
}
