use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::class::ClassDocumentRecord;
use crate::models::profile::ProfileRecord;
use super::errors::RepositoryError;

/// Database storage operations for class documents and profiles
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Insert or update a class document, keeping the original created_at
    pub async fn upsert_class(pool: &DatabasePool, record: &ClassDocumentRecord) -> Result<ClassDocumentRecord, RepositoryError> {
        debug!("Upserting class document in database: id={}", record.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                conn.execute(
                    "INSERT INTO breathwork_classes (id, user_id, document, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (user_id, id) DO UPDATE SET
                        document = excluded.document,
                        updated_at = excluded.updated_at",
                    params![
                        record.id,
                        record.user_id,
                        record.document,
                        record.created_at,
                        record.updated_at,
                    ],
                )?;

                let stored = conn.query_row(
                    "SELECT id, user_id, document, created_at, updated_at
                     FROM breathwork_classes WHERE user_id = ?1 AND id = ?2",
                    params![record.user_id, record.id],
                    class_from_row,
                )?;

                Ok(stored)
            },
        }
    }

    /// Get a user's class documents, most recently updated first
    pub async fn list_classes(pool: &DatabasePool, user_id: &str) -> Result<Vec<ClassDocumentRecord>, RepositoryError> {
        debug!("Listing class documents from database for user {}", user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let mut stmt = conn.prepare(
                    "SELECT id, user_id, document, created_at, updated_at
                     FROM breathwork_classes WHERE user_id = ?1
                     ORDER BY updated_at DESC"
                )?;

                let rows = stmt.query_map(params![user_id], class_from_row)?;

                let mut result = Vec::new();
                for row in rows {
                    result.push(row?);
                }

                Ok(result)
            },
        }
    }

    pub async fn get_class(pool: &DatabasePool, user_id: &str, id: &str) -> Result<Option<ClassDocumentRecord>, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let record = conn.query_row(
                    "SELECT id, user_id, document, created_at, updated_at
                     FROM breathwork_classes WHERE user_id = ?1 AND id = ?2",
                    params![user_id, id],
                    class_from_row,
                ).optional()?;

                Ok(record)
            },
        }
    }

    /// Delete a class document, returning whether a row was removed
    pub async fn delete_class(pool: &DatabasePool, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let removed = conn.execute(
                    "DELETE FROM breathwork_classes WHERE user_id = ?1 AND id = ?2",
                    params![user_id, id],
                )?;

                Ok(removed > 0)
            },
        }
    }

    pub async fn get_profile(pool: &DatabasePool, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let record = conn.query_row(
                    "SELECT id, user_id, display_name, avatar_url, spotify_user_id,
                            spotify_connected, spotify_connected_at, created_at, updated_at
                     FROM profiles WHERE user_id = ?1",
                    params![user_id],
                    profile_from_row,
                ).optional()?;

                Ok(record)
            },
        }
    }

    pub async fn upsert_profile(pool: &DatabasePool, record: &ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
        debug!("Upserting profile in database for user {}", record.user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                conn.execute(
                    "INSERT INTO profiles (id, user_id, display_name, avatar_url, spotify_user_id,
                                           spotify_connected, spotify_connected_at, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT (user_id) DO UPDATE SET
                        display_name = excluded.display_name,
                        avatar_url = excluded.avatar_url,
                        spotify_user_id = excluded.spotify_user_id,
                        spotify_connected = excluded.spotify_connected,
                        spotify_connected_at = excluded.spotify_connected_at,
                        updated_at = excluded.updated_at",
                    params![
                        record.id,
                        record.user_id,
                        record.display_name,
                        record.avatar_url,
                        record.spotify_user_id,
                        record.spotify_connected,
                        record.spotify_connected_at,
                        record.created_at,
                        record.updated_at,
                    ],
                )?;

                Ok(record.clone())
            },
        }
    }
}

fn class_from_row(row: &Row<'_>) -> rusqlite::Result<ClassDocumentRecord> {
    Ok(ClassDocumentRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        document: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileRecord> {
    Ok(ProfileRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        display_name: row.get(2)?,
        avatar_url: row.get(3)?,
        spotify_user_id: row.get(4)?,
        spotify_connected: row.get(5)?,
        spotify_connected_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
