use async_trait::async_trait;
use tracing::{debug, error};

use crate::database::{get_db_pool, DatabaseError, DatabasePool};
use crate::models::profile::ProfileRecord;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for user profiles
#[async_trait]
pub trait ProfileRepositoryTrait {
    /// Get the profile of a user
    async fn get_by_user(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError>;

    /// Insert or replace the profile of a user
    async fn upsert(&self, record: ProfileRecord) -> Result<ProfileRecord, RepositoryError>;
}

/// Repository for profiles with the same database-or-memory policy as
/// [`super::ClassRepository`]
#[derive(Debug, Clone, Default)]
pub struct ProfileRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl ProfileRepository {
    /// Create a repository backed by the global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository bound to a specific pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryStorage::new(),
        }
    }

    fn pool(&self) -> Result<DatabasePool, DatabaseError> {
        match &self.pool {
            Some(pool) => Ok(pool.clone()),
            None => get_db_pool(),
        }
    }
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn get_by_user(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        match self.pool() {
            Ok(pool) => match DatabaseStorage::get_profile(&pool, user_id).await {
                Ok(record) => Ok(record),
                Err(e) => {
                    error!("Failed to get profile from database: {}", e);
                    self.storage.get_profile(user_id).await
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for profiles", e);
                self.storage.get_profile(user_id).await
            }
        }
    }

    async fn upsert(&self, record: ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
        record.validate()?;
        match self.pool() {
            Ok(pool) => match DatabaseStorage::upsert_profile(&pool, &record).await {
                Ok(stored) => Ok(stored),
                Err(e) => {
                    error!("Failed to store profile in database: {}", e);
                    self.storage.upsert_profile(&record).await
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for profiles", e);
                self.storage.upsert_profile(&record).await
            }
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock profile repository backed by a map
    #[derive(Debug, Clone, Default)]
    pub struct MockProfileRepository {
        profiles: Arc<Mutex<HashMap<String, ProfileRecord>>>,
    }

    impl MockProfileRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ProfileRepositoryTrait for MockProfileRepository {
        async fn get_by_user(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
            Ok(self.profiles.lock()?.get(user_id).cloned())
        }

        async fn upsert(&self, record: ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
            self.profiles.lock()?.insert(record.user_id.clone(), record.clone());
            Ok(record)
        }
    }

    #[cfg(test)]
    mod behaviour {
        use super::*;

        #[tokio::test]
        async fn test_profile_round_trip_through_sqlite() {
            let repo = ProfileRepository::with_pool(DatabasePool::in_memory().unwrap());
            assert!(repo.get_by_user("user-1").await.unwrap().is_none());

            let mut record = ProfileRecord::empty(
                "p-1".to_string(),
                "user-1".to_string(),
                "2025-01-01T00:00:00Z".to_string(),
            );
            repo.upsert(record.clone()).await.unwrap();

            record.spotify_user_id = Some("spotify-42".to_string());
            record.spotify_connected = true;
            record.updated_at = "2025-01-02T00:00:00Z".to_string();
            repo.upsert(record.clone()).await.unwrap();

            let stored = repo.get_by_user("user-1").await.unwrap().unwrap();
            assert_eq!(stored, record);
        }

        #[tokio::test]
        async fn test_profile_in_memory_fallback() {
            let repo = ProfileRepository::new();
            let record = ProfileRecord::empty(
                "p-2".to_string(),
                "user-2".to_string(),
                "2025-01-01T00:00:00Z".to_string(),
            );
            repo.upsert(record.clone()).await.unwrap();
            assert_eq!(repo.get_by_user("user-2").await.unwrap(), Some(record));
        }
    }
}
