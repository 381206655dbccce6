use async_trait::async_trait;
use tracing::{debug, error};

use crate::database::{get_db_pool, DatabaseError, DatabasePool};
use crate::models::class::ClassDocumentRecord;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for class documents
#[async_trait]
pub trait ClassRepositoryTrait {
    /// Insert or replace a class document
    async fn upsert(&self, record: ClassDocumentRecord) -> Result<ClassDocumentRecord, RepositoryError>;

    /// Get all class documents of a user, most recently updated first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ClassDocumentRecord>, RepositoryError>;

    /// Get a class document by ID
    async fn get(&self, user_id: &str, id: &str) -> Result<Option<ClassDocumentRecord>, RepositoryError>;

    /// Delete a class document, returning whether it existed
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;
}

/// Repository for class documents.
///
/// Uses the SQLite pool when one is available and falls back to in-memory
/// storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct ClassRepository {
    /// Explicit pool; the global pool is used when this is `None`
    pool: Option<DatabasePool>,
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl ClassRepository {
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
impl ClassRepositoryTrait for ClassRepository {
    async fn upsert(&self, record: ClassDocumentRecord) -> Result<ClassDocumentRecord, RepositoryError> {
        record.validate()?;
        match self.pool() {
            Ok(pool) => {
                debug!("Storing class document in database: {}", record.id);
                match DatabaseStorage::upsert_class(&pool, &record).await {
                    Ok(stored) => Ok(stored),
                    Err(e) => {
                        error!("Failed to store class document in database: {}", e);
                        self.storage.upsert_class(&record).await
                    }
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.upsert_class(&record).await
            }
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ClassDocumentRecord>, RepositoryError> {
        match self.pool() {
            Ok(pool) => match DatabaseStorage::list_classes(&pool, user_id).await {
                Ok(records) => Ok(records),
                Err(e) => {
                    error!("Failed to list class documents from database: {}", e);
                    self.storage.list_classes(user_id).await
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for list_for_user", e);
                self.storage.list_classes(user_id).await
            }
        }
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<ClassDocumentRecord>, RepositoryError> {
        match self.pool() {
            Ok(pool) => match DatabaseStorage::get_class(&pool, user_id, id).await {
                Ok(record) => Ok(record),
                Err(e) => {
                    error!("Failed to get class document {} from database: {}", id, e);
                    self.storage.get_class(user_id, id).await
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for get", e);
                self.storage.get_class(user_id, id).await
            }
        }
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        match self.pool() {
            Ok(pool) => match DatabaseStorage::delete_class(&pool, user_id, id).await {
                Ok(removed) => Ok(removed),
                Err(e) => {
                    error!("Failed to delete class document {} from database: {}", id, e);
                    self.storage.delete_class(user_id, id).await
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for delete", e);
                self.storage.delete_class(user_id, id).await
            }
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock class repository that keeps documents in a vector and can be
    /// told to fail every call
    #[derive(Debug, Clone, Default)]
    pub struct MockClassRepository {
        records: Arc<Mutex<Vec<ClassDocumentRecord>>>,
        fail: bool,
    }

    impl MockClassRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined documents
        pub fn with_records(records: Vec<ClassDocumentRecord>) -> Self {
            Self {
                records: Arc::new(Mutex::new(records)),
                fail: false,
            }
        }

        /// Make every call return a database error
        pub fn failing() -> Self {
            Self {
                records: Arc::default(),
                fail: true,
            }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Database(DatabaseError::GenericError(
                    "mock failure".to_string(),
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ClassRepositoryTrait for MockClassRepository {
        async fn upsert(&self, record: ClassDocumentRecord) -> Result<ClassDocumentRecord, RepositoryError> {
            self.check()?;
            let mut records = self.records.lock()?;
            records.retain(|r| !(r.user_id == record.user_id && r.id == record.id));
            records.push(record.clone());
            Ok(record)
        }

        async fn list_for_user(&self, user_id: &str) -> Result<Vec<ClassDocumentRecord>, RepositoryError> {
            self.check()?;
            let records = self.records.lock()?;
            let mut found: Vec<_> = records.iter().filter(|r| r.user_id == user_id).cloned().collect();
            found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(found)
        }

        async fn get(&self, user_id: &str, id: &str) -> Result<Option<ClassDocumentRecord>, RepositoryError> {
            self.check()?;
            let records = self.records.lock()?;
            Ok(records.iter().find(|r| r.user_id == user_id && r.id == id).cloned())
        }

        async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
            self.check()?;
            let mut records = self.records.lock()?;
            let before = records.len();
            records.retain(|r| !(r.user_id == user_id && r.id == id));
            Ok(records.len() != before)
        }
    }

    #[cfg(test)]
    mod behaviour {
        use super::*;

        fn record(id: &str, user_id: &str, updated_at: i64) -> ClassDocumentRecord {
            ClassDocumentRecord {
                id: id.to_string(),
                user_id: user_id.to_string(),
                document: format!("{{\"id\":\"{}\"}}", id),
                created_at: 1_000,
                updated_at,
            }
        }

        async fn exercise_repository(repo: &ClassRepository) {
            repo.upsert(record("a", "user-1", 2_000)).await.unwrap();
            repo.upsert(record("b", "user-1", 3_000)).await.unwrap();
            repo.upsert(record("c", "user-2", 4_000)).await.unwrap();

            let listed = repo.list_for_user("user-1").await.unwrap();
            let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec!["b", "a"]);

            // Another user cannot see the document
            assert!(repo.get("user-2", "a").await.unwrap().is_none());

            // Upsert keeps created_at from the first write
            let mut changed = record("a", "user-1", 5_000);
            changed.created_at = 9_999;
            changed.document = "{\"id\":\"a\",\"theme\":\"x\"}".to_string();
            let stored = repo.upsert(changed).await.unwrap();
            assert_eq!(stored.created_at, 1_000);
            assert_eq!(stored.updated_at, 5_000);

            assert!(repo.delete("user-1", "a").await.unwrap());
            assert!(!repo.delete("user-1", "a").await.unwrap());
            assert_eq!(repo.list_for_user("user-1").await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_repository_in_memory_fallback() {
            // No global pool is initialized in unit tests
            let repo = ClassRepository::new();
            exercise_repository(&repo).await;
        }

        #[tokio::test]
        async fn test_repository_with_sqlite_pool() {
            let pool = DatabasePool::in_memory().unwrap();
            let repo = ClassRepository::with_pool(pool);
            exercise_repository(&repo).await;
        }

        #[tokio::test]
        async fn test_upsert_rejects_records_without_owner() {
            let repo = ClassRepository::new();
            let err = repo.upsert(record("a", " ", 1_000)).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Validation(_)));
        }

        #[tokio::test]
        async fn test_failing_mock_reports_database_error() {
            let repo = MockClassRepository::failing();
            let err = repo.list_for_user("user-1").await.unwrap_err();
            assert!(matches!(err, RepositoryError::Database(_)));
        }
    }
}
