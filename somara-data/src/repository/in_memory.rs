use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::class::ClassDocumentRecord;
use crate::models::profile::ProfileRecord;
use super::errors::RepositoryError;

type ClassKey = (String, String);

/// In-memory storage used when the database is not available
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    /// Class documents keyed by (user_id, class_id)
    classes: Arc<Mutex<HashMap<ClassKey, ClassDocumentRecord>>>,
    /// Profiles keyed by user_id
    profiles: Arc<Mutex<HashMap<String, ProfileRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a class document
    pub async fn upsert_class(&self, record: &ClassDocumentRecord) -> Result<ClassDocumentRecord, RepositoryError> {
        let mut store = self.classes.lock()?;
        let key = (record.user_id.clone(), record.id.clone());

        // The first write decides created_at, like the SQL upsert
        let stored = match store.get(&key) {
            Some(existing) => ClassDocumentRecord {
                created_at: existing.created_at,
                ..record.clone()
            },
            None => record.clone(),
        };
        store.insert(key, stored.clone());
        Ok(stored)
    }

    /// All class documents for a user, most recently updated first
    pub async fn list_classes(&self, user_id: &str) -> Result<Vec<ClassDocumentRecord>, RepositoryError> {
        let store = self.classes.lock()?;
        let mut records: Vec<ClassDocumentRecord> = store
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    pub async fn get_class(&self, user_id: &str, id: &str) -> Result<Option<ClassDocumentRecord>, RepositoryError> {
        let store = self.classes.lock()?;
        Ok(store.get(&(user_id.to_string(), id.to_string())).cloned())
    }

    /// Remove a class document, returning whether it existed
    pub async fn delete_class(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.classes.lock()?;
        Ok(store.remove(&(user_id.to_string(), id.to_string())).is_some())
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        let store = self.profiles.lock()?;
        Ok(store.get(user_id).cloned())
    }

    pub async fn upsert_profile(&self, record: &ProfileRecord) -> Result<ProfileRecord, RepositoryError> {
        let mut store = self.profiles.lock()?;
        store.insert(record.user_id.clone(), record.clone());
        Ok(record.clone())
    }
}
