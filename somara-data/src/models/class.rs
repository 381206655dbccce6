use serde::{Deserialize, Serialize};

use crate::repository::RepositoryError;

/// A stored class document.
///
/// The class itself is opaque to this layer and is kept as serialized JSON.
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDocumentRecord {
    pub id: String,
    pub user_id: String,
    pub document: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ClassDocumentRecord {
    /// Keys must be present before a record can be written
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.id.trim().is_empty() {
            return Err(RepositoryError::Validation("class id is required".to_string()));
        }
        if self.user_id.trim().is_empty() {
            return Err(RepositoryError::Validation("class owner is required".to_string()));
        }
        Ok(())
    }
}
