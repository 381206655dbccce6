use serde::{Deserialize, Serialize};

use crate::repository::RepositoryError;

/// A stored user profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Profile ID
    pub id: String,
    /// ID of the user in the auth provider
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Spotify account ID once connected
    pub spotify_user_id: Option<String>,
    pub spotify_connected: bool,
    /// RFC 3339 timestamp of the last Spotify connection
    pub spotify_connected_at: Option<String>,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    /// RFC 3339 update timestamp
    pub updated_at: String,
}

impl ProfileRecord {
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.user_id.trim().is_empty() {
            return Err(RepositoryError::Validation("profile user id is required".to_string()));
        }
        Ok(())
    }

    /// Blank profile for a user seen for the first time
    pub fn empty(id: String, user_id: String, now: String) -> Self {
        Self {
            id,
            user_id,
            display_name: None,
            avatar_url: None,
            spotify_user_id: None,
            spotify_connected: false,
            spotify_connected_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
