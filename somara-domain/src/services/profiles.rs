use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::entities::conversions;
use crate::entities::profile::{ConnectSpotifyRequest, Profile};
use crate::services::validation_message;
use somara_data::database::DatabasePool;
use somara_data::models::profile::ProfileRecord;
use somara_data::repository::{ProfileRepository, ProfileRepositoryTrait, RepositoryError};

/// Profile service errors
#[derive(Debug, Error)]
pub enum ProfileServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

#[async_trait]
pub trait ProfileServiceTrait {
    /// Profile of the user, created empty on first access
    async fn get_current_profile(&self, user_id: &str) -> Result<Profile, ProfileServiceError>;

    async fn connect_spotify(&self, user_id: &str, request: ConnectSpotifyRequest) -> Result<Profile, ProfileServiceError>;

    async fn is_spotify_connected(&self, user_id: &str) -> Result<bool, ProfileServiceError>;

    async fn disconnect_spotify(&self, user_id: &str) -> Result<Profile, ProfileServiceError>;
}

pub struct ProfileService<R: ProfileRepositoryTrait> {
    repository: R,
}

impl<R: ProfileRepositoryTrait + Send + Sync> ProfileService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn map_repo_error(&self, err: RepositoryError) -> ProfileServiceError {
        match err {
            RepositoryError::Validation(msg) => ProfileServiceError::ValidationError(msg),
            _ => ProfileServiceError::RepositoryError(err.to_string()),
        }
    }

    async fn save(&self, profile: &Profile) -> Result<Profile, ProfileServiceError> {
        let stored = self
            .repository
            .upsert(conversions::profile_to_record(profile))
            .await
            .map_err(|e| self.map_repo_error(e))?;
        Ok(conversions::record_to_profile(stored))
    }
}

#[async_trait]
impl<R: ProfileRepositoryTrait + Send + Sync> ProfileServiceTrait for ProfileService<R> {
    async fn get_current_profile(&self, user_id: &str) -> Result<Profile, ProfileServiceError> {
        let existing = self
            .repository
            .get_by_user(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        match existing {
            Some(record) => Ok(conversions::record_to_profile(record)),
            None => {
                let record = ProfileRecord::empty(
                    Uuid::new_v4().to_string(),
                    user_id.to_string(),
                    Utc::now().to_rfc3339(),
                );
                let stored = self
                    .repository
                    .upsert(record)
                    .await
                    .map_err(|e| self.map_repo_error(e))?;
                info!("Created profile for user {}", user_id);
                Ok(conversions::record_to_profile(stored))
            }
        }
    }

    async fn connect_spotify(&self, user_id: &str, request: ConnectSpotifyRequest) -> Result<Profile, ProfileServiceError> {
        request
            .validate()
            .map_err(|e| ProfileServiceError::ValidationError(validation_message(&e)))?;

        let mut profile = self.get_current_profile(user_id).await?;
        let now = Utc::now();
        profile.spotify_user_id = Some(request.spotify_user_id);
        profile.spotify_connected = true;
        profile.spotify_connected_at = Some(now);
        if request.display_name.is_some() {
            profile.display_name = request.display_name;
        }
        if request.avatar_url.is_some() {
            profile.avatar_url = request.avatar_url;
        }
        profile.updated_at = now;

        let profile = self.save(&profile).await?;
        info!("Connected Spotify account for user {}", user_id);
        Ok(profile)
    }

    async fn is_spotify_connected(&self, user_id: &str) -> Result<bool, ProfileServiceError> {
        Ok(self.get_current_profile(user_id).await?.spotify_connected)
    }

    async fn disconnect_spotify(&self, user_id: &str) -> Result<Profile, ProfileServiceError> {
        let mut profile = self.get_current_profile(user_id).await?;
        profile.spotify_user_id = None;
        profile.spotify_connected = false;
        profile.spotify_connected_at = None;
        profile.updated_at = Utc::now();

        let profile = self.save(&profile).await?;
        info!("Disconnected Spotify account for user {}", user_id);
        Ok(profile)
    }
}

pub fn create_default_profile_service() -> impl ProfileServiceTrait + Send + Sync {
    ProfileService::new(ProfileRepository::new())
}

pub fn create_profile_service_with_pool(pool: DatabasePool) -> impl ProfileServiceTrait + Send + Sync {
    ProfileService::new(ProfileRepository::with_pool(pool))
}
