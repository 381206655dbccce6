use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::entities::class::{
    BreathworkClass, BreathworkPhase, CreateClassRequest, PhaseChanges, PhaseType, UpdateClassRequest,
};
use crate::entities::conversions;
use crate::entities::track::{PhaseTrack, SpotifyTrack};
use crate::services::phases;
use crate::services::playback::{PlaybackSession, PlaybackStatus};
use crate::services::timeline::{self, ResizeEdge, TimelineError, TrackChanges};
use crate::services::validation_message;
use somara_data::database::DatabasePool;
use somara_data::repository::{ClassRepository, ClassRepositoryTrait, RepositoryError};

/// Class service errors
#[derive(Debug, Error)]
pub enum ClassServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// A stored document could not be written or read back
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<TimelineError> for ClassServiceError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::PhaseNotFound(_) | TimelineError::TrackNotFound(_) => {
                ClassServiceError::NotFound(err.to_string())
            }
            TimelineError::FixedPhase(_) | TimelineError::InvalidInput(_) => {
                ClassServiceError::ValidationError(err.to_string())
            }
        }
    }
}

/// Operations on a user's class documents
#[async_trait]
pub trait ClassServiceTrait {
    async fn list_classes(&self, user_id: &str) -> Result<Vec<BreathworkClass>, ClassServiceError>;

    async fn get_class(&self, user_id: &str, id: &str) -> Result<BreathworkClass, ClassServiceError>;

    /// Store a class, stamping `updated_at` (and `created_at` for new ones)
    async fn save_class(&self, user_id: &str, class: BreathworkClass) -> Result<BreathworkClass, ClassServiceError>;

    async fn create_class(&self, user_id: &str, request: CreateClassRequest) -> Result<BreathworkClass, ClassServiceError>;

    async fn update_class_details(
        &self,
        user_id: &str,
        id: &str,
        changes: UpdateClassRequest,
    ) -> Result<BreathworkClass, ClassServiceError>;

    async fn delete_class(&self, user_id: &str, id: &str) -> Result<(), ClassServiceError>;

    async fn duplicate_class(&self, user_id: &str, id: &str) -> Result<BreathworkClass, ClassServiceError>;

    /// Pretty-printed JSON document
    async fn export_class(&self, user_id: &str, id: &str) -> Result<String, ClassServiceError>;

    async fn import_class(&self, user_id: &str, json: &str) -> Result<BreathworkClass, ClassServiceError>;

    async fn add_phase(&self, user_id: &str, id: &str, phase_type: PhaseType) -> Result<BreathworkClass, ClassServiceError>;

    async fn update_phase(
        &self,
        user_id: &str,
        id: &str,
        phase_id: &str,
        changes: PhaseChanges,
    ) -> Result<BreathworkPhase, ClassServiceError>;

    async fn delete_phase(&self, user_id: &str, id: &str, phase_id: &str) -> Result<BreathworkClass, ClassServiceError>;

    async fn reorder_phases(
        &self,
        user_id: &str,
        id: &str,
        active_id: &str,
        over_id: &str,
    ) -> Result<BreathworkClass, ClassServiceError>;

    async fn add_track(
        &self,
        user_id: &str,
        id: &str,
        track: SpotifyTrack,
        start: Option<f64>,
    ) -> Result<PhaseTrack, ClassServiceError>;

    async fn update_track(
        &self,
        user_id: &str,
        id: &str,
        track_id: &str,
        changes: TrackChanges,
    ) -> Result<PhaseTrack, ClassServiceError>;

    async fn remove_track(&self, user_id: &str, id: &str, track_id: &str) -> Result<(), ClassServiceError>;

    /// Drop a dragged track near `proposed`. Returns the class and whether
    /// the track moved.
    async fn move_track(
        &self,
        user_id: &str,
        id: &str,
        track_id: &str,
        proposed: f64,
    ) -> Result<(BreathworkClass, bool), ClassServiceError>;

    async fn resize_track(
        &self,
        user_id: &str,
        id: &str,
        track_id: &str,
        edge: ResizeEdge,
        delta_seconds: f64,
    ) -> Result<PhaseTrack, ClassServiceError>;

    /// Playback snapshot `seconds` into the class
    async fn playback_status(&self, user_id: &str, id: &str, seconds: f64) -> Result<PlaybackStatus, ClassServiceError>;
}

/// Class service backed by a class repository
pub struct ClassService<R: ClassRepositoryTrait> {
    repository: R,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Bring a loaded document up to date: lift legacy phase tracks onto the
/// timeline and recompute the total from its phases
fn normalize(class: &mut BreathworkClass) {
    if timeline::migrate_phase_tracks(class) {
        debug!("Migrated phase tracks of class {} to the class timeline", class.id);
    }
    phases::recompute_total_duration(class);
}

impl<R: ClassRepositoryTrait + Send + Sync> ClassService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn map_repo_error(&self, err: RepositoryError) -> ClassServiceError {
        match err {
            RepositoryError::Validation(msg) => ClassServiceError::ValidationError(msg),
            _ => ClassServiceError::RepositoryError(err.to_string()),
        }
    }

    async fn load(&self, user_id: &str, id: &str) -> Result<BreathworkClass, ClassServiceError> {
        let record = self
            .repository
            .get(user_id, id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| ClassServiceError::NotFound(format!("Class with ID {} not found", id)))?;

        let mut class = conversions::record_to_class(&record)
            .map_err(|e| ClassServiceError::SerializationError(e.to_string()))?;
        normalize(&mut class);
        Ok(class)
    }

    async fn store(&self, user_id: &str, mut class: BreathworkClass) -> Result<BreathworkClass, ClassServiceError> {
        let now = now_millis();
        if class.created_at == 0 {
            class.created_at = now;
        }
        class.updated_at = now;

        let record = conversions::class_to_record(user_id, &class)
            .map_err(|e| ClassServiceError::SerializationError(e.to_string()))?;
        self.repository
            .upsert(record)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        Ok(class)
    }

    /// Load a class, apply an edit and save it
    async fn edit<T, F>(&self, user_id: &str, id: &str, edit: F) -> Result<(BreathworkClass, T), ClassServiceError>
    where
        F: FnOnce(&mut BreathworkClass) -> Result<T, TimelineError> + Send,
        T: Send,
    {
        let mut class = self.load(user_id, id).await?;
        let output = edit(&mut class)?;
        let class = self.store(user_id, class).await?;
        Ok((class, output))
    }
}

#[async_trait]
impl<R: ClassRepositoryTrait + Send + Sync> ClassServiceTrait for ClassService<R> {
    async fn list_classes(&self, user_id: &str) -> Result<Vec<BreathworkClass>, ClassServiceError> {
        let records = self
            .repository
            .list_for_user(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let classes = records
            .iter()
            .filter_map(|record| match conversions::record_to_class(record) {
                Ok(mut class) => {
                    normalize(&mut class);
                    Some(class)
                }
                Err(e) => {
                    warn!("Skipping unreadable class document {}: {}", record.id, e);
                    None
                }
            })
            .collect();
        Ok(classes)
    }

    async fn get_class(&self, user_id: &str, id: &str) -> Result<BreathworkClass, ClassServiceError> {
        self.load(user_id, id).await
    }

    async fn save_class(&self, user_id: &str, mut class: BreathworkClass) -> Result<BreathworkClass, ClassServiceError> {
        normalize(&mut class);
        self.store(user_id, class).await
    }

    async fn create_class(&self, user_id: &str, request: CreateClassRequest) -> Result<BreathworkClass, ClassServiceError> {
        request
            .validate()
            .map_err(|e| ClassServiceError::ValidationError(validation_message(&e)))?;

        let mut class = BreathworkClass::new(Uuid::new_v4().to_string());
        class.theme = request.theme;
        class.description = request.description;
        class.is_online = request.is_online;
        class.location = request.location;
        class.time = request.time;
        phases::ensure_default_phases(&mut class);

        let class = self.store(user_id, class).await?;
        info!("Created class {} for user {}", class.id, user_id);
        Ok(class)
    }

    async fn update_class_details(
        &self,
        user_id: &str,
        id: &str,
        changes: UpdateClassRequest,
    ) -> Result<BreathworkClass, ClassServiceError> {
        changes
            .validate()
            .map_err(|e| ClassServiceError::ValidationError(validation_message(&e)))?;

        let mut class = self.load(user_id, id).await?;
        if let Some(theme) = changes.theme {
            class.theme = theme;
        }
        if let Some(description) = changes.description {
            class.description = description;
        }
        if let Some(is_online) = changes.is_online {
            class.is_online = Some(is_online);
        }
        if let Some(location) = changes.location {
            class.location = location;
        }
        if let Some(time) = changes.time {
            class.time = time;
        }
        if let Some(playlist) = changes.spotify_playlist {
            class.spotify_playlist = playlist;
        }
        self.store(user_id, class).await
    }

    async fn delete_class(&self, user_id: &str, id: &str) -> Result<(), ClassServiceError> {
        let deleted = self
            .repository
            .delete(user_id, id)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        if !deleted {
            return Err(ClassServiceError::NotFound(format!("Class with ID {} not found", id)));
        }
        info!("Deleted class {} for user {}", id, user_id);
        Ok(())
    }

    async fn duplicate_class(&self, user_id: &str, id: &str) -> Result<BreathworkClass, ClassServiceError> {
        let mut copy = self.load(user_id, id).await?;
        let now = now_millis();
        copy.id = Uuid::new_v4().to_string();
        copy.theme = copy.theme.map(|theme| format!("{} (Copy)", theme));
        copy.created_at = now;
        copy.updated_at = now;
        self.store(user_id, copy).await
    }

    async fn export_class(&self, user_id: &str, id: &str) -> Result<String, ClassServiceError> {
        let class = self.load(user_id, id).await?;
        serde_json::to_string_pretty(&class).map_err(|e| ClassServiceError::SerializationError(e.to_string()))
    }

    async fn import_class(&self, user_id: &str, json: &str) -> Result<BreathworkClass, ClassServiceError> {
        let mut class: BreathworkClass = serde_json::from_str(json)
            .map_err(|e| ClassServiceError::ValidationError(format!("Invalid class file: {}", e)))?;

        let now = now_millis();
        class.id = Uuid::new_v4().to_string();
        class.created_at = now;
        class.updated_at = now;
        normalize(&mut class);

        let class = self.store(user_id, class).await?;
        info!("Imported class {} for user {}", class.id, user_id);
        Ok(class)
    }

    async fn add_phase(&self, user_id: &str, id: &str, phase_type: PhaseType) -> Result<BreathworkClass, ClassServiceError> {
        let (class, _) = self
            .edit(user_id, id, |class| phases::add_phase(class, phase_type))
            .await?;
        Ok(class)
    }

    async fn update_phase(
        &self,
        user_id: &str,
        id: &str,
        phase_id: &str,
        changes: PhaseChanges,
    ) -> Result<BreathworkPhase, ClassServiceError> {
        changes
            .validate()
            .map_err(|e| ClassServiceError::ValidationError(validation_message(&e)))?;

        let (_, phase) = self
            .edit(user_id, id, |class| phases::update_phase(class, phase_id, changes))
            .await?;
        Ok(phase)
    }

    async fn delete_phase(&self, user_id: &str, id: &str, phase_id: &str) -> Result<BreathworkClass, ClassServiceError> {
        let (class, _) = self
            .edit(user_id, id, |class| phases::delete_phase(class, phase_id))
            .await?;
        Ok(class)
    }

    async fn reorder_phases(
        &self,
        user_id: &str,
        id: &str,
        active_id: &str,
        over_id: &str,
    ) -> Result<BreathworkClass, ClassServiceError> {
        let (class, _) = self
            .edit(user_id, id, |class| phases::reorder_phase(class, active_id, over_id))
            .await?;
        Ok(class)
    }

    async fn add_track(
        &self,
        user_id: &str,
        id: &str,
        track: SpotifyTrack,
        start: Option<f64>,
    ) -> Result<PhaseTrack, ClassServiceError> {
        let (_, placed) = self
            .edit(user_id, id, |class| Ok(timeline::add_track(class, &track, start)))
            .await?;
        Ok(placed)
    }

    async fn update_track(
        &self,
        user_id: &str,
        id: &str,
        track_id: &str,
        changes: TrackChanges,
    ) -> Result<PhaseTrack, ClassServiceError> {
        let (_, track) = self
            .edit(user_id, id, |class| timeline::update_track(class, track_id, &changes))
            .await?;
        Ok(track)
    }

    async fn remove_track(&self, user_id: &str, id: &str, track_id: &str) -> Result<(), ClassServiceError> {
        self.edit(user_id, id, |class| timeline::remove_track(class, track_id))
            .await?;
        Ok(())
    }

    async fn move_track(
        &self,
        user_id: &str,
        id: &str,
        track_id: &str,
        proposed: f64,
    ) -> Result<(BreathworkClass, bool), ClassServiceError> {
        self.edit(user_id, id, |class| timeline::drop_track(class, track_id, proposed))
            .await
    }

    async fn resize_track(
        &self,
        user_id: &str,
        id: &str,
        track_id: &str,
        edge: ResizeEdge,
        delta_seconds: f64,
    ) -> Result<PhaseTrack, ClassServiceError> {
        let (_, track) = self
            .edit(user_id, id, |class| timeline::resize_track(class, track_id, edge, delta_seconds))
            .await?;
        Ok(track)
    }

    async fn playback_status(&self, user_id: &str, id: &str, seconds: f64) -> Result<PlaybackStatus, ClassServiceError> {
        let class = self.load(user_id, id).await?;
        let mut session = PlaybackSession::new(class);
        session.seek(seconds);
        Ok(session.status())
    }
}

/// Class service over the global database pool, falling back to memory
pub fn create_default_class_service() -> impl ClassServiceTrait + Send + Sync {
    ClassService::new(ClassRepository::new())
}

/// Class service bound to a specific pool
pub fn create_class_service_with_pool(pool: DatabasePool) -> impl ClassServiceTrait + Send + Sync {
    ClassService::new(ClassRepository::with_pool(pool))
}
