use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use somara_domain::auth::{auth_middleware, configure_auth, AuthConfig};
use somara_domain::health::{HealthService, HealthServiceTrait};
use somara_domain::services::{
    create_default_class_service, create_default_profile_service, ClassServiceTrait, ProfileServiceTrait,
};
use somara_domain::spotify::{SpotifyClient, SpotifyConfig};

use crate::api::handlers::{classes, health, phases, playback, profiles, rhythms, spotify, tracks};
use crate::openapi::configure_swagger_routes;

pub type ClassServiceRef = Arc<dyn ClassServiceTrait + Send + Sync>;
pub type ProfileServiceRef = Arc<dyn ProfileServiceTrait + Send + Sync>;
pub type HealthServiceRef = Arc<dyn HealthServiceTrait + Send + Sync>;
pub type SpotifyClientRef = Arc<SpotifyClient>;

/// Shared state of every route; handlers pick their piece through `FromRef`
#[derive(Clone)]
pub struct AppState {
    pub classes: ClassServiceRef,
    pub profiles: ProfileServiceRef,
    pub health: HealthServiceRef,
    pub spotify: SpotifyClientRef,
    pub auth: Arc<AuthConfig>,
}

impl FromRef<AppState> for ClassServiceRef {
    fn from_ref(state: &AppState) -> Self {
        state.classes.clone()
    }
}

impl FromRef<AppState> for ProfileServiceRef {
    fn from_ref(state: &AppState) -> Self {
        state.profiles.clone()
    }
}

impl FromRef<AppState> for HealthServiceRef {
    fn from_ref(state: &AppState) -> Self {
        state.health.clone()
    }
}

impl FromRef<AppState> for SpotifyClientRef {
    fn from_ref(state: &AppState) -> Self {
        state.spotify.clone()
    }
}

/// Build the application state from environment configuration
pub fn create_state() -> Result<AppState, somara_domain::spotify::SpotifyError> {
    let auth = AuthConfig::from_env();
    if let Err(problems) = auth.validate() {
        for problem in problems {
            warn!("Auth configuration: {}", problem);
        }
    }

    let spotify_config = SpotifyConfig::from_env();
    if let Err(problems) = spotify_config.validate() {
        for problem in problems {
            warn!("Spotify configuration: {}", problem);
        }
    }

    Ok(AppState {
        classes: Arc::new(create_default_class_service()),
        profiles: Arc::new(create_default_profile_service()),
        health: Arc::new(HealthService::new(spotify_config.clone())),
        spotify: Arc::new(SpotifyClient::new(spotify_config)?),
        auth: Arc::new(auth),
    })
}

/// Create the application router from environment configuration
pub async fn create_app() -> anyhow::Result<Router> {
    let state = create_state().map_err(|e| {
        error!("Failed to set up the Spotify client: {}", e);
        e
    })?;
    Ok(create_router(state))
}

fn spotify_routes() -> Router<AppState> {
    Router::new()
        .route("/authorize", get(spotify::authorize))
        .route("/token", post(spotify::exchange_token))
        .route("/refresh", post(spotify::refresh_token))
        .route("/callback", get(spotify::callback))
        .route("/user", get(spotify::current_user))
        .route("/playlists", get(spotify::playlists))
        .route("/playlist", get(spotify::playlist))
        .route("/playlist-info", get(spotify::playlist_info))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Specific routes before parametrised ones
        .route("/classes/import", post(classes::import_class))
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route(
            "/classes/:id",
            get(classes::get_class)
                .put(classes::save_class)
                .patch(classes::update_class_details)
                .delete(classes::delete_class),
        )
        .route("/classes/:id/duplicate", post(classes::duplicate_class))
        .route("/classes/:id/export", get(classes::export_class))
        .route("/classes/:id/phases", post(phases::add_phase))
        .route("/classes/:id/phases/reorder", post(phases::reorder_phases))
        .route(
            "/classes/:id/phases/:phase_id",
            put(phases::update_phase).delete(phases::delete_phase),
        )
        .route("/classes/:id/tracks", post(tracks::add_track))
        .route(
            "/classes/:id/tracks/:track_id",
            put(tracks::update_track).delete(tracks::remove_track),
        )
        .route("/classes/:id/tracks/:track_id/move", post(tracks::move_track))
        .route("/classes/:id/tracks/:track_id/resize", post(tracks::resize_track))
        .route("/classes/:id/playback", get(playback::playback_status))
        .route("/profile", get(profiles::get_profile))
        .route(
            "/profile/spotify",
            post(profiles::connect_spotify).delete(profiles::disconnect_spotify),
        )
        .route("/rhythms/presets", get(rhythms::presets))
}

/// Assemble every route around an existing state
pub fn create_router(state: AppState) -> Router {
    debug!("Creating application router");

    let api = api_routes().route_layer(middleware::from_fn_with_state(state.auth.clone(), auth_middleware));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/spotify", spotify_routes())
        .nest("/api/v1", api)
        .with_state(state)
        .merge(configure_swagger_routes());

    health::initialize_server_start_time();

    configure_auth(app).layer(TraceLayer::new_for_http())
}
