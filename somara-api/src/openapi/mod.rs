use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "spotify",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,

        // Classes
        crate::api::handlers::classes::list_classes,
        crate::api::handlers::classes::create_class,
        crate::api::handlers::classes::get_class,
        crate::api::handlers::classes::save_class,
        crate::api::handlers::classes::update_class_details,
        crate::api::handlers::classes::delete_class,
        crate::api::handlers::classes::duplicate_class,
        crate::api::handlers::classes::export_class,
        crate::api::handlers::classes::import_class,

        // Phases
        crate::api::handlers::phases::add_phase,
        crate::api::handlers::phases::update_phase,
        crate::api::handlers::phases::delete_phase,
        crate::api::handlers::phases::reorder_phases,

        // Timeline
        crate::api::handlers::tracks::add_track,
        crate::api::handlers::tracks::update_track,
        crate::api::handlers::tracks::remove_track,
        crate::api::handlers::tracks::move_track,
        crate::api::handlers::tracks::resize_track,

        crate::api::handlers::playback::playback_status,
        crate::api::handlers::profiles::get_profile,
        crate::api::handlers::profiles::connect_spotify,
        crate::api::handlers::profiles::disconnect_spotify,
        crate::api::handlers::rhythms::presets,

        // Spotify proxy
        crate::api::handlers::spotify::authorize,
        crate::api::handlers::spotify::exchange_token,
        crate::api::handlers::spotify::refresh_token,
        crate::api::handlers::spotify::callback,
        crate::api::handlers::spotify::current_user,
        crate::api::handlers::spotify::playlists,
        crate::api::handlers::spotify::playlist,
        crate::api::handlers::spotify::playlist_info
    ),
    components(
        schemas(
            crate::entities::common::ErrorResponse,
            crate::entities::classes::AddPhaseRequest,
            crate::entities::classes::ReorderPhasesRequest,
            crate::entities::classes::AddTrackRequest,
            crate::entities::classes::MoveTrackRequest,
            crate::entities::classes::MoveTrackResponse,
            crate::entities::classes::ResizeTrackRequest,
            crate::entities::spotify::TokenRequest,
            crate::entities::spotify::RefreshRequest,
            crate::entities::spotify::PlaylistsResponse,
            crate::entities::spotify::SpotifyErrorResponse,

            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,

            somara_domain::entities::BreathworkClass,
            somara_domain::entities::BreathworkPhase,
            somara_domain::entities::PhaseType,
            somara_domain::entities::CreateClassRequest,
            somara_domain::entities::UpdateClassRequest,
            somara_domain::entities::PhaseChanges,
            somara_domain::entities::BreathingRhythm,
            somara_domain::entities::BreathingType,
            somara_domain::entities::BreathCue,
            somara_domain::entities::PhaseTrack,
            somara_domain::entities::SpotifyTrack,
            somara_domain::entities::SpotifyPlaylist,
            somara_domain::entities::TrackFeatures,
            somara_domain::entities::Profile,
            somara_domain::entities::ConnectSpotifyRequest,
            somara_domain::services::PlaybackStatus,
            somara_domain::services::ResizeEdge,
            somara_domain::services::TrackChanges,
            somara_domain::spotify::AuthorizeRequest,
            somara_domain::spotify::RefreshedToken,
            somara_domain::spotify::SpotifyUser,
            somara_domain::spotify::PlaylistSummary,
            somara_domain::auth::UserInfo
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "classes", description = "Breathwork class documents"),
        (name = "phases", description = "Phases of a class"),
        (name = "tracks", description = "Tracks placed on the class timeline"),
        (name = "playback", description = "Where a class is at a given second"),
        (name = "profile", description = "Listener profile and Spotify link"),
        (name = "rhythms", description = "Breathing rhythm presets"),
        (name = "spotify", description = "Spotify accounts and Web API proxy")
    ),
    info(
        title = "Somara API",
        version = "0.1.0",
        description = "Build breathwork classes and sync them to Spotify playlists",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Somara API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags should be defined");
        assert!(tags.iter().any(|tag| tag.name == "classes"));
        assert!(tags.iter().any(|tag| tag.name == "spotify"));

        let paths = &openapi.paths.paths;
        for path in [
            "/health",
            "/api/v1/classes",
            "/api/v1/classes/{id}",
            "/api/v1/classes/{id}/export",
            "/api/v1/classes/import",
            "/api/v1/classes/{id}/phases/reorder",
            "/api/v1/classes/{id}/tracks/{track_id}/resize",
            "/api/v1/classes/{id}/playback",
            "/api/v1/profile/spotify",
            "/api/v1/rhythms/presets",
            "/api/spotify/authorize",
            "/api/spotify/playlist-info",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_security_schemes_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components should be defined");

        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.security_schemes.contains_key("spotify"));
    }
}
