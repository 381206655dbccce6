use axum::Json;

use somara_domain::entities::BreathingRhythm;

/// Default rhythm of each breathing technique
#[utoipa::path(
    get,
    path = "/api/v1/rhythms/presets",
    responses(
        (status = 200, description = "Rhythm presets", body = [BreathingRhythm])
    ),
    security(("bearer" = [])),
    tag = "rhythms"
)]
pub async fn presets() -> Json<Vec<BreathingRhythm>> {
    Json(BreathingRhythm::presets())
}
