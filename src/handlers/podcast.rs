// src/handlers/podcast.rs

use axum::{extract::State, Json};

use crate::{config::AppState, services::podcast_service::LatestEpisode};

// GET /api/podcast/latest
#[utoipa::path(
    get,
    path = "/api/podcast/latest",
    tag = "Podcast",
    responses(
        (status = 200, description = "Último episódio, ou null", body = LatestEpisode)
    )
)]
pub async fn latest_episode(State(app_state): State<AppState>) -> Json<Option<LatestEpisode>> {
    Json(app_state.podcast_service.latest().await)
}
