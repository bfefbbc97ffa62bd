use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{config::Config, services::AppServices};

pub mod auth;
pub mod challenges;
pub mod leaderboards;
pub mod scores;
pub mod tracks;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check OK")
    )
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn init_routes(services: &AppServices, config: Arc<Config>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(auth::auth_routes(services.users.clone(), config.clone()))
        .merge(leaderboards::leaderboard_routes(services.leaderboards.clone()))
        .merge(challenges::challenge_routes(services.challenges.clone(), config.clone()))
        .merge(tracks::track_routes(services.tracks.clone(), config.clone()))
        .merge(scores::score_routes(services.scores.clone(), config))
}
