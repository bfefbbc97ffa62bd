use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::{
    error::AppError,
    models::{
        challenge::{CAMPAIGN_CHALLENGE_ID, WEEKLY_CHALLENGE_ID},
        leaderboard::{
            BulkLeaderboardEntry, BulkLeaderboardQuery, CampaignLeaderboard, GlobalLeaderboard,
            TrackLeaderboard,
        },
        response::ApiResponse,
    },
    services::leaderboard_service::LeaderboardService,
};

#[utoipa::path(
    get,
    path = "/tracks/{id}/leaderboard",
    params(("id" = String, Path, description = "Track ID, or weekly-challenge / campaign-challenge")),
    responses(
        (status = 200, description = "Ranked scores with positions and medals", body = TrackLeaderboard),
        (status = 404, description = "Track not found")
    )
)]
pub async fn get_track_leaderboard(
    State(leaderboard_service): State<Arc<LeaderboardService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TrackLeaderboard>>, AppError> {
    let board = leaderboard_service.track_leaderboard(&id).await?;
    Ok(Json(ApiResponse::ok(board)))
}

async fn challenge_leaderboard(
    State(leaderboard_service): State<Arc<LeaderboardService>>,
    id: &str,
) -> Result<Json<ApiResponse<TrackLeaderboard>>, AppError> {
    let board = leaderboard_service.track_leaderboard(id).await?;
    Ok(Json(ApiResponse::ok(board)))
}

#[utoipa::path(
    get,
    path = "/tracks/global-leaderboard",
    responses(
        (status = 200, description = "Cross-track rankings", body = GlobalLeaderboard)
    )
)]
pub async fn get_global_leaderboard(
    State(leaderboard_service): State<Arc<LeaderboardService>>,
) -> Result<Json<ApiResponse<GlobalLeaderboard>>, AppError> {
    Ok(Json(ApiResponse::ok(leaderboard_service.global().await?)))
}

#[utoipa::path(
    get,
    path = "/tracks/campaign-leaderboard",
    responses(
        (status = 200, description = "Campaign point rankings", body = CampaignLeaderboard)
    )
)]
pub async fn get_campaign_leaderboard(
    State(leaderboard_service): State<Arc<LeaderboardService>>,
) -> Result<Json<ApiResponse<CampaignLeaderboard>>, AppError> {
    Ok(Json(ApiResponse::ok(leaderboard_service.campaign().await?)))
}

#[utoipa::path(
    get,
    path = "/tracks/bulk-leaderboards",
    params(("trackIds" = String, Query, description = "Comma separated track ids, at most 20")),
    responses(
        (status = 200, description = "One entry per requested id, failures inline", body = [BulkLeaderboardEntry]),
        (status = 400, description = "Missing or too many track ids")
    )
)]
pub async fn get_bulk_leaderboards(
    State(leaderboard_service): State<Arc<LeaderboardService>>,
    query: Result<Query<BulkLeaderboardQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<BulkLeaderboardEntry>>>, AppError> {
    let Query(query) = query?;
    let entries = leaderboard_service.bulk(&query.track_ids).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

pub fn leaderboard_routes(leaderboard_service: Arc<LeaderboardService>) -> Router {
    Router::new()
        .route("/tracks/{id}/leaderboard", get(get_track_leaderboard))
        .route(
            "/tracks/weekly-challenge/leaderboard",
            get(|state: State<Arc<LeaderboardService>>| challenge_leaderboard(state, WEEKLY_CHALLENGE_ID)),
        )
        .route(
            "/tracks/campaign-challenge/leaderboard",
            get(|state: State<Arc<LeaderboardService>>| challenge_leaderboard(state, CAMPAIGN_CHALLENGE_ID)),
        )
        .route("/tracks/global-leaderboard", get(get_global_leaderboard))
        .route("/tracks/campaign-leaderboard", get(get_campaign_leaderboard))
        .route("/tracks/bulk-leaderboards", get(get_bulk_leaderboards))
        .with_state(leaderboard_service)
}
