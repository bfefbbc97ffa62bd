use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::{auth_middleware, require_admin},
    models::{
        challenge::{ChallengeKind, ChallengeResponse, ChallengeTrackResponse, UpdateChallengeRequest},
        response::ApiResponse,
    },
    services::challenge_service::ChallengeService,
};

async fn current(
    challenge_service: &ChallengeService,
    kind: ChallengeKind,
) -> Result<Json<ApiResponse<ChallengeResponse>>, AppError> {
    let challenge = challenge_service.current_with_participants(kind).await?;
    Ok(Json(ApiResponse::ok(challenge)))
}

async fn repoint(
    challenge_service: &ChallengeService,
    kind: ChallengeKind,
    payload: Result<Json<UpdateChallengeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChallengeTrackResponse>>, AppError> {
    let Json(req) = payload?;
    let slot = challenge_service.repoint(kind, &req.track_id).await?;
    let message = match kind {
        ChallengeKind::Weekly => "Weekly challenge updated",
        ChallengeKind::Campaign => "Campaign challenge updated",
    };
    Ok(Json(ApiResponse::with_message(slot.into(), message)))
}

#[utoipa::path(
    get,
    path = "/tracks/weekly-challenge",
    responses(
        (status = 200, description = "Current weekly challenge", body = ChallengeResponse),
        (status = 404, description = "No weekly challenge available")
    )
)]
pub async fn get_weekly_challenge(
    State(challenge_service): State<Arc<ChallengeService>>,
) -> Result<Json<ApiResponse<ChallengeResponse>>, AppError> {
    current(&challenge_service, ChallengeKind::Weekly).await
}

#[utoipa::path(
    get,
    path = "/tracks/campaign-challenge",
    responses(
        (status = 200, description = "Current campaign challenge", body = ChallengeResponse),
        (status = 404, description = "No campaign challenge available")
    )
)]
pub async fn get_campaign_challenge(
    State(challenge_service): State<Arc<ChallengeService>>,
) -> Result<Json<ApiResponse<ChallengeResponse>>, AppError> {
    current(&challenge_service, ChallengeKind::Campaign).await
}

#[utoipa::path(
    put,
    path = "/tracks/weekly-challenge",
    request_body = UpdateChallengeRequest,
    responses(
        (status = 200, description = "Weekly challenge repointed", body = ChallengeTrackResponse),
        (status = 400, description = "Track ID is required"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Track not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_weekly_challenge(
    State(challenge_service): State<Arc<ChallengeService>>,
    payload: Result<Json<UpdateChallengeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChallengeTrackResponse>>, AppError> {
    repoint(&challenge_service, ChallengeKind::Weekly, payload).await
}

#[utoipa::path(
    put,
    path = "/tracks/campaign-challenge",
    request_body = UpdateChallengeRequest,
    responses(
        (status = 200, description = "Campaign challenge repointed", body = ChallengeTrackResponse),
        (status = 400, description = "Track ID is required"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Track not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_campaign_challenge(
    State(challenge_service): State<Arc<ChallengeService>>,
    payload: Result<Json<UpdateChallengeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChallengeTrackResponse>>, AppError> {
    repoint(&challenge_service, ChallengeKind::Campaign, payload).await
}

pub fn challenge_routes(challenge_service: Arc<ChallengeService>, config: Arc<Config>) -> Router {
    let admin = Router::new()
        .route("/tracks/weekly-challenge", put(update_weekly_challenge))
        .route("/tracks/campaign-challenge", put(update_campaign_challenge))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .route("/tracks/weekly-challenge", get(get_weekly_challenge))
        .route("/tracks/campaign-challenge", get(get_campaign_challenge))
        .merge(admin)
        .with_state(challenge_service)
}
