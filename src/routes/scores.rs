use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::auth_middleware,
    models::{
        response::ApiResponse,
        score::{ScoreResponse, SubmissionOutcome, SubmitScoreRequest, SubmitScoreResponse},
    },
    services::score_service::ScoreService,
    utils::Claims,
};

#[utoipa::path(
    post,
    path = "/scores/submit",
    request_body = SubmitScoreRequest,
    responses(
        (status = 200, description = "Submission applied; `outcome` tells whether the best time changed", body = SubmitScoreResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Track or user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_score(
    State(score_service): State<Arc<ScoreService>>,
    Extension(claims): Extension<Arc<Claims>>,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SubmitScoreResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let result = score_service.submit(claims.user_id()?, req).await?;
    let message = match result.outcome {
        SubmissionOutcome::Created => "Score submitted successfully",
        SubmissionOutcome::Improved => "New personal best!",
        SubmissionOutcome::Unchanged => "Existing time is faster, score not updated",
    };
    Ok(Json(ApiResponse::with_message(result, message)))
}

#[utoipa::path(
    get,
    path = "/scores/my-scores",
    responses(
        (status = 200, description = "Caller's scores, newest first", body = [ScoreResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_scores(
    State(score_service): State<Arc<ScoreService>>,
    Extension(claims): Extension<Arc<Claims>>,
) -> Result<Json<ApiResponse<Vec<ScoreResponse>>>, AppError> {
    let scores = score_service.my_scores(claims.user_id()?).await?;
    Ok(Json(ApiResponse::ok(scores)))
}

#[utoipa::path(
    get,
    path = "/scores/track/{trackId}",
    params(("trackId" = String, Path, description = "Track ID, virtual challenge ids accepted")),
    responses(
        (status = 200, description = "Ranked scores", body = [ScoreResponse]),
        (status = 404, description = "Track not found")
    )
)]
pub async fn track_scores(
    State(score_service): State<Arc<ScoreService>>,
    Path(track_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ScoreResponse>>>, AppError> {
    let scores = score_service.track_scores(&track_id).await?;
    Ok(Json(ApiResponse::ok(scores)))
}

#[utoipa::path(
    delete,
    path = "/scores/track/{trackId}",
    params(("trackId" = String, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Caller's score removed", body = ScoreResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Score not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_score(
    State(score_service): State<Arc<ScoreService>>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(track_id): Path<String>,
) -> Result<Json<ApiResponse<ScoreResponse>>, AppError> {
    let removed = score_service.delete(claims.user_id()?, &track_id).await?;
    Ok(Json(ApiResponse::with_message(
        removed.into(),
        "Score deleted successfully",
    )))
}

pub fn score_routes(score_service: Arc<ScoreService>, config: Arc<Config>) -> Router {
    let protected = Router::new()
        .route("/scores/submit", post(submit_score))
        .route("/scores/my-scores", get(my_scores))
        .route("/scores/track/{trackId}", axum::routing::delete(delete_score))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .route("/scores/track/{trackId}", get(track_scores))
        .merge(protected)
        .with_state(score_service)
}
