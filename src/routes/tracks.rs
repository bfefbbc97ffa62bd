use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::{auth_middleware, require_admin},
    models::{
        response::ApiResponse,
        track::{CreateTrackRequest, MapType, TrackResponse},
    },
    services::track_service::{TrackFilter, TrackService},
};

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TrackListQuery {
    /// `Campaign`, `Weekly`, `Custom`, `Weekly Challenge` or `Campaign Challenge`
    pub map_type: Option<MapType>,
    pub is_active: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/tracks",
    params(TrackListQuery),
    responses(
        (status = 200, description = "Tracks ordered by id", body = [TrackResponse]),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn list_tracks(
    State(track_service): State<Arc<TrackService>>,
    query: Result<Query<TrackListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<TrackResponse>>>, AppError> {
    let Query(query) = query?;
    let tracks = track_service
        .list(TrackFilter {
            map_type: query.map_type,
            is_active: query.is_active,
        })
        .await?;
    Ok(Json(ApiResponse::ok(
        tracks.into_iter().map(TrackResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/tracks/{id}",
    params(("id" = String, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track found", body = TrackResponse),
        (status = 404, description = "Track not found")
    )
)]
pub async fn get_track(
    State(track_service): State<Arc<TrackService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TrackResponse>>, AppError> {
    let track = track_service.get(&id).await?;
    Ok(Json(ApiResponse::ok(track.into())))
}

#[utoipa::path(
    get,
    path = "/tracks/week/{weekNumber}",
    params(("weekNumber" = u32, Path, description = "Week number")),
    responses(
        (status = 200, description = "Weekly tracks of that week", body = [TrackResponse]),
        (status = 400, description = "Invalid week number"),
        (status = 404, description = "No tracks for that week")
    )
)]
pub async fn get_week_tracks(
    State(track_service): State<Arc<TrackService>>,
    Path(week_number): Path<String>,
) -> Result<Json<ApiResponse<Vec<TrackResponse>>>, AppError> {
    let week: u32 = week_number
        .parse()
        .map_err(|_| AppError::Validation("Invalid week number".to_string()))?;

    let tracks = track_service.for_week(week).await?;
    Ok(Json(ApiResponse::ok(
        tracks.into_iter().map(TrackResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/tracks",
    request_body = CreateTrackRequest,
    responses(
        (status = 201, description = "Track created", body = TrackResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Track id already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_track(
    State(track_service): State<Arc<TrackService>>,
    payload: Result<Json<CreateTrackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TrackResponse>>), AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let track = track_service.create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(track.into(), "Track created successfully")),
    ))
}

#[utoipa::path(
    delete,
    path = "/tracks/{id}",
    params(("id" = String, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track deleted", body = TrackResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Track not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_track(
    State(track_service): State<Arc<TrackService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TrackResponse>>, AppError> {
    let removed = track_service.delete(&id).await?;
    Ok(Json(ApiResponse::with_message(
        removed.into(),
        "Track deleted successfully",
    )))
}

pub fn track_routes(track_service: Arc<TrackService>, config: Arc<Config>) -> Router {
    let admin = Router::new()
        .route("/tracks", post(create_track))
        .route("/tracks/{id}", delete(delete_track))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .route("/tracks", get(list_tracks))
        .route("/tracks/{id}", get(get_track))
        .route("/tracks/week/{weekNumber}", get(get_week_tracks))
        .merge(admin)
        .with_state(track_service)
}
