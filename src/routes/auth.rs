use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
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
        user::{AuthResponse, LoginRequest, RegisterRequest, SiteStats, UserResponse},
    },
    services::user_service::UserService,
    utils::Claims,
};

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(user_service): State<Arc<UserService>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let Json(req) = payload?;
    let req = req.normalized();
    req.validate()?;

    let auth = user_service.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(auth, "User registered successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(user_service): State<Arc<UserService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let auth = user_service.login(req).await?;
    Ok(Json(ApiResponse::with_message(auth, "Login successful")))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(user_service): State<Arc<UserService>>,
    Extension(claims): Extension<Arc<Claims>>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service.get(claims.user_id()?).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

#[utoipa::path(
    get,
    path = "/auth/stats",
    responses(
        (status = 200, description = "Site totals", body = SiteStats)
    )
)]
pub async fn stats(
    State(user_service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<SiteStats>>, AppError> {
    Ok(Json(ApiResponse::ok(user_service.stats().await?)))
}

pub fn auth_routes(user_service: Arc<UserService>, config: Arc<Config>) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/stats", get(stats))
        .merge(protected)
        .with_state(user_service)
}
