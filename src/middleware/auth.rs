use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::{config::Config, error::AppError, utils::{validate_jwt, Claims}};

/// Use with `middleware::from_fn_with_state`.
/// Reads `Authorization: Bearer <token>`, validates it against the configured
/// secret and inserts `Arc<Claims>` into the request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<Config>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

    let claims = validate_jwt(token, &config.jwt_secret).ok_or_else(|| {
        debug!("rejected bearer token");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(Arc::new(claims));
    Ok(next.run(req).await)
}

/// Must sit inside `auth_middleware`.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let is_admin = req
        .extensions()
        .get::<Arc<Claims>>()
        .map(|claims| claims.is_admin())
        .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

    if !is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(next.run(req).await)
}
