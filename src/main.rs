use anyhow::Context;
use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{Config, StoreBackend},
    routes::init_routes,
    services::AppServices,
    store::{MemoryStore, MongoStore},
};

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod store;
mod utils;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health_check,
        routes::auth::register,
        routes::auth::login,
        routes::auth::me,
        routes::auth::stats,
        routes::tracks::list_tracks,
        routes::tracks::get_track,
        routes::tracks::get_week_tracks,
        routes::tracks::create_track,
        routes::tracks::delete_track,
        routes::challenges::get_weekly_challenge,
        routes::challenges::get_campaign_challenge,
        routes::challenges::update_weekly_challenge,
        routes::challenges::update_campaign_challenge,
        routes::leaderboards::get_track_leaderboard,
        routes::leaderboards::get_global_leaderboard,
        routes::leaderboards::get_campaign_leaderboard,
        routes::leaderboards::get_bulk_leaderboards,
        routes::scores::submit_score,
        routes::scores::my_scores,
        routes::scores::track_scores,
        routes::scores::delete_score,
    ),
    components(
        schemas(
            models::user::RegisterRequest,
            models::user::LoginRequest,
            models::user::AuthResponse,
            models::user::UserResponse,
            models::user::Role,
            models::user::SiteStats,
            models::track::CreateTrackRequest,
            models::track::TrackResponse,
            models::track::MapType,
            models::track::Difficulty,
            models::track::Medal,
            models::challenge::ChallengeResponse,
            models::challenge::ChallengeTrackResponse,
            models::challenge::UpdateChallengeRequest,
            models::score::SubmitScoreRequest,
            models::score::SubmitScoreResponse,
            models::score::SubmissionOutcome,
            models::score::ScoreResponse,
            models::leaderboard::TrackLeaderboard,
            models::leaderboard::GlobalLeaderboard,
            models::leaderboard::CampaignLeaderboard,
            models::leaderboard::BulkLeaderboardEntry,
            models::leaderboard::BulkLeaderboardError,
            utils::Claims,
        ),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let comps = openapi.components.get_or_insert_with(Default::default);
        comps.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(allowed)
}

async fn build_services(config: Arc<Config>) -> anyhow::Result<AppServices> {
    let services = match config.backend {
        StoreBackend::Mongo => {
            let db = db::init_db(&config.database_url, &config.database_name)
                .await
                .context("failed to connect to MongoDB")?;
            let store = MongoStore::new(&db);
            store
                .ensure_indexes()
                .await
                .context("failed to create indexes")?;
            AppServices::new(Arc::new(store), config.clone())
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store, data is lost on restart");
            AppServices::new(Arc::new(MemoryStore::new()), config.clone())
        }
    };

    if config.seed_tracks {
        services
            .tracks
            .seed_if_empty()
            .await
            .context("failed to seed tracks")?;
    }

    Ok(services)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    let services = build_services(config.clone()).await?;

    let app = Router::new()
        .merge(init_routes(&services, config.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests;
