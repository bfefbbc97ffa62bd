use axum::{
    body::{to_bytes, Body},
    http::{self, Request, StatusCode},
    Router,
};
use bson::oid::ObjectId;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::{
    config::{Config, StoreBackend},
    models::user::{Role, User},
    routes,
    services::AppServices,
    store::{MemoryStore, UserStore},
    utils::{generate_jwt, hash_password},
};

pub const TEST_SECRET: &str = "test_secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub services: AppServices,
}

pub struct TestUser {
    pub id: ObjectId,
    pub username: String,
    pub token: String,
}

pub fn test_config() -> Config {
    Config {
        database_url: "mongodb://localhost:27017".to_string(),
        database_name: "trackmania_scoreboard_test".to_string(),
        backend: StoreBackend::Memory,
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expires_hours: 1,
        port: 3001,
        cors_origins: Vec::new(),
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        seed_tracks: true,
    }
}

/// Fresh in-memory app with the default track catalog loaded.
pub async fn setup() -> TestContext {
    let config = Arc::new(test_config());
    let store = Arc::new(MemoryStore::new());
    let services = AppServices::new(store.clone(), config.clone());
    services
        .tracks
        .seed_if_empty()
        .await
        .expect("Failed to seed tracks");

    let app = routes::init_routes(&services, config);

    TestContext {
        app,
        store,
        services,
    }
}

/// Inserts a user straight into the store and signs a token for it.
pub async fn create_test_user(ctx: &TestContext, role: Role, username: &str) -> TestUser {
    let now = Utc::now();
    let user = User {
        id: None,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: hash_password("password123").expect("Failed to hash password"),
        role,
        created_at: now,
        updated_at: now,
    };

    let user = ctx
        .store
        .insert_user(user)
        .await
        .expect("Failed to insert test user");
    let id = user.id.expect("Test user should have an ID after insertion");
    let token = generate_jwt(&id.to_hex(), &role.to_string(), TEST_SECRET, 1)
        .expect("Failed to sign test token");

    TestUser {
        id,
        username: username.to_string(),
        token,
    }
}

/// Helper to create a JSON body for requests.
pub fn json_body(json: &Value) -> Body {
    Body::from(json.to_string())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(http::Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn authed(method: http::Method, uri: &str, token: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(json_body(json))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Runs one request and returns the status with the decoded JSON envelope.
pub async fn send(ctx: &TestContext, request: Request<Body>) -> (StatusCode, Value) {
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn submit_time(ctx: &TestContext, user: &TestUser, track_id: &str, time: i64) -> Value {
    let (status, body) = send(
        ctx,
        authed(
            http::Method::POST,
            "/scores/submit",
            &user.token,
            Some(&serde_json::json!({ "trackId": track_id, "time": time })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "submit failed: {body}");
    body
}
