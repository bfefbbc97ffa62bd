#[cfg(test)]
mod tests {
    use axum::http::{self, StatusCode};
    use serde_json::json;

    use crate::models::user::Role;

    use super::super::common::{authed, create_test_user, get, send, setup};

    #[tokio::test]
    async fn test_health() {
        let ctx = setup().await;

        let (status, body) = send(&ctx, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn test_list_tracks_with_filters() {
        let ctx = setup().await;

        let (status, body) = send(&ctx, get("/tracks")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 35);

        let (_, body) = send(&ctx, get("/tracks?mapType=Campaign")).await;
        let campaign = body["data"].as_array().unwrap();
        assert_eq!(campaign.len(), 25);
        assert!(campaign.iter().all(|t| t["mapType"] == "Campaign"));

        let (_, body) = send(&ctx, get("/tracks?mapType=Weekly&isActive=true")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 10);

        let (status, _) = send(&ctx, get("/tracks?mapType=Nonsense")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_track_and_week() {
        let ctx = setup().await;

        let (status, body) = send(&ctx, get("/tracks/w32-3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Weekly 32 - 03");
        assert_eq!(body["data"]["difficulty"], "Advanced");

        let (status, _) = send(&ctx, get("/tracks/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&ctx, get("/tracks/week/33")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);

        let (status, _) = send(&ctx, get("/tracks/week/40")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&ctx, get("/tracks/week/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_creates_and_deletes_track() {
        // Arrange
        let ctx = setup().await;
        let admin = create_test_user(&ctx, Role::Admin, "admin").await;
        let track = json!({
            "id": "custom-1",
            "name": "Custom One",
            "mapType": "Custom",
            "difficulty": "Expert",
            "authorTime": 30_000
        });

        // Act
        let (status, body) = send(
            &ctx,
            authed(http::Method::POST, "/tracks", &admin.token, Some(&track)),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], "custom-1");
        assert_eq!(body["data"]["isActive"], true);

        let (status, _) = send(
            &ctx,
            authed(http::Method::POST, "/tracks", &admin.token, Some(&track)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&ctx, authed(http::Method::DELETE, "/tracks/custom-1", &admin.token, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&ctx, get("/tracks/custom-1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&ctx, authed(http::Method::DELETE, "/tracks/custom-1", &admin.token, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rejects_reserved_ids() {
        let ctx = setup().await;
        let admin = create_test_user(&ctx, Role::Admin, "admin").await;

        for id in ["week", "weekly-challenge", "campaign-challenge", "global-leaderboard", "campaign-leaderboard", "bulk-leaderboards"] {
            let track = json!({
                "id": id,
                "name": "Shadowed",
                "mapType": "Custom",
                "difficulty": "Beginner"
            });
            let (status, body) = send(
                &ctx,
                authed(http::Method::POST, "/tracks", &admin.token, Some(&track)),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{id}: {body}");
        }

        let (_, body) = send(&ctx, get("/tracks")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 35);
    }

    #[tokio::test]
    async fn test_track_admin_routes_are_guarded() {
        let ctx = setup().await;
        let racer = create_test_user(&ctx, Role::User, "racer").await;

        let (status, _) = send(&ctx, authed(http::Method::DELETE, "/tracks/1", &racer.token, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let request = axum::http::Request::builder()
            .method(http::Method::DELETE)
            .uri("/tracks/1")
            .body(axum::body::Body::empty())
            .unwrap();
        let (status, _) = send(&ctx, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&ctx, get("/tracks/1")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
