#[cfg(test)]
mod tests {
    use axum::http::{self, StatusCode};
    use serde_json::json;

    use crate::models::user::Role;

    use super::super::common::{authed, create_test_user, get, send, setup, submit_time};

    #[tokio::test]
    async fn test_default_challenges() {
        let ctx = setup().await;
        let racer = create_test_user(&ctx, Role::User, "racer").await;
        submit_time(&ctx, &racer, "w33-4", 60_000).await;

        let (status, body) = send(&ctx, get("/tracks/weekly-challenge")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["track"]["id"], "w33-4");
        assert_eq!(body["data"]["track"]["mapType"], "Weekly Challenge");
        assert_eq!(body["data"]["participantCount"], 1);

        let (status, body) = send(&ctx, get("/tracks/campaign-challenge")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["track"]["id"], "1");
        assert_eq!(body["data"]["track"]["mapType"], "Campaign Challenge");
        assert_eq!(body["data"]["participantCount"], 0);
    }

    #[tokio::test]
    async fn test_admin_repoints_weekly_challenge() {
        // Arrange
        let ctx = setup().await;
        let admin = create_test_user(&ctx, Role::Admin, "admin").await;
        let racer = create_test_user(&ctx, Role::User, "racer").await;

        // Act
        let (status, body) = send(
            &ctx,
            authed(
                http::Method::PUT,
                "/tracks/weekly-challenge",
                &admin.token,
                Some(&json!({ "trackId": "w32-2" })),
            ),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["id"], "w32-2");
        assert_eq!(body["data"]["weekNumber"], 32);

        let submitted = submit_time(&ctx, &racer, "weekly-challenge", 50_000).await;
        assert_eq!(submitted["data"]["score"]["trackId"], "w32-2");

        let (_, body) = send(&ctx, get("/tracks/weekly-challenge")).await;
        assert_eq!(body["data"]["track"]["id"], "w32-2");
        assert_eq!(body["data"]["participantCount"], 1);
    }

    #[tokio::test]
    async fn test_repoint_requires_admin() {
        let ctx = setup().await;
        let racer = create_test_user(&ctx, Role::User, "racer").await;
        let body = json!({ "trackId": "5" });

        let (status, _) = send(
            &ctx,
            authed(http::Method::PUT, "/tracks/campaign-challenge", &racer.token, Some(&body)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let request = axum::http::Request::builder()
            .method(http::Method::PUT)
            .uri("/tracks/campaign-challenge")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();
        let (status, _) = send(&ctx, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, current) = send(&ctx, get("/tracks/campaign-challenge")).await;
        assert_eq!(current["data"]["track"]["id"], "1");
    }

    #[tokio::test]
    async fn test_repoint_validation() {
        let ctx = setup().await;
        let admin = create_test_user(&ctx, Role::Admin, "admin").await;

        let (status, _) = send(
            &ctx,
            authed(http::Method::PUT, "/tracks/campaign-challenge", &admin.token, Some(&json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &ctx,
            authed(
                http::Method::PUT,
                "/tracks/campaign-challenge",
                &admin.token,
                Some(&json!({ "trackId": "missing" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleting_challenge_track_falls_back() {
        let ctx = setup().await;
        let admin = create_test_user(&ctx, Role::Admin, "admin").await;

        let (status, _) = send(&ctx, authed(http::Method::DELETE, "/tracks/w33-4", &admin.token, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&ctx, get("/tracks/weekly-challenge")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["track"]["id"], "w33-1");

        let (status, _) = send(&ctx, authed(http::Method::DELETE, "/tracks/1", &admin.token, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&ctx, get("/tracks/campaign-challenge")).await;
        assert_eq!(body["data"]["track"]["id"], "2");
    }

    #[tokio::test]
    async fn test_challenge_cleared_when_category_is_empty() {
        let ctx = setup().await;
        let admin = create_test_user(&ctx, Role::Admin, "admin").await;

        let weekly: Vec<String> = [32, 33]
            .iter()
            .flat_map(|week| (1..=5).map(move |n| format!("w{week}-{n}")))
            .collect();
        for id in &weekly {
            let (status, _) = send(
                &ctx,
                authed(http::Method::DELETE, &format!("/tracks/{id}"), &admin.token, None),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "{id}");
        }

        let (status, _) = send(&ctx, get("/tracks/weekly-challenge")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
