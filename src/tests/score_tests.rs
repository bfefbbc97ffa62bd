#[cfg(test)]
mod tests {
    use axum::http::{self, StatusCode};
    use serde_json::json;

    use crate::{models::user::Role, store::ScoreStore};

    use super::super::common::{authed, create_test_user, get, send, setup, submit_time};

    #[tokio::test]
    async fn test_submission_keeps_only_the_best_time() {
        // Arrange
        let ctx = setup().await;
        let user = create_test_user(&ctx, Role::User, "racer").await;

        // Act / Assert: first time is created
        let body = submit_time(&ctx, &user, "1", 50_000).await;
        assert_eq!(body["data"]["outcome"], "created");
        assert_eq!(body["data"]["score"]["time"], 50_000);

        // slower and equal times leave the record alone
        let body = submit_time(&ctx, &user, "1", 52_000).await;
        assert_eq!(body["data"]["outcome"], "unchanged");
        assert_eq!(body["data"]["score"]["time"], 50_000);
        let body = submit_time(&ctx, &user, "1", 50_000).await;
        assert_eq!(body["data"]["outcome"], "unchanged");

        // a faster time replaces it
        let body = submit_time(&ctx, &user, "1", 47_500).await;
        assert_eq!(body["data"]["outcome"], "improved");
        assert_eq!(body["data"]["score"]["time"], 47_500);

        let rows = ctx.store.scores_for_track("1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time, 47_500);
    }

    #[tokio::test]
    async fn test_submission_reports_medal() {
        let ctx = setup().await;
        let user = create_test_user(&ctx, Role::User, "racer").await;

        // track 1 thresholds: 42000 / 45000 / 50000 / 60000
        let body = submit_time(&ctx, &user, "1", 44_000).await;
        assert_eq!(body["data"]["score"]["medal"], "Gold");

        let body = submit_time(&ctx, &user, "1", 41_000).await;
        assert_eq!(body["data"]["score"]["medal"], "Author");
    }

    #[tokio::test]
    async fn test_submission_validation() {
        let ctx = setup().await;
        let user = create_test_user(&ctx, Role::User, "racer").await;

        for body in [
            json!({ "trackId": "1", "time": 0 }),
            json!({ "trackId": "1", "time": -5 }),
            json!({ "trackId": "", "time": 40_000 }),
            json!({ "time": 40_000 }),
        ] {
            let (status, response) = send(
                &ctx,
                authed(http::Method::POST, "/scores/submit", &user.token, Some(&body)),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {response}");
            assert_eq!(response["success"], false);
        }

        let (status, _) = send(
            &ctx,
            authed(
                http::Method::POST,
                "/scores/submit",
                &user.token,
                Some(&json!({ "trackId": "no-such-track", "time": 40_000 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert_eq!(ctx.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submission_requires_auth() {
        let ctx = setup().await;

        let request = axum::http::Request::builder()
            .method(http::Method::POST)
            .uri("/scores/submit")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                json!({ "trackId": "1", "time": 40_000 }).to_string(),
            ))
            .unwrap();
        let (status, _) = send(&ctx, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_virtual_track_resolves_to_current_challenge() {
        let ctx = setup().await;
        let user = create_test_user(&ctx, Role::User, "racer").await;

        let body = submit_time(&ctx, &user, "weekly-challenge", 55_000).await;
        assert_eq!(body["data"]["score"]["trackId"], "w33-4");

        let (status, body) = send(&ctx, get("/scores/track/weekly-challenge")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["username"], "racer");
        assert_eq!(body["data"][0]["position"], 1);
    }

    #[tokio::test]
    async fn test_my_scores_and_delete() {
        let ctx = setup().await;
        let user = create_test_user(&ctx, Role::User, "racer").await;
        let other = create_test_user(&ctx, Role::User, "other").await;
        submit_time(&ctx, &user, "1", 40_000).await;
        submit_time(&ctx, &user, "2", 40_000).await;
        submit_time(&ctx, &other, "2", 39_000).await;

        let (status, body) = send(&ctx, authed(http::Method::GET, "/scores/my-scores", &user.token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert!(body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["username"] == "racer"));

        let (status, _) = send(&ctx, authed(http::Method::DELETE, "/scores/track/2", &user.token, None)).await;
        assert_eq!(status, StatusCode::OK);

        // only the caller's row went away
        let rows = ctx.store.scores_for_track("2").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "other");

        let (status, body) = send(&ctx, authed(http::Method::DELETE, "/scores/track/2", &user.token, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Score not found");
    }
}
