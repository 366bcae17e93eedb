//! Every protected route rejects requests without a valid bearer token,
//! before any handler or database work runs.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, expired_token, forged_token, lazy_pool, send, valid_token};
use jsonwebtoken::jwk::JwkSet;
use serde_json::json;
use sqlx::PgPool;
use tasktrack_api::auth::jwks::{JwksError, JwksFetcher, StaticJwksFetcher};

const PROTECTED: &[(&str, &str)] = &[
    ("GET", "/tasks"),
    ("GET", "/tasks/1"),
    ("POST", "/tasks"),
    ("POST", "/tasks/1"),
    ("GET", "/categories"),
    ("GET", "/categories/1"),
    ("GET", "/categories/1/tasks"),
    ("POST", "/categories"),
    ("POST", "/categories/1"),
];

fn body_for(method: &str) -> Option<serde_json::Value> {
    (method == "POST").then(|| json!({ "name": "Work", "color": "#00FF00", "summary": "x" }))
}

async fn assert_all_rejected(token: Option<&str>) {
    for (method, uri) in PROTECTED {
        let app = common::build_test_app(lazy_pool());
        let response = send(app, method, uri, token, body_for(method)).await;

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} should be rejected"
        );
        let json = body_json(response).await;
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn missing_token_is_rejected_everywhere() {
    assert_all_rejected(None).await;
}

#[tokio::test]
async fn malformed_token_is_rejected_everywhere() {
    assert_all_rejected(Some("not-a-jwt")).await;
}

#[tokio::test]
async fn expired_token_is_rejected_everywhere() {
    assert_all_rejected(Some(&expired_token())).await;
}

#[tokio::test]
async fn token_signed_by_unknown_key_is_rejected_everywhere() {
    assert_all_rejected(Some(&forged_token())).await;
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let app = common::build_test_app(lazy_pool());
    let request = axum::http::Request::builder()
        .uri("/tasks")
        .header("authorization", format!("Basic {}", valid_token()))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Signing key unavailable
// ---------------------------------------------------------------------------

struct UnreachableProvider;

#[async_trait]
impl JwksFetcher for UnreachableProvider {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        Err(JwksError::Fetch("connection refused".into()))
    }
}

#[tokio::test]
async fn key_fetch_failure_rejects_valid_token() {
    let app = common::build_test_app_with(
        lazy_pool(),
        common::test_config(),
        Arc::new(UnreachableProvider),
    );
    let response = send(app, "GET", "/tasks", Some(&valid_token()), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn exhausted_fetch_budget_rejects_valid_token() {
    let mut config = common::test_config();
    config.auth.jwks_requests_per_minute = 0;
    let fetcher = Arc::new(StaticJwksFetcher::new(common::fixture_jwks()));

    let app = common::build_test_app_with(lazy_pool(), config, fetcher.clone());
    let response = send(app, "POST", "/categories", Some(&valid_token()), body_for("POST")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    assert_eq!(fetcher.calls(), 0);
}

// ---------------------------------------------------------------------------
// Rejected writes leave no trace
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_creates_do_not_touch_the_database(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = send(
        app,
        "POST",
        "/categories",
        None,
        Some(json!({ "name": "Work", "color": "#00FF00" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let response = send(
        app,
        "POST",
        "/tasks",
        Some(&expired_token()),
        Some(json!({ "summary": "Write report" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&pool)
        .await
        .unwrap();
    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(categories, 0);
    assert_eq!(tasks, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_token_reaches_the_handler(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = send(app, "GET", "/tasks", Some(&valid_token()), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}
