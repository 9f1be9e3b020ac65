//! End-to-end tests of `POST /api/v1/sso/decision` through the full router
//! (request id, body limit, timeout and trace layers included), backed by an
//! in-memory user directory.
mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{app, app_with, app_with_limits, post_json, read_json};
use serde_json::json;
use sso_role_resolver::middleware::http::HttpLimits;
use sso_role_resolver::services::directory::{
    DirectoryResult, InMemoryUserDirectory, UserDirectory, UserRecord,
};
use tower::ServiceExt;

const DECISION: &str = "/api/v1/sso/decision";

// Never answers, like a database that accepted the connection and hung.
struct StalledDirectory;

#[async_trait]
impl UserDirectory for StalledDirectory {
    fn backend_name(&self) -> &'static str {
        "stalled"
    }

    async fn get_user(&self, _external_id: &str) -> DirectoryResult<Option<UserRecord>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn first_mapped_role_in_claim_order_is_returned() {
    let body = json!({
        "external_id": "u1",
        "email": "a@x.com",
        "claims": { "realm_access": { "roles": ["internal-user", "org-admin"] } }
    });

    let response = app().oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let payload = read_json(response).await;
    assert_eq!(payload["user_id"], "u1");
    assert_eq!(payload["user_email"], "a@x.com");
    assert_eq!(payload["user_role"], "internal_user");
    assert_eq!(payload["models"], json!([]));
    assert_eq!(payload["max_budget"], 10.0);
    assert_eq!(payload["budget_duration"], "1d");
    assert_eq!(payload["existing_user"], false);
    assert!(payload["budget_reset_at"].is_string());
}

#[tokio::test]
async fn claims_without_role_path_get_the_default_role() {
    let body = json!({ "external_id": "u2", "claims": {} });

    let response = app().oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json(response).await;
    assert_eq!(payload["user_role"], "viewer");
    assert_eq!(payload["user_email"], serde_json::Value::Null);
}

#[tokio::test]
async fn empty_external_id_is_an_authentication_failure() {
    let body = json!({
        "external_id": "",
        "claims": { "realm_access": { "roles": ["org-admin"] } }
    });

    let response = app().oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let payload = read_json(response).await;
    assert_eq!(payload["error"]["code"], "MISSING_IDENTITY_ID");
    assert_eq!(payload["error"]["message"], "authentication failed");
    assert!(payload.get("user_role").is_none());
}

#[tokio::test]
async fn absent_external_id_is_an_authentication_failure() {
    let body = json!({ "email": "a@x.com", "claims": {} });

    let response = app().oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"]["code"], "MISSING_IDENTITY_ID");
}

#[tokio::test]
async fn malformed_claims_do_not_leak_the_cause() {
    let body = json!({
        "external_id": "u1",
        "claims": { "realm_access": { "roles": "org-admin" } }
    });

    let response = app().oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let payload = read_json(response).await;
    assert_eq!(payload["error"]["code"], "AUTHENTICATION_FAILED");
    assert_eq!(payload["error"]["message"], "authentication failed");
}

#[tokio::test]
async fn existing_user_overrides_are_preserved() {
    let mut record = UserRecord::new("u1");
    record.models = vec!["gpt-4o".to_string(), "claude".to_string()];
    record.max_budget = Some(100.0);
    record.budget_duration = Some("7d".to_string());
    let router = app_with(InMemoryUserDirectory::new().with_user(record));

    let body = json!({
        "external_id": "u1",
        "claims": { "realm_access": { "roles": ["org-admin"] } }
    });

    let response = router.oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json(response).await;
    assert_eq!(payload["user_role"], "org_admin");
    assert_eq!(payload["models"], json!(["gpt-4o", "claude"]));
    assert_eq!(payload["max_budget"], 100.0);
    assert_eq!(payload["budget_duration"], "7d");
    assert_eq!(payload["existing_user"], true);
}

#[tokio::test]
async fn repeated_logins_get_identical_decisions() {
    let router = app();
    let body = json!({
        "external_id": "u1",
        "email": "a@x.com",
        "claims": { "realm_access": { "roles": ["org-admin", "internal-user"] } }
    });

    let first = read_json(
        router
            .clone()
            .oneshot(post_json(DECISION, &body))
            .await
            .expect("first"),
    )
    .await;
    let second = read_json(
        router
            .oneshot(post_json(DECISION, &body))
            .await
            .expect("second"),
    )
    .await;

    for field in ["user_id", "user_email", "user_role", "models", "max_budget", "budget_duration"] {
        assert_eq!(first[field], second[field], "{field} differs");
    }
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    let req = Request::builder()
        .method("POST")
        .uri(DECISION)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");

    let response = app().oneshot(req).await.expect("decision");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"]["code"], "INVALID_IDENTITY_RECORD");
}

#[tokio::test]
async fn mistyped_record_gets_a_fixed_message() {
    let body = json!({ "external_id": 123, "claims": {} });

    let response = app().oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let payload = read_json(response).await;
    assert_eq!(payload["error"]["code"], "INVALID_IDENTITY_RECORD");
    assert_eq!(payload["error"]["message"], "invalid identity record");
}

#[tokio::test]
async fn stalled_lookup_times_out_without_a_decision() {
    let limits = HttpLimits {
        request_timeout: Duration::from_millis(50),
        ..HttpLimits::default()
    };
    let router = app_with_limits(Arc::new(StalledDirectory), limits);
    let body = json!({
        "external_id": "u1",
        "claims": { "realm_access": { "roles": ["org-admin"] } }
    });

    let response = router.oneshot(post_json(DECISION, &body)).await.expect("decision");
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn health_is_served_at_both_roots() {
    for uri in ["/health", "/api/v1/health"] {
        let req = Request::builder().uri(uri).body(Body::empty()).expect("request");
        let response = app().oneshot(req).await.expect("health");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }
}
