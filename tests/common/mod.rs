#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use serde_json::Value;
use sso_role_resolver::app::build_router;
use sso_role_resolver::middleware::http::HttpLimits;
use sso_role_resolver::services::directory::{InMemoryUserDirectory, UserDirectory};
use sso_role_resolver::services::sso::{
    InternalRole, ResolutionPolicy, RoleMappingTable, RoleResolver,
};
use sso_role_resolver::state::AppState;

pub fn policy() -> ResolutionPolicy {
    let mut policy = ResolutionPolicy::keycloak_default();
    policy.role_mapping = RoleMappingTable::from_pairs([
        ("internal-user", InternalRole::InternalUser),
        ("org-admin", InternalRole::OrgAdmin),
    ])
    .expect("mapping");
    policy
}

pub fn app_with(directory: InMemoryUserDirectory) -> Router {
    app_with_limits(Arc::new(directory), HttpLimits::default())
}

pub fn app_with_limits(directory: Arc<dyn UserDirectory>, limits: HttpLimits) -> Router {
    let resolver = RoleResolver::new(policy(), directory);
    build_router(AppState::new(Arc::new(resolver)), limits)
}

pub fn app() -> Router {
    app_with(InMemoryUserDirectory::new())
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
