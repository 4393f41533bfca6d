use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use serde_json::Value;

use crate::accounts::{CurrentUser, NewUser, Role, TokenKeys, User};
use crate::app::{api_router, AppContext};
use crate::config::SubsidyConfig;
use crate::store::Stores;

pub(crate) const PASSWORD: &str = "correct-horse-battery";

pub(crate) fn keys() -> Arc<TokenKeys> {
    Arc::new(TokenKeys::new("renovia-test-secret", Duration::hours(1)))
}

pub(crate) fn context() -> AppContext {
    AppContext::with_tokens(Stores::in_memory(), keys(), SubsidyConfig::default())
}

pub(crate) fn router(ctx: &AppContext) -> Router {
    api_router(ctx.clone())
}

pub(crate) async fn seed_user(ctx: &AppContext, email: &str, role: Role) -> User {
    ctx.accounts
        .create(NewUser {
            name: "Camille Martin".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role,
        })
        .await
        .expect("user created")
}

pub(crate) fn caller(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
    }
}

pub(crate) fn bearer(ctx: &AppContext, user: &User) -> String {
    format!("Bearer {}", ctx.tokens.issue(user).expect("token issued"))
}

pub(crate) fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(value) = auth {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(crate) fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = auth {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(Body::empty()).expect("request builds")
}

pub(crate) async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json payload")
}
