use super::common::*;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use crate::accounts::Role;

#[tokio::test]
async fn register_returns_session_usable_on_me() {
    let ctx = context();
    let response = router(&ctx)
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "name": "Hugo", "email": "hugo@renovia.fr", "password": PASSWORD }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = body_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["data"]["user"]["role"], "user");
    assert!(payload["data"]["user"].get("passwordHash").is_none());
    let token = payload["data"]["token"].as_str().expect("token").to_string();

    let response = router(&ctx)
        .oneshot(empty_request(
            "GET",
            "/api/auth/me",
            Some(&format!("Bearer {token}")),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["data"]["email"], "hugo@renovia.fr");
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let ctx = context();

    let response = router(&ctx)
        .oneshot(empty_request("GET", "/api/auth/me", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = body_json(response).await;
    assert_eq!(payload["success"], false);

    let response = router(&ctx)
        .oneshot(empty_request(
            "GET",
            "/api/expertises",
            Some("Bearer not-a-jwt"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let ctx = context();
    seed_user(&ctx, "agent@renovia.fr", Role::User).await;

    let response = router(&ctx)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "agent@renovia.fr", "password": "wrong-password" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let ctx = context();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"email\":"))
        .expect("request builds");

    let response = router(&ctx).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = body_json(response).await;
    assert_eq!(payload["success"], false);
}

#[tokio::test]
async fn user_administration_requires_admin_role() {
    let ctx = context();
    let agent = seed_user(&ctx, "agent@renovia.fr", Role::User).await;
    let admin = seed_user(&ctx, "admin@renovia.fr", Role::Admin).await;

    let response = router(&ctx)
        .oneshot(empty_request("GET", "/api/users", Some(&bearer(&ctx, &agent))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router(&ctx)
        .oneshot(empty_request("GET", "/api/users", Some(&bearer(&ctx, &admin))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn admin_creates_and_deletes_users() {
    let ctx = context();
    let admin = seed_user(&ctx, "admin@renovia.fr", Role::Admin).await;
    let auth = bearer(&ctx, &admin);

    let response = router(&ctx)
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&auth),
            &json!({ "name": "Nina", "email": "nina@renovia.fr", "password": PASSWORD, "role": "admin" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = body_json(response).await;
    assert_eq!(payload["data"]["role"], "admin");
    let id = payload["data"]["id"].as_str().expect("id").to_string();

    let response = router(&ctx)
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/users/{id}"),
            Some(&auth),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router(&ctx)
        .oneshot(empty_request("GET", &format!("/api/users/{id}"), Some(&auth)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_cannot_delete_own_account() {
    let ctx = context();
    let admin = seed_user(&ctx, "admin@renovia.fr", Role::Admin).await;

    let response = router(&ctx)
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/users/{}", admin.id),
            Some(&bearer(&ctx, &admin)),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_is_a_bad_request() {
    let ctx = context();
    seed_user(&ctx, "agent@renovia.fr", Role::User).await;

    let response = router(&ctx)
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "name": "Copy", "email": "agent@renovia.fr", "password": PASSWORD }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = body_json(response).await;
    assert_eq!(payload["message"], "email address is already in use");
}
