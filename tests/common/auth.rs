use axum::http::Method;
use axum::Router;

use super::http::{request, response_json};

pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn login(app: &Router, username: &str) -> String {
    let resp = request(
        app,
        Method::POST,
        "/api/auth/login",
        Some(serde_json::json!({ "username": username })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert!(status.is_success(), "login failed: {body}");
    body["data"]["token"]
        .as_str()
        .expect("login token")
        .to_string()
}

pub async fn login_and_get_token(app: &Router) -> String {
    login(app, &format!("it-user-{}", uuid::Uuid::new_v4())).await
}
