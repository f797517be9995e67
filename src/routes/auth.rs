use axum::extract::State;
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_token, sign_jwt_for_user};
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::sessions::Session;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    id: String,
    username: String,
    token: String,
    created_at: DateTime<Utc>,
    is_new_user: bool,
}

/// Login-or-register: unknown usernames are created on the spot.
/// Unlearned (P0) words are represented by the absence of progress rows,
/// so a fresh user needs no per-word initialization.
async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let username = req.username.trim();
    if username.is_empty() || username.len() > 50 {
        return Err(AppError::bad_request(
            "INVALID_USERNAME",
            "用户名长度须在 1 到 50 个字符之间",
        ));
    }

    let now = Utc::now();
    let (user, is_new_user) = state.store().get_or_create_user(username, now)?;

    let token = sign_jwt_for_user(
        &user.id,
        &state.config().jwt_secret,
        state.config().jwt_expires_in_hours,
        now,
    )?;
    state.store().create_session(&Session {
        token_hash: hash_token(&token),
        user_id: user.id.clone(),
        created_at: now,
        expires_at: now + Duration::hours(state.config().jwt_expires_in_hours as i64),
    })?;

    Ok(ok(LoginResponse {
        id: user.id,
        username: user.username,
        token,
        created_at: user.created_at,
        is_new_user,
    }))
}
