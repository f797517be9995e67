use axum::extract::State;
use axum::routing::get;
use axum::Router;
use chrono::Utc;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::session::home;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let user = state
        .store()
        .get_user_by_id(&auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let stats = home::get_home_stats(state.store(), &user, now)?;
    Ok(ok(stats))
}
