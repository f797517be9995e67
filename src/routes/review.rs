use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::routes::practice::SubmitRequest;
use crate::session::review;
use crate::state::AppState;
use crate::store::operations::progress::AnswerInput;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/complete", post(complete))
        .route("/submit", post(submit))
}

async fn get_session(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let mut rng = rand::thread_rng();
    let session = review::get_review_session(state.store(), &auth.user_id, now, &mut rng)?;
    Ok(ok(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    word_ids: Vec<String>,
}

async fn complete(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CompleteRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if req.word_ids.is_empty() {
        return Err(AppError::bad_request(
            "EMPTY_WORD_IDS",
            "word_ids 不能为空",
        ));
    }

    let now = Utc::now();
    let outcome = review::complete_review(state.store(), &auth.user_id, &req.word_ids, now)?;
    Ok(ok(outcome))
}

async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SubmitRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let answers: Vec<AnswerInput> = req.answers.iter().map(AnswerInput::from).collect();
    let outcome = review::submit_review(state.store(), &auth.user_id, &answers, now)?;
    Ok(ok(outcome))
}
