use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::scheduler::ExerciseType;
use crate::session::practice;
use crate::state::AppState;
use crate::store::operations::progress::AnswerInput;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/submit", post(submit))
}

async fn get_session(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let mut rng = rand::thread_rng();
    let session = practice::get_practice_session(state.store(), &auth.user_id, now, &mut rng)?;
    Ok(ok(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitRequest {
    pub answers: Vec<SubmitAnswer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitAnswer {
    pub word_id: String,
    pub correct: bool,
    pub exercise_type: Option<ExerciseType>,
    pub response_time_ms: Option<i64>,
}

impl From<&SubmitAnswer> for AnswerInput {
    fn from(answer: &SubmitAnswer) -> Self {
        Self {
            word_id: answer.word_id.clone(),
            correct: answer.correct,
            exercise_type: answer.exercise_type,
            response_time_ms: answer.response_time_ms,
        }
    }
}

async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SubmitRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let answers: Vec<AnswerInput> = req.answers.iter().map(AnswerInput::from).collect();
    let outcome = practice::submit_practice(state.store(), &auth.user_id, &answers, now)?;
    Ok(ok(outcome))
}
