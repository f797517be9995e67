use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::scheduler::ExerciseType;
use crate::session::exercises::{self, ExerciseOption, WordDetail};
use crate::state::AppState;
use crate::store::operations::words::Word;

/// 新手引导使用固定的目标词和干扰词，需预先存在于目录中。
const TARGET_WORD: &str = "apple";
const DISTRACTOR_WORDS: [&str; 3] = ["banana", "grape", "mango"];

/// Tutorial walks all five exercise types once, in ladder order.
const TUTORIAL_STEPS: [ExerciseType; 5] = [
    ExerciseType::ReadingLv1,
    ExerciseType::ReadingLv2,
    ExerciseType::ListeningLv1,
    ExerciseType::SpeakingLv1,
    ExerciseType::SpeakingLv2,
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vocabulary", get(get_vocabulary_tutorial))
        .route("/vocabulary/complete", post(complete_vocabulary_tutorial))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TutorialStep {
    step: usize,
    word_id: String,
    #[serde(rename = "type")]
    exercise_type: ExerciseType,
    options: Vec<ExerciseOption>,
    correct_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TutorialResponse {
    word: WordDetail,
    steps: Vec<TutorialStep>,
}

async fn get_vocabulary_tutorial(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let target = state
        .store()
        .get_word_by_headword(TARGET_WORD)?
        .ok_or_else(|| AppError::not_found("Tutorial target word not in catalog"))?;

    let mut pool: Vec<Word> = vec![target.clone()];
    for headword in DISTRACTOR_WORDS {
        let word = state
            .store()
            .get_word_by_headword(headword)?
            .ok_or_else(|| AppError::not_found("Tutorial distractor word not in catalog"))?;
        pool.push(word);
    }

    let mut rng = rand::thread_rng();
    let steps = TUTORIAL_STEPS
        .iter()
        .enumerate()
        .map(|(index, &exercise_type)| {
            let (options, correct_index) =
                exercises::build_options(&target, &pool, exercise_type, &mut rng);
            TutorialStep {
                step: index + 1,
                word_id: target.id.clone(),
                exercise_type,
                options,
                correct_index,
            }
        })
        .collect();

    Ok(ok(TutorialResponse {
        word: WordDetail::from_word(&target, None),
        steps,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TutorialCompleteResponse {
    completed_at: DateTime<Utc>,
}

async fn complete_vocabulary_tutorial(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let mut user = state
        .store()
        .get_user_by_id(&auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    // 重复完成保留首次时间戳
    let completed_at = user.tutorial_completed_at.unwrap_or(now);
    user.tutorial_completed_at = Some(completed_at);
    user.updated_at = now;
    state.store().update_user(&user)?;

    Ok(ok(TutorialCompleteResponse { completed_at }))
}
