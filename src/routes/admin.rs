use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::session::home;
use crate::state::AppState;
use crate::store::operations::words::{Word, WordImport};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reset-progress", post(reset_progress))
        .route("/reset-cooldown", post(reset_cooldown))
        .route("/word-pool", get(word_pool))
        .route("/seed-words", post(seed_words))
        .route("/words", get(list_words))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetProgressResponse {
    words_reset: u64,
}

/// 删除该用户的全部进度行，所有单词回到 P0。
async fn reset_progress(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let words_reset = state.store().reset_user_progress(&auth.user_id)?;
    tracing::info!(user_id = %auth.user_id, words_reset, "Progress reset");
    Ok(ok(ResetProgressResponse { words_reset }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetCooldownResponse {
    words_affected: u64,
}

/// 调试辅助：清零所有等待时间，P1-P5 与 R1-R5 的单词立即可用。
async fn reset_cooldown(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let words_affected = state.store().reset_cooldowns(&auth.user_id, now)?;
    Ok(ok(ResetCooldownResponse { words_affected }))
}

/// 诊断视图：全部单词按池分组，P0 由目录减去进度行合成。
async fn word_pool(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let pools = home::get_pool_summary(state.store(), &auth.user_id)?;
    let total_count = state.store().count_words()?;
    Ok(ok(serde_json::json!({
        "pools": pools,
        "totalCount": total_count,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedWordsRequest {
    words: Vec<WordImport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedWordsResponse {
    words_imported: u32,
    words_skipped: u32,
}

async fn seed_words(
    _auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SeedWordsRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let (words_imported, words_skipped) = state.store().import_words(&req.words, now)?;
    tracing::info!(words_imported, words_skipped, "Seeded catalog words");
    Ok(ok(SeedWordsResponse {
        words_imported,
        words_skipped,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WordOutput {
    id: String,
    word: String,
    translation: String,
    sentence: Option<String>,
    sentence_translation: Option<String>,
    image_url: Option<String>,
    audio_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<&Word> for WordOutput {
    fn from(word: &Word) -> Self {
        Self {
            id: word.id.clone(),
            word: word.word.clone(),
            translation: word.translation.clone(),
            sentence: word.sentence.clone(),
            sentence_translation: word.sentence_translation.clone(),
            image_url: word.image_url.clone(),
            audio_url: word.audio_url.clone(),
            created_at: word.created_at,
        }
    }
}

async fn list_words(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let words = state.store().list_words()?;
    let items: Vec<WordOutput> = words.iter().map(WordOutput::from).collect();
    Ok(ok(serde_json::json!({
        "words": items,
        "totalCount": items.len(),
    })))
}
