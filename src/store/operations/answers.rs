use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::{ExerciseType, Pool};
use crate::store::keys;
use crate::store::{Store, StoreError};

/// Append-only answer log. Rows are written inside the same transaction as
/// the progress mutation they record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub id: String,
    pub user_id: String,
    pub word_id: String,
    pub word: String,
    pub is_correct: bool,
    pub exercise_type: Option<ExerciseType>,
    pub source: AnswerSource,
    /// Pool the word was in when the answer was given.
    pub pool: Pool,
    pub response_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Practice,
    ReviewTest,
}

impl Store {
    /// Latest answers first.
    pub fn list_answers(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AnswerRecord>, StoreError> {
        let prefix = keys::answer_prefix(user_id);
        let mut records = Vec::new();
        for item in self.answers.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            records.push(Self::deserialize::<AnswerRecord>(&v)?);
            if records.len() >= limit {
                break;
            }
        }
        Ok(records)
    }

}
