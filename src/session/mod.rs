//! Session assembler: combines catalog and scheduler output into Learn,
//! Practice and Review sessions, and applies submissions through the
//! progress store. Every entry point takes `now` explicitly so scenario
//! tests can drive time.

pub mod curriculum;
pub mod exercises;
pub mod home;
pub mod learn;
pub mod practice;
pub mod review;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scheduler::Pool;
use crate::store::operations::progress::TransitionOutcome;

/// Machine-readable reason a session is unavailable. Returned as data
/// (`available=false`), never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    DailyLimitReached,
    P1PoolFull,
    NoWordsInP0,
    NotEnoughWords,
}

/// Per-word result of a practice or review submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub word_id: String,
    pub correct: bool,
    pub previous_pool: Pool,
    pub new_pool: Pool,
    pub next_available_time: Option<DateTime<Utc>>,
}

impl From<&TransitionOutcome> for AnswerResult {
    fn from(outcome: &TransitionOutcome) -> Self {
        Self {
            word_id: outcome.word_id.clone(),
            correct: outcome.correct,
            previous_pool: outcome.previous_pool,
            new_pool: outcome.new_pool,
            next_available_time: outcome.next_available_time,
        }
    }
}
