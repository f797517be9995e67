use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use crate::constants::{REVIEW_MAX_WORDS, REVIEW_MIN_WORDS, REVIEW_PHASE_WAIT_HOURS};
use crate::scheduler::{self, Pool};
use crate::session::exercises::{self, Exercise, WordDetail};
use crate::session::practice::{headword_map, summarize};
use crate::session::{AnswerResult, UnavailableReason};
use crate::store::operations::progress::{AnswerInput, SubmitMode};
use crate::store::{Store, StoreError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
    /// Full word content for the re-exposure phase.
    pub words: Vec<WordDetail>,
    /// Preview of the exercises the practice phase will ask.
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCompleteOutcome {
    pub words_completed: u32,
    pub next_practice_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub returned_to_p: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmitOutcome {
    pub results: Vec<AnswerResult>,
    pub summary: ReviewSummary,
}

/// Display-phase candidates in ascending next_available_time order.
pub fn get_review_session<R: Rng>(
    store: &Store,
    user_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<ReviewSession, StoreError> {
    let candidates = store.review_display_candidates(user_id, now)?;
    if candidates.len() < REVIEW_MIN_WORDS {
        return Ok(ReviewSession {
            available: false,
            reason: Some(UnavailableReason::NotEnoughWords),
            words: Vec::new(),
            exercises: Vec::new(),
        });
    }

    let catalog = store.list_words()?;
    let by_id: HashMap<&str, usize> = catalog
        .iter()
        .enumerate()
        .map(|(index, word)| (word.id.as_str(), index))
        .collect();

    let mut words = Vec::new();
    let mut previews = Vec::new();
    for row in candidates.into_iter().take(REVIEW_MAX_WORDS) {
        let Some(&word_index) = by_id.get(row.word_id.as_str()) else {
            tracing::warn!(word_id = %row.word_id, "Progress row without catalog entry");
            continue;
        };
        let Some(exercise_type) = scheduler::exercise_type(row.pool) else {
            continue;
        };
        let word = &catalog[word_index];
        words.push(WordDetail::from_word(word, Some(row.pool)));
        previews.push(exercises::build_exercise(
            word,
            exercise_type,
            &catalog,
            rng,
        ));
    }

    Ok(ReviewSession {
        available: true,
        reason: None,
        words,
        exercises: previews,
    })
}

/// Flips the listed rows from the display phase to the practice phase.
/// Idempotent per word; rows already in the practice phase do not count.
pub fn complete_review(
    store: &Store,
    user_id: &str,
    word_ids: &[String],
    now: DateTime<Utc>,
) -> Result<ReviewCompleteOutcome, StoreError> {
    let words_completed = store.mark_reviews_practiced(user_id, word_ids, now)?;
    let next_practice_time = if words_completed > 0 {
        Some(now + Duration::hours(REVIEW_PHASE_WAIT_HOURS))
    } else {
        None
    };

    Ok(ReviewCompleteOutcome {
        words_completed,
        next_practice_time,
    })
}

/// Review test submission; transitions follow the R-row rules.
pub fn submit_review(
    store: &Store,
    user_id: &str,
    answers: &[AnswerInput],
    now: DateTime<Utc>,
) -> Result<ReviewSubmitOutcome, StoreError> {
    let headwords = headword_map(store, answers)?;
    let outcomes =
        store.apply_answers(user_id, answers, &headwords, now, SubmitMode::ReviewTest)?;

    let base = summarize(&outcomes);
    let returned_to_p = outcomes
        .iter()
        .filter(|o| o.applied && matches!(o.new_pool, Pool::P(_)))
        .count() as u32;

    Ok(ReviewSubmitOutcome {
        results: outcomes.iter().map(AnswerResult::from).collect(),
        summary: ReviewSummary {
            correct_count: base.correct_count,
            incorrect_count: base.incorrect_count,
            returned_to_p,
        },
    })
}
