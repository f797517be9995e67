use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::constants::{PRACTICE_MIN_WORDS, PRACTICE_SESSION_SIZE};
use crate::scheduler::{self, ExerciseType};
use crate::session::exercises::{self, PracticeExercise};
use crate::session::home::{can_practice, can_review, learn_block_reason};
use crate::session::{AnswerResult, UnavailableReason};
use crate::store::operations::progress::{AnswerInput, SubmitMode, TransitionOutcome};
use crate::store::{Store, StoreError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
    pub exercises: Vec<PracticeExercise>,
    pub exercise_order: Vec<ExerciseType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSummary {
    pub correct_count: u32,
    pub incorrect_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSubmitOutcome {
    pub results: Vec<AnswerResult>,
    pub summary: SubmitSummary,
    /// Set only when no activity is possible after this submission.
    pub next_available_time: Option<DateTime<Utc>>,
}

/// Eligible rows in ascending next_available_time order, each carrying the
/// exercise type its current pool dictates.
pub fn get_practice_session<R: Rng>(
    store: &Store,
    user_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<PracticeSession, StoreError> {
    let candidates = store.practice_candidates(user_id, now)?;
    if candidates.len() < PRACTICE_MIN_WORDS {
        return Ok(PracticeSession {
            available: false,
            reason: Some(UnavailableReason::NotEnoughWords),
            exercises: Vec::new(),
            exercise_order: Vec::new(),
        });
    }

    let catalog = store.list_words()?;
    let by_id: HashMap<&str, usize> = catalog
        .iter()
        .enumerate()
        .map(|(index, word)| (word.id.as_str(), index))
        .collect();

    let mut session_exercises = Vec::new();
    for row in candidates.into_iter().take(PRACTICE_SESSION_SIZE) {
        let Some(&word_index) = by_id.get(row.word_id.as_str()) else {
            tracing::warn!(word_id = %row.word_id, "Progress row without catalog entry");
            continue;
        };
        let Some(exercise_type) = scheduler::exercise_type(row.pool) else {
            continue;
        };
        session_exercises.push(exercises::build_practice_exercise(
            &catalog[word_index],
            row.pool,
            exercise_type,
            &catalog,
            rng,
        ));
    }

    let order = exercises::exercise_order(&session_exercises);
    Ok(PracticeSession {
        available: true,
        reason: None,
        exercises: session_exercises,
        exercise_order: order,
    })
}

pub(crate) fn summarize(outcomes: &[TransitionOutcome]) -> SubmitSummary {
    let mut summary = SubmitSummary {
        correct_count: 0,
        incorrect_count: 0,
    };
    for outcome in outcomes.iter().filter(|o| o.applied) {
        if outcome.correct {
            summary.correct_count += 1;
        } else {
            summary.incorrect_count += 1;
        }
    }
    summary
}

pub(crate) fn headword_map(
    store: &Store,
    answers: &[AnswerInput],
) -> Result<HashMap<String, String>, StoreError> {
    let mut map = HashMap::new();
    for answer in answers {
        if map.contains_key(&answer.word_id) {
            continue;
        }
        match store.get_word(&answer.word_id)? {
            Some(word) => {
                map.insert(answer.word_id.clone(), word.word);
            }
            None => {
                tracing::warn!(word_id = %answer.word_id, "Dropping answer for unknown word");
            }
        }
    }
    Ok(map)
}

/// Applies the whole batch in a single transaction. Rows that are no
/// longer eligible are reported as no-ops and excluded from the summary.
pub fn submit_practice(
    store: &Store,
    user_id: &str,
    answers: &[AnswerInput],
    now: DateTime<Utc>,
) -> Result<PracticeSubmitOutcome, StoreError> {
    let headwords = headword_map(store, answers)?;
    let outcomes = store.apply_answers(user_id, answers, &headwords, now, SubmitMode::Practice)?;

    let summary = summarize(&outcomes);
    let results: Vec<AnswerResult> = outcomes.iter().map(AnswerResult::from).collect();

    let all_blocked = learn_block_reason(store, user_id, now)?.is_some()
        && !can_practice(store, user_id, now)?
        && !can_review(store, user_id, now)?;
    let next_available_time = if all_blocked {
        store.min_next_available_time(user_id)?
    } else {
        None
    };

    Ok(PracticeSubmitOutcome {
        results,
        summary,
        next_available_time,
    })
}
