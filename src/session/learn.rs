use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::constants::{LEARN_SESSION_SIZE, P1_UPCOMING_LIMIT};
use crate::scheduler::ExerciseType;
use crate::session::curriculum::{advanced_cursor, CurriculumLadder, P0Selection};
use crate::session::exercises::{self, Exercise, WordDetail};
use crate::session::home::learn_block_reason;
use crate::session::UnavailableReason;
use crate::store::operations::users::User;
use crate::store::operations::words::Word;
use crate::store::{Store, StoreError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnSession {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
    pub words: Vec<WordDetail>,
    pub exercises: Vec<Exercise>,
}

impl LearnSession {
    fn unavailable(reason: UnavailableReason) -> Self {
        Self {
            available: false,
            reason: Some(reason),
            words: Vec::new(),
            exercises: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnOutcome {
    pub words_moved: u32,
    pub today_learned: u32,
}

/// Assembles a learn session: up to five P0 words in curriculum order,
/// each with a reading_lv1 exercise. Does not mutate the progress store.
pub fn get_learn_session<R: Rng>(
    store: &Store,
    user: &User,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<LearnSession, StoreError> {
    if let Some(reason) = learn_block_reason(store, &user.id, now)? {
        return Ok(LearnSession::unavailable(reason));
    }

    let catalog = store.list_words()?;
    let progressed: HashSet<String> = store
        .list_user_progress(&user.id)?
        .into_iter()
        .map(|row| row.word_id)
        .collect();

    let candidates: Vec<Word> = catalog
        .iter()
        .filter(|word| !progressed.contains(&word.id))
        .cloned()
        .collect();
    if candidates.is_empty() {
        return Ok(LearnSession::unavailable(UnavailableReason::NoWordsInP0));
    }

    let selected = CurriculumLadder.select(user, candidates, LEARN_SESSION_SIZE);

    let mut words = Vec::with_capacity(selected.len());
    let mut session_exercises = Vec::with_capacity(selected.len());
    for word in &selected {
        words.push(WordDetail::from_word(word, None));
        session_exercises.push(exercises::build_exercise(
            word,
            ExerciseType::ReadingLv1,
            &catalog,
            rng,
        ));
    }

    Ok(LearnSession {
        available: true,
        reason: None,
        words,
        exercises: session_exercises,
    })
}

/// Moves the submitted words from P0 to P1 in one transaction. Unknown
/// word_ids are dropped; words that already have a progress row are
/// idempotent no-ops. `words_moved` counts only rows actually inserted.
pub fn complete_learn(
    store: &Store,
    user: &User,
    word_ids: &[String],
    now: DateTime<Utc>,
) -> Result<LearnOutcome, StoreError> {
    let mut known: Vec<String> = Vec::new();
    for word_id in word_ids {
        if store.get_word(word_id)?.is_some() {
            known.push(word_id.clone());
        } else {
            tracing::warn!(word_id = %word_id, "Dropping unknown word from learn completion");
        }
    }
    known.sort();
    known.dedup();

    let p1_slots = P1_UPCOMING_LIMIT.saturating_sub(store.count_p1_upcoming(&user.id, now)?);
    let inserted = store.move_words_to_p1(&user.id, &known, now, p1_slots)?;

    if !inserted.is_empty() {
        let mut learned_words = Vec::with_capacity(inserted.len());
        for word_id in &inserted {
            if let Some(word) = store.get_word(word_id)? {
                learned_words.push(word);
            }
        }
        if let Some((level, category)) = advanced_cursor(user, &learned_words) {
            let mut updated = user.clone();
            updated.current_level = Some(level);
            updated.current_category = Some(category);
            updated.updated_at = now;
            store.update_user(&updated)?;
        }
    }

    Ok(LearnOutcome {
        words_moved: inserted.len() as u32,
        today_learned: store.count_today_learned(&user.id, now)?,
    })
}
