//! Curriculum-aware P0 selection.
//!
//! Selection is advisory: words without curriculum tags are still served,
//! after tagged ones. The policy sits behind a trait so a richer curriculum
//! walker can replace the ladder without touching scheduler contracts.

use crate::store::operations::users::User;
use crate::store::operations::words::Word;

pub trait P0Selection {
    /// Orders the P0 candidate set for one user and truncates to `limit`.
    fn select(&self, user: &User, candidates: Vec<Word>, limit: usize) -> Vec<Word>;
}

/// Default policy: walk the (level, category) ladder forward from the
/// user's cursor, then earlier curriculum positions, then untagged words.
/// Ties break on catalog insertion order.
pub struct CurriculumLadder;

fn position(word: &Word) -> Option<(u32, u32)> {
    match (&word.level, &word.category) {
        (None, None) => None,
        (level, category) => Some((
            level.as_ref().map(|t| t.order).unwrap_or(0),
            category.as_ref().map(|t| t.order).unwrap_or(0),
        )),
    }
}

fn cursor(user: &User) -> (u32, u32) {
    (
        user.current_level.unwrap_or(0),
        user.current_category.unwrap_or(0),
    )
}

impl P0Selection for CurriculumLadder {
    fn select(&self, user: &User, mut candidates: Vec<Word>, limit: usize) -> Vec<Word> {
        let cursor = cursor(user);
        candidates.sort_by_key(|word| match position(word) {
            Some(pos) if pos >= cursor => (0u8, pos.0, pos.1, word.seq),
            Some(pos) => (1, pos.0, pos.1, word.seq),
            None => (2, 0, 0, word.seq),
        });
        candidates.truncate(limit);
        candidates
    }
}

/// After a learn completion, the cursor advances to the highest curriculum
/// position among the words just learned. Returns None when nothing moves.
pub fn advanced_cursor(user: &User, learned: &[Word]) -> Option<(u32, u32)> {
    let best = learned.iter().filter_map(position).max()?;
    if best > cursor(user) {
        Some(best)
    } else {
        None
    }
}
