use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{DAILY_LEARN_LIMIT, P1_UPCOMING_LIMIT, PRACTICE_MIN_WORDS, REVIEW_MIN_WORDS};
use crate::scheduler::Pool;
use crate::session::UnavailableReason;
use crate::store::operations::users::User;
use crate::store::{Store, StoreError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeStats {
    pub today_learned: u32,
    pub available_practice: usize,
    pub available_review: usize,
    pub upcoming_24h: usize,
    pub can_learn: bool,
    pub can_practice: bool,
    pub can_review: bool,
    /// Set only when no activity is possible right now.
    pub next_available_time: Option<DateTime<Utc>>,
    pub current_level: Option<u32>,
    pub current_category: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    pub word_id: String,
    pub word: String,
    pub translation: String,
    pub next_available_time: Option<DateTime<Utc>>,
}

/// First failed learn precondition, checked in fixed order (daily limit,
/// backpressure, empty P0). None means learning is admitted.
pub fn learn_block_reason(
    store: &Store,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<UnavailableReason>, StoreError> {
    if store.count_today_learned(user_id, now)? >= DAILY_LEARN_LIMIT {
        return Ok(Some(UnavailableReason::DailyLimitReached));
    }
    if store.count_p1_upcoming(user_id, now)? >= P1_UPCOMING_LIMIT {
        return Ok(Some(UnavailableReason::P1PoolFull));
    }
    if store.count_user_progress(user_id)? >= store.count_words()? {
        return Ok(Some(UnavailableReason::NoWordsInP0));
    }
    Ok(None)
}

pub fn can_practice(store: &Store, user_id: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
    Ok(store.count_available_practice(user_id, now)? >= PRACTICE_MIN_WORDS)
}

pub fn can_review(store: &Store, user_id: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
    Ok(store.count_available_review(user_id, now)? >= REVIEW_MIN_WORDS)
}

/// Single read-only pass over the user's progress rows and the catalog.
pub fn get_home_stats(
    store: &Store,
    user: &User,
    now: DateTime<Utc>,
) -> Result<HomeStats, StoreError> {
    let today_learned = store.count_today_learned(&user.id, now)?;
    let available_practice = store.count_available_practice(&user.id, now)?;
    let available_review = store.count_available_review(&user.id, now)?;
    let upcoming_24h = store.count_upcoming_24h(&user.id, now)?;

    let can_learn = learn_block_reason(store, &user.id, now)?.is_none();
    let can_practice = available_practice >= PRACTICE_MIN_WORDS;
    let can_review = available_review >= REVIEW_MIN_WORDS;

    let next_available_time = if !can_learn && !can_practice && !can_review {
        store.min_next_available_time(&user.id)?
    } else {
        None
    };

    Ok(HomeStats {
        today_learned,
        available_practice,
        available_review,
        upcoming_24h,
        can_learn,
        can_practice,
        can_review,
        next_available_time,
        current_level: user.current_level,
        current_category: user.current_category,
    })
}

/// Diagnostics: every word grouped by pool, with P0 synthesized from the
/// catalog minus the user's progress rows.
pub fn get_pool_summary(
    store: &Store,
    user_id: &str,
) -> Result<BTreeMap<String, Vec<PoolEntry>>, StoreError> {
    let mut pools: BTreeMap<String, Vec<PoolEntry>> = Pool::all()
        .map(|pool| (pool.to_string(), Vec::new()))
        .collect();

    let catalog = store.list_words()?;
    let mut progressed: HashSet<String> = HashSet::new();

    for row in store.list_user_progress(user_id)? {
        progressed.insert(row.word_id.clone());
        let Some(word) = store.get_word(&row.word_id)? else {
            tracing::warn!(word_id = %row.word_id, "Progress row without catalog entry");
            continue;
        };
        pools
            .entry(row.pool.to_string())
            .or_default()
            .push(PoolEntry {
                word_id: row.word_id,
                word: word.word,
                translation: word.translation,
                next_available_time: row.next_available_time,
            });
    }

    for word in catalog {
        if !progressed.contains(&word.id) {
            pools
                .entry(Pool::P(0).to_string())
                .or_default()
                .push(PoolEntry {
                    word_id: word.id,
                    word: word.word,
                    translation: word.translation,
                    next_available_time: None,
                });
        }
    }

    Ok(pools)
}
