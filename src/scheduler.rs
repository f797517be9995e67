//! Pool state machine for spaced repetition.
//!
//! Every decision here is a pure function of `(pool, next_available_time,
//! review_stage, outcome, now)`. The scheduler never reads a clock; callers
//! sample `now` once per transaction and thread it through every transition
//! in the batch, so a submission of N answers produces identical
//! `next_available_time` values for equal pools.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    P1_WAIT_MINUTES, P2_WAIT_HOURS, P3_WAIT_HOURS, P4_WAIT_HOURS, P5_WAIT_HOURS,
    RETRY_WAIT_MINUTES, REVIEW_PHASE_WAIT_HOURS,
};

/// 单词所在的池。P0 未学，P6 已掌握，R1-R5 为对应 P 池的复习池。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pool {
    P(u8),
    R(u8),
}

impl Pool {
    pub fn is_practice_pool(self) -> bool {
        matches!(self, Pool::P(1..=5))
    }

    pub fn is_review_pool(self) -> bool {
        matches!(self, Pool::R(_))
    }

    /// All twelve pools in display order (P0..P6, R1..R5).
    pub fn all() -> impl Iterator<Item = Pool> {
        (0..=6).map(Pool::P).chain((1..=5).map(Pool::R))
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::P(level) => write!(f, "P{}", level),
            Pool::R(level) => write!(f, "R{}", level),
        }
    }
}

impl FromStr for Pool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid pool: {}", s);
        if let Some(rest) = s.strip_prefix('P') {
            let level: u8 = rest.parse().map_err(|_| invalid())?;
            if level <= 6 {
                return Ok(Pool::P(level));
            }
        } else if let Some(rest) = s.strip_prefix('R') {
            let level: u8 = rest.parse().map_err(|_| invalid())?;
            if (1..=5).contains(&level) {
                return Ok(Pool::R(level));
            }
        }
        Err(invalid())
    }
}

impl Serialize for Pool {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pool {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// R 池访问的两个子阶段：先重看（display），20 小时后重测（practice）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    Display,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    ReadingLv1,
    ListeningLv1,
    SpeakingLv1,
    ReadingLv2,
    SpeakingLv2,
}

impl ExerciseType {
    /// Whether option labels are translations (reading) or headwords
    /// (listening and speaking). Reading options must never reveal the
    /// headword.
    pub fn options_show_translation(self) -> bool {
        matches!(self, ExerciseType::ReadingLv1 | ExerciseType::ReadingLv2)
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExerciseType::ReadingLv1 => "reading_lv1",
            ExerciseType::ListeningLv1 => "listening_lv1",
            ExerciseType::SpeakingLv1 => "speaking_lv1",
            ExerciseType::ReadingLv2 => "reading_lv2",
            ExerciseType::SpeakingLv2 => "speaking_lv2",
        };
        f.write_str(name)
    }
}

/// Per-(user, word) scheduling state. Absence of a row means the word is
/// still in P0 for that user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub user_id: String,
    pub word_id: String,
    pub pool: Pool,
    pub learned_at: Option<DateTime<Utc>>,
    pub next_available_time: Option<DateTime<Utc>>,
    pub review_stage: Option<ReviewStage>,
    pub last_outcome_at: Option<DateTime<Utc>>,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

/// 进入某池后的等待时间。P0 无等待概念，P6 永不再出现。
pub fn wait(pool: Pool) -> Option<Duration> {
    match pool {
        Pool::P(1) => Some(Duration::minutes(P1_WAIT_MINUTES)),
        Pool::P(2) => Some(Duration::hours(P2_WAIT_HOURS)),
        Pool::P(3) => Some(Duration::hours(P3_WAIT_HOURS)),
        Pool::P(4) => Some(Duration::hours(P4_WAIT_HOURS)),
        Pool::P(5) => Some(Duration::hours(P5_WAIT_HOURS)),
        Pool::P(_) => None,
        // R 池重入统一等待 10 分钟后进入展示阶段
        Pool::R(_) => Some(Duration::minutes(RETRY_WAIT_MINUTES)),
    }
}

/// 池到题型的映射；R_k 与 P_k 相同。P0 / P6 不出题。
pub fn exercise_type(pool: Pool) -> Option<ExerciseType> {
    let level = match pool {
        Pool::P(level) => level,
        Pool::R(level) => level,
    };
    match level {
        1 => Some(ExerciseType::ReadingLv1),
        2 => Some(ExerciseType::ListeningLv1),
        3 => Some(ExerciseType::SpeakingLv1),
        4 => Some(ExerciseType::ReadingLv2),
        5 => Some(ExerciseType::SpeakingLv2),
        _ => None,
    }
}

fn retry_wait() -> Duration {
    Duration::minutes(RETRY_WAIT_MINUTES)
}

fn review_phase_wait() -> Duration {
    Duration::hours(REVIEW_PHASE_WAIT_HOURS)
}

pub fn eligible_for_practice(progress: &WordProgress, now: DateTime<Utc>) -> bool {
    progress.pool.is_practice_pool()
        && progress
            .next_available_time
            .is_some_and(|t| now >= t)
}

pub fn eligible_for_review_display(progress: &WordProgress, now: DateTime<Utc>) -> bool {
    progress.pool.is_review_pool()
        && progress.review_stage == Some(ReviewStage::Display)
        && progress
            .next_available_time
            .is_some_and(|t| now >= t)
}

pub fn eligible_for_review_test(progress: &WordProgress, now: DateTime<Utc>) -> bool {
    progress.pool.is_review_pool()
        && progress.review_stage == Some(ReviewStage::Practice)
        && progress
            .next_available_time
            .is_some_and(|t| now >= t)
}

/// Learn 完成：为一个 P0 单词建立 P1 行。
pub fn learned_word(user_id: &str, word_id: &str, now: DateTime<Utc>) -> WordProgress {
    WordProgress {
        user_id: user_id.to_string(),
        word_id: word_id.to_string(),
        pool: Pool::P(1),
        learned_at: Some(now),
        next_available_time: Some(now + retry_wait()),
        review_stage: None,
        last_outcome_at: Some(now),
        correct_count: 0,
        incorrect_count: 0,
    }
}

/// 对一次作答应用状态机。调用方须已校验该行当前可练习 / 可测试。
///
/// - P_k 答对：晋级 P_{k+1}，按新池等待；P6 不再安排时间。
/// - P_k 答错（k ≥ 2）：降入 R_k 展示阶段，10 分钟后可看。
/// - P1 答错：留在 P1，10 分钟后重试（P1 之下没有 R 池）。
/// - R_k 测试答对：回到 P_k，按 P_k 等待。
/// - R_k 测试答错：留在 R_k，回到展示阶段，10 分钟后可看。
pub fn apply_answer(progress: &mut WordProgress, correct: bool, now: DateTime<Utc>) {
    match (progress.pool, correct) {
        (Pool::P(level), true) => {
            let next = Pool::P(level + 1);
            progress.pool = next;
            progress.review_stage = None;
            progress.next_available_time = wait(next).map(|w| now + w);
        }
        (Pool::P(1), false) => {
            progress.next_available_time = Some(now + retry_wait());
        }
        (Pool::P(level), false) => {
            progress.pool = Pool::R(level);
            progress.review_stage = Some(ReviewStage::Display);
            progress.next_available_time = Some(now + retry_wait());
        }
        (Pool::R(level), true) => {
            let back = Pool::P(level);
            progress.pool = back;
            progress.review_stage = None;
            progress.next_available_time = wait(back).map(|w| now + w);
        }
        (Pool::R(_), false) => {
            progress.review_stage = Some(ReviewStage::Display);
            progress.next_available_time = Some(now + retry_wait());
        }
    }

    progress.last_outcome_at = Some(now);
    if correct {
        progress.correct_count += 1;
    } else {
        progress.incorrect_count += 1;
    }
}

/// 复习展示阶段完成：切到测试阶段，20 小时后可测。
/// 已处于测试阶段的行不做任何改动（幂等），返回 false。
pub fn complete_display(progress: &mut WordProgress, now: DateTime<Utc>) -> bool {
    if !progress.pool.is_review_pool() || progress.review_stage != Some(ReviewStage::Display) {
        return false;
    }
    progress.review_stage = Some(ReviewStage::Practice);
    progress.next_available_time = Some(now + review_phase_wait());
    progress.last_outcome_at = Some(now);
    true
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn row(pool: Pool, available_at: DateTime<Utc>) -> WordProgress {
        WordProgress {
            user_id: "u1".to_string(),
            word_id: "w1".to_string(),
            pool,
            learned_at: Some(t0()),
            next_available_time: Some(available_at),
            review_stage: if pool.is_review_pool() {
                Some(ReviewStage::Display)
            } else {
                None
            },
            last_outcome_at: None,
            correct_count: 0,
            incorrect_count: 0,
        }
    }

    #[test]
    fn pool_round_trips_through_strings() {
        for pool in Pool::all() {
            let text = pool.to_string();
            assert_eq!(text.parse::<Pool>().unwrap(), pool);
        }
        assert!("P7".parse::<Pool>().is_err());
        assert!("R0".parse::<Pool>().is_err());
        assert!("R6".parse::<Pool>().is_err());
        assert!("X1".parse::<Pool>().is_err());
        assert!("".parse::<Pool>().is_err());
    }

    #[test]
    fn wait_table_matches_ladder() {
        assert_eq!(wait(Pool::P(1)), Some(Duration::minutes(10)));
        assert_eq!(wait(Pool::P(2)), Some(Duration::hours(20)));
        assert_eq!(wait(Pool::P(3)), Some(Duration::hours(44)));
        assert_eq!(wait(Pool::P(4)), Some(Duration::hours(68)));
        assert_eq!(wait(Pool::P(5)), Some(Duration::hours(164)));
        assert_eq!(wait(Pool::P(0)), None);
        assert_eq!(wait(Pool::P(6)), None);
        for level in 1..=5 {
            assert_eq!(wait(Pool::R(level)), Some(Duration::minutes(10)));
        }
    }

    #[test]
    fn exercise_types_follow_pool_level() {
        assert_eq!(exercise_type(Pool::P(1)), Some(ExerciseType::ReadingLv1));
        assert_eq!(exercise_type(Pool::P(2)), Some(ExerciseType::ListeningLv1));
        assert_eq!(exercise_type(Pool::P(3)), Some(ExerciseType::SpeakingLv1));
        assert_eq!(exercise_type(Pool::P(4)), Some(ExerciseType::ReadingLv2));
        assert_eq!(exercise_type(Pool::P(5)), Some(ExerciseType::SpeakingLv2));
        assert_eq!(exercise_type(Pool::R(2)), exercise_type(Pool::P(2)));
        assert_eq!(exercise_type(Pool::P(0)), None);
        assert_eq!(exercise_type(Pool::P(6)), None);
    }

    #[test]
    fn practice_eligibility_requires_elapsed_wait() {
        let now = t0();
        assert!(eligible_for_practice(&row(Pool::P(1), now), now));
        assert!(!eligible_for_practice(
            &row(Pool::P(1), now + Duration::minutes(1)),
            now
        ));
        assert!(!eligible_for_practice(&row(Pool::R(2), now), now));

        let mut mastered = row(Pool::P(6), now);
        mastered.next_available_time = None;
        assert!(!eligible_for_practice(&mastered, now));
    }

    #[test]
    fn review_eligibility_tracks_stage() {
        let now = t0();
        let display = row(Pool::R(3), now);
        assert!(eligible_for_review_display(&display, now));
        assert!(!eligible_for_review_test(&display, now));

        let mut test = row(Pool::R(3), now);
        test.review_stage = Some(ReviewStage::Practice);
        assert!(!eligible_for_review_display(&test, now));
        assert!(eligible_for_review_test(&test, now));
    }

    #[test]
    fn correct_answer_climbs_ladder() {
        let now = t0();
        let mut progress = row(Pool::P(1), now);
        apply_answer(&mut progress, true, now);
        assert_eq!(progress.pool, Pool::P(2));
        assert_eq!(progress.next_available_time, Some(now + Duration::hours(20)));
        assert_eq!(progress.correct_count, 1);

        let mut top = row(Pool::P(5), now);
        apply_answer(&mut top, true, now);
        assert_eq!(top.pool, Pool::P(6));
        assert_eq!(top.next_available_time, None);
    }

    #[test]
    fn wrong_answer_in_p1_stays_in_p1() {
        let now = t0();
        let mut progress = row(Pool::P(1), now);
        apply_answer(&mut progress, false, now);
        assert_eq!(progress.pool, Pool::P(1));
        assert_eq!(
            progress.next_available_time,
            Some(now + Duration::minutes(10))
        );
        assert_eq!(progress.review_stage, None);
        assert_eq!(progress.incorrect_count, 1);
    }

    #[test]
    fn wrong_answer_above_p1_demotes_to_matching_r_pool() {
        let now = t0();
        for level in 2..=5 {
            let mut progress = row(Pool::P(level), now);
            apply_answer(&mut progress, false, now);
            assert_eq!(progress.pool, Pool::R(level));
            assert_eq!(progress.review_stage, Some(ReviewStage::Display));
            assert_eq!(
                progress.next_available_time,
                Some(now + Duration::minutes(10))
            );
        }
    }

    #[test]
    fn review_test_returns_to_failed_pool() {
        let now = t0();
        let mut progress = row(Pool::R(2), now);
        progress.review_stage = Some(ReviewStage::Practice);
        apply_answer(&mut progress, true, now);
        assert_eq!(progress.pool, Pool::P(2));
        assert_eq!(progress.review_stage, None);
        assert_eq!(progress.next_available_time, Some(now + Duration::hours(20)));
    }

    #[test]
    fn review_test_failure_reenters_display() {
        let now = t0();
        let mut progress = row(Pool::R(4), now);
        progress.review_stage = Some(ReviewStage::Practice);
        apply_answer(&mut progress, false, now);
        assert_eq!(progress.pool, Pool::R(4));
        assert_eq!(progress.review_stage, Some(ReviewStage::Display));
        assert_eq!(
            progress.next_available_time,
            Some(now + Duration::minutes(10))
        );
    }

    #[test]
    fn display_completion_is_idempotent() {
        let now = t0();
        let mut progress = row(Pool::R(2), now);
        assert!(complete_display(&mut progress, now));
        assert_eq!(progress.review_stage, Some(ReviewStage::Practice));
        assert_eq!(progress.next_available_time, Some(now + Duration::hours(20)));

        let later = now + Duration::hours(1);
        assert!(!complete_display(&mut progress, later));
        assert_eq!(progress.next_available_time, Some(now + Duration::hours(20)));
    }

    #[test]
    fn learn_completion_creates_p1_row() {
        let now = t0();
        let progress = learned_word("u1", "w9", now);
        assert_eq!(progress.pool, Pool::P(1));
        assert_eq!(progress.learned_at, Some(now));
        assert_eq!(
            progress.next_available_time,
            Some(now + Duration::minutes(10))
        );
        assert_eq!(progress.review_stage, None);
    }

    #[test]
    fn batch_transitions_share_now() {
        // 同一事务内两行相同池的作答必须得到相同的 next_available_time
        let now = t0();
        let mut first = row(Pool::P(2), now);
        let mut second = row(Pool::P(2), now);
        apply_answer(&mut first, true, now);
        apply_answer(&mut second, true, now);
        assert_eq!(first.next_available_time, second.next_available_time);
    }
}
