use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sled::Transactional;

use crate::constants::DAILY_LEARN_LIMIT;
use crate::scheduler::{
    self, ExerciseType, Pool, WordProgress,
};
use crate::store::keys;
use crate::store::operations::answers::{AnswerRecord, AnswerSource};
use crate::store::{Store, StoreError};

/// One submitted answer, as handed to the assembler by the transport.
#[derive(Debug, Clone)]
pub struct AnswerInput {
    pub word_id: String,
    pub correct: bool,
    pub exercise_type: Option<ExerciseType>,
    pub response_time_ms: Option<i64>,
}

/// Per-row result of a submission transaction. `applied` is false when the
/// row was no longer eligible at transaction start (the client raced its own
/// state); such rows are reported with `previous_pool == new_pool` and an
/// unchanged `next_available_time`.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub word_id: String,
    pub correct: bool,
    pub previous_pool: Pool,
    pub new_pool: Pool,
    pub next_available_time: Option<DateTime<Utc>>,
    pub applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Practice,
    ReviewTest,
}

impl Store {
    pub fn get_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<WordProgress>, StoreError> {
        let key = keys::progress_key(user_id, word_id);
        match self.progress.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_user_progress(&self, user_id: &str) -> Result<Vec<WordProgress>, StoreError> {
        let prefix = keys::progress_prefix(user_id);
        let mut rows = Vec::new();
        for item in self.progress.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            rows.push(Self::deserialize::<WordProgress>(&v)?);
        }
        Ok(rows)
    }

    pub fn count_user_progress(&self, user_id: &str) -> Result<u64, StoreError> {
        let prefix = keys::progress_prefix(user_id);
        let mut count = 0u64;
        for item in self.progress.scan_prefix(prefix.as_bytes()) {
            let _ = item?;
            count += 1;
        }
        Ok(count)
    }

    /// 当日（UTC 日界）进入 P1 的单词数，按行上的 learned_at 统计。
    pub fn count_today_learned(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let today = now.date_naive();
        let mut count = 0u32;
        for row in self.list_user_progress(user_id)? {
            if row.learned_at.is_some_and(|t| t.date_naive() == today) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// P1 中尚未到期的行数（背压检查）。
    pub fn count_p1_upcoming(&self, user_id: &str, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut count = 0usize;
        for row in self.list_user_progress(user_id)? {
            if row.pool == Pool::P(1) && row.next_available_time.is_some_and(|t| t > now) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// 可练习的行（P1-P5 且已到期），按 next_available_time 升序。
    pub fn practice_candidates(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<WordProgress>, StoreError> {
        let mut rows: Vec<WordProgress> = self
            .list_user_progress(user_id)?
            .into_iter()
            .filter(|row| scheduler::eligible_for_practice(row, now))
            .collect();
        rows.sort_by(|a, b| {
            a.next_available_time
                .cmp(&b.next_available_time)
                .then_with(|| a.word_id.cmp(&b.word_id))
        });
        Ok(rows)
    }

    pub fn count_available_practice(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        Ok(self
            .list_user_progress(user_id)?
            .iter()
            .filter(|row| scheduler::eligible_for_practice(row, now))
            .count())
    }

    /// 可进入复习展示阶段的行，按 next_available_time 升序。
    pub fn review_display_candidates(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<WordProgress>, StoreError> {
        let mut rows: Vec<WordProgress> = self
            .list_user_progress(user_id)?
            .into_iter()
            .filter(|row| scheduler::eligible_for_review_display(row, now))
            .collect();
        rows.sort_by(|a, b| {
            a.next_available_time
                .cmp(&b.next_available_time)
                .then_with(|| a.word_id.cmp(&b.word_id))
        });
        Ok(rows)
    }

    /// 可复习总数 = 展示阶段到期 + 测试阶段到期。
    pub fn count_available_review(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        Ok(self
            .list_user_progress(user_id)?
            .iter()
            .filter(|row| {
                scheduler::eligible_for_review_display(row, now)
                    || scheduler::eligible_for_review_test(row, now)
            })
            .count())
    }

    /// next_available_time 落在 (now, now + 24h] 的行数。
    pub fn count_upcoming_24h(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let horizon = now + Duration::hours(24);
        Ok(self
            .list_user_progress(user_id)?
            .iter()
            .filter(|row| {
                row.next_available_time
                    .is_some_and(|t| t > now && t <= horizon)
            })
            .count())
    }

    /// 所有非空 next_available_time 中的最小值。
    pub fn min_next_available_time(
        &self,
        user_id: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .list_user_progress(user_id)?
            .iter()
            .filter_map(|row| row.next_available_time)
            .min())
    }

    /// Learn 完成：在一个事务内把给定 P0 单词建为 P1 行。
    ///
    /// `word_ids` 由调用方按 word_id 升序去重并过滤为已知词。事务内重新
    /// 执行两条准入规则：每日上限通过 (user, date) 计数器扣减，P1 背压
    /// 通过调用方扫描得出的 `p1_slots` 限额。已有进度行的单词是幂等
    /// 空操作，不消耗限额。返回实际插入的 word_id。
    pub fn move_words_to_p1(
        &self,
        user_id: &str,
        word_ids: &[String],
        now: DateTime<Utc>,
        p1_slots: usize,
    ) -> Result<Vec<String>, StoreError> {
        let counter_key = keys::daily_learned_key(user_id, now);

        let inserted = (&self.progress, &self.daily_learned)
            .transaction(|(tx_progress, tx_daily)| {
                let counter = match tx_daily.get(counter_key.as_bytes())? {
                    Some(raw) => {
                        let bytes: [u8; 4] = raw.as_ref().try_into().unwrap_or([0; 4]);
                        u32::from_be_bytes(bytes)
                    }
                    None => 0,
                };
                let daily_slots = DAILY_LEARN_LIMIT.saturating_sub(counter) as usize;
                let quota = daily_slots.min(p1_slots);

                let mut inserted = Vec::new();
                for word_id in word_ids {
                    let key = keys::progress_key(user_id, word_id);
                    if tx_progress.get(key.as_bytes())?.is_some() {
                        continue;
                    }
                    if inserted.len() >= quota {
                        continue;
                    }
                    let row = scheduler::learned_word(user_id, word_id, now);
                    let bytes = match serde_json::to_vec(&row) {
                        Ok(b) => b,
                        Err(_) => return sled::transaction::abort(()),
                    };
                    tx_progress.insert(key.as_bytes(), bytes)?;
                    inserted.push(word_id.clone());
                }

                let new_counter = counter + inserted.len() as u32;
                tx_daily.insert(counter_key.as_bytes(), &new_counter.to_be_bytes())?;
                Ok(inserted)
            })
            .map_err(Self::tx_error)?;

        Ok(inserted)
    }

    /// 练习 / 复习测试提交：在一个事务内重读每一行、校验资格、应用状态
    /// 机并写回，同时把每次作答追加到答题历史。行按 word_id 升序处理。
    ///
    /// `headwords` 同时充当已知词过滤器：不在其中的 word_id 被静默丢弃。
    pub fn apply_answers(
        &self,
        user_id: &str,
        answers: &[AnswerInput],
        headwords: &HashMap<String, String>,
        now: DateTime<Utc>,
        mode: SubmitMode,
    ) -> Result<Vec<TransitionOutcome>, StoreError> {
        // 预生成答题记录 id，保证事务重试时键稳定
        let answer_ids: Vec<String> = answers
            .iter()
            .map(|_| uuid::Uuid::new_v4().to_string())
            .collect();

        let mut order: Vec<usize> = (0..answers.len())
            .filter(|&i| headwords.contains_key(&answers[i].word_id))
            .collect();
        order.sort_by(|&a, &b| answers[a].word_id.cmp(&answers[b].word_id));

        let source = match mode {
            SubmitMode::Practice => AnswerSource::Practice,
            SubmitMode::ReviewTest => AnswerSource::ReviewTest,
        };

        let outcomes = (&self.progress, &self.answers)
            .transaction(|(tx_progress, tx_answers)| {
                let mut outcomes: Vec<(usize, TransitionOutcome)> = Vec::new();

                for &index in &order {
                    let answer = &answers[index];
                    let key = keys::progress_key(user_id, &answer.word_id);
                    let Some(raw) = tx_progress.get(key.as_bytes())? else {
                        // 没有进度行：未知状态，丢弃该条作答
                        continue;
                    };
                    let mut row: WordProgress = match serde_json::from_slice(&raw) {
                        Ok(row) => row,
                        Err(_) => return sled::transaction::abort(()),
                    };

                    let eligible = match mode {
                        SubmitMode::Practice => scheduler::eligible_for_practice(&row, now),
                        SubmitMode::ReviewTest => scheduler::eligible_for_review_test(&row, now),
                    };
                    if !eligible {
                        outcomes.push((
                            index,
                            TransitionOutcome {
                                word_id: answer.word_id.clone(),
                                correct: answer.correct,
                                previous_pool: row.pool,
                                new_pool: row.pool,
                                next_available_time: row.next_available_time,
                                applied: false,
                            },
                        ));
                        continue;
                    }

                    let previous_pool = row.pool;
                    scheduler::apply_answer(&mut row, answer.correct, now);

                    let bytes = match serde_json::to_vec(&row) {
                        Ok(b) => b,
                        Err(_) => return sled::transaction::abort(()),
                    };
                    tx_progress.insert(key.as_bytes(), bytes)?;

                    let record = AnswerRecord {
                        id: answer_ids[index].clone(),
                        user_id: user_id.to_string(),
                        word_id: answer.word_id.clone(),
                        word: headwords[&answer.word_id].clone(),
                        is_correct: answer.correct,
                        exercise_type: answer
                            .exercise_type
                            .or_else(|| scheduler::exercise_type(previous_pool)),
                        source,
                        pool: previous_pool,
                        response_time_ms: answer.response_time_ms,
                        created_at: now,
                    };
                    let record_key = keys::answer_key(
                        user_id,
                        now.timestamp_millis(),
                        &answer_ids[index],
                    );
                    let record_bytes = match serde_json::to_vec(&record) {
                        Ok(b) => b,
                        Err(_) => return sled::transaction::abort(()),
                    };
                    tx_answers.insert(record_key.as_bytes(), record_bytes)?;

                    outcomes.push((
                        index,
                        TransitionOutcome {
                            word_id: answer.word_id.clone(),
                            correct: answer.correct,
                            previous_pool,
                            new_pool: row.pool,
                            next_available_time: row.next_available_time,
                            applied: true,
                        },
                    ));
                }

                Ok(outcomes)
            })
            .map_err(Self::tx_error)?;

        // 按提交顺序返回
        let mut outcomes = outcomes;
        outcomes.sort_by_key(|(index, _)| *index);
        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }

    /// 复习展示阶段完成：把给定行切到测试阶段。已处于测试阶段的行是
    /// 幂等空操作。返回实际切换的行数。
    pub fn mark_reviews_practiced(
        &self,
        user_id: &str,
        word_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let mut sorted: Vec<&String> = word_ids.iter().collect();
        sorted.sort();
        sorted.dedup();

        let completed = self
            .progress
            .transaction(|tx| {
                let mut completed = 0u32;
                for word_id in &sorted {
                    let key = keys::progress_key(user_id, word_id);
                    let Some(raw) = tx.get(key.as_bytes())? else {
                        continue;
                    };
                    let mut row: WordProgress = match serde_json::from_slice(&raw) {
                        Ok(row) => row,
                        Err(_) => return sled::transaction::abort(()),
                    };
                    if !scheduler::complete_display(&mut row, now) {
                        continue;
                    }
                    let bytes = match serde_json::to_vec(&row) {
                        Ok(b) => b,
                        Err(_) => return sled::transaction::abort(()),
                    };
                    tx.insert(key.as_bytes(), bytes)?;
                    completed += 1;
                }
                Ok(completed)
            })
            .map_err(Self::tx_error)?;

        Ok(completed)
    }

    /// 删除该用户的全部进度行与每日计数器。返回删除的进度行数。
    pub fn reset_user_progress(&self, user_id: &str) -> Result<u64, StoreError> {
        let prefix = keys::progress_prefix(user_id);
        let mut row_keys = Vec::new();
        for item in self.progress.scan_prefix(prefix.as_bytes()) {
            let (k, _) = item?;
            row_keys.push(k);
        }
        let count = row_keys.len() as u64;
        for key in row_keys {
            self.progress.remove(key)?;
        }

        let counter_prefix = keys::daily_learned_prefix(user_id);
        let mut counter_keys = Vec::new();
        for item in self.daily_learned.scan_prefix(counter_prefix.as_bytes()) {
            let (k, _) = item?;
            counter_keys.push(k);
        }
        for key in counter_keys {
            self.daily_learned.remove(key)?;
        }

        Ok(count)
    }

    /// 调试辅助：把所有非空 next_available_time 置为 now，跳过等待期。
    pub fn reset_cooldowns(&self, user_id: &str, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut affected = 0u64;
        for mut row in self.list_user_progress(user_id)? {
            if row.next_available_time.is_some() {
                row.next_available_time = Some(now);
                let key = keys::progress_key(user_id, &row.word_id);
                self.progress
                    .insert(key.as_bytes(), Self::serialize(&row)?)?;
                affected += 1;
            }
        }
        Ok(affected)
    }
}
