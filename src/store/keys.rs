use chrono::{DateTime, Utc};

pub fn user_key(user_id: &str) -> String {
    user_id.to_string()
}

pub fn username_index_key(username: &str) -> String {
    format!("username:{}", username.to_lowercase())
}

pub fn session_key(token_hash: &str) -> String {
    token_hash.to_string()
}

pub fn word_key(word_id: &str) -> String {
    word_id.to_string()
}

pub fn headword_index_key(headword: &str) -> String {
    format!("headword:{}", headword.to_lowercase())
}

pub fn progress_key(user_id: &str, word_id: &str) -> String {
    format!("{}:{}", user_id, word_id)
}

pub fn progress_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}

/// Answer history keys sort newest-first within a user.
pub fn answer_key(user_id: &str, timestamp_ms: i64, answer_id: &str) -> String {
    let ts = timestamp_ms.max(0) as u64;
    let reverse_ts = u64::MAX - ts;
    format!("{}:{:020}:{}", user_id, reverse_ts, answer_id)
}

pub fn answer_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}

/// 每日学习计数器键。日界固定为 UTC 零点。
pub fn daily_learned_key(user_id: &str, now: DateTime<Utc>) -> String {
    format!("{}:{}", user_id, now.format("%Y%m%d"))
}

pub fn daily_learned_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}
