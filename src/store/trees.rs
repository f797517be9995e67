/// Sled tree 名称常量。修改 tree 名称会导致已有数据不可访问，请勿随意更改。

pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";
pub const WORDS: &str = "words";
pub const PROGRESS: &str = "word_progress";
pub const ANSWERS: &str = "answer_history";
/// 每日学习计数器（(user, date) -> count），用于在事务内执行每日上限
pub const DAILY_LEARNED: &str = "daily_learned";
pub const META: &str = "meta";
