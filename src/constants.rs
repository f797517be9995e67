/// 每个学习会话最多发放的新词数
pub const LEARN_SESSION_SIZE: usize = 5;

/// 每个练习会话最多包含的单词数
pub const PRACTICE_SESSION_SIZE: usize = 5;

/// 开始练习所需的最少可用单词数
pub const PRACTICE_MIN_WORDS: usize = 3;

/// 开始复习所需的最少可复习单词数
pub const REVIEW_MIN_WORDS: usize = 3;

/// 每个复习会话最多包含的单词数
pub const REVIEW_MAX_WORDS: usize = 5;

/// 每道选择题的选项数（1 个正确 + 3 个干扰项）
pub const OPTIONS_COUNT: usize = 4;

/// 每日学习上限（当日进入 P1 的单词数）
pub const DAILY_LEARN_LIMIT: u32 = 50;

/// P1 背压阈值：P1 中尚未到期的单词达到此数量时暂停发放新词
pub const P1_UPCOMING_LIMIT: usize = 10;

/// P1 等待时间（分钟），同时也是答错重试 / R 池重入的等待时间
pub const P1_WAIT_MINUTES: i64 = 10;

/// P2 等待时间（小时）
pub const P2_WAIT_HOURS: i64 = 20;

/// P3 等待时间（小时）
pub const P3_WAIT_HOURS: i64 = 44;

/// P4 等待时间（小时）
pub const P4_WAIT_HOURS: i64 = 68;

/// P5 等待时间（小时）
pub const P5_WAIT_HOURS: i64 = 164;

/// 复习展示阶段完成后，距离测试阶段的等待时间（小时）
pub const REVIEW_PHASE_WAIT_HOURS: i64 = 20;

/// 答错或复习测试失败后的重试等待时间（分钟）
pub const RETRY_WAIT_MINUTES: i64 = 10;
