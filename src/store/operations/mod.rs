pub mod answers;
pub mod progress;
pub mod sessions;
pub mod users;
pub mod words;
