mod leaderboard;
mod persistence;

pub use leaderboard::{Leaderboard, LeaderboardRow};
pub use persistence::{load_cases, load_jsonl, load_predictions, write_json};
