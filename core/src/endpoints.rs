//! Path templates for every backend operation.
//!
//! Static paths are constants; parameterized paths are functions that take
//! an already-validated value. Nothing here validates or encodes query
//! strings.

use crate::query::encode_path_segment;

pub const HEALTH: &str = "/";

pub const LEVELS: &str = "/api/v1/levels";
pub const TECHNIQUES: &str = "/api/v1/techniques";
pub const LEARNING: &str = "/api/v1/learning";
pub const BOARDS: &str = "/api/v1/boards";
pub const BOARDS_RANDOM: &str = "/api/v1/boards/random";
pub const BOARDS_COUNTS: &str = "/api/v1/boards/counts";
pub const DAILIES: &str = "/api/v1/dailies";
pub const DAILIES_RANDOM: &str = "/api/v1/dailies/random";
pub const DAILIES_TODAY: &str = "/api/v1/dailies/today";
pub const CHALLENGES: &str = "/api/v1/challenges";
pub const CHALLENGES_RANDOM: &str = "/api/v1/challenges/random";

pub const SOLVER_SOLVE: &str = "/api/v1/solver/solve";
pub const SOLVER_VALIDATE: &str = "/api/v1/solver/validate";
pub const SOLVER_GENERATE: &str = "/api/v1/solver/generate";

pub const PRACTICES: &str = "/api/v1/practices";
pub const PRACTICES_COUNTS: &str = "/api/v1/practices/counts";
pub const EXAMPLES: &str = "/api/v1/examples";
pub const EXAMPLES_COUNTS: &str = "/api/v1/examples/counts";

pub const PLAY_START: &str = "/api/v1/play/start";
pub const PLAY_FINISH: &str = "/api/v1/play/finish";

pub const GAMIFICATION_STATS: &str = "/api/v1/gamification/stats";
pub const GAMIFICATION_BADGES: &str = "/api/v1/gamification/badges";
pub const GAMIFICATION_HISTORY: &str = "/api/v1/gamification/history";

pub fn level(level: u32) -> String {
    format!("{LEVELS}/{level}")
}

pub fn technique(technique: u32) -> String {
    format!("{TECHNIQUES}/{technique}")
}

pub fn learning(id: &str) -> String {
    format!("{LEARNING}/{id}")
}

pub fn board(id: &str) -> String {
    format!("{BOARDS}/{id}")
}

pub fn daily(id: &str) -> String {
    format!("{DAILIES}/{id}")
}

pub fn daily_by_date(date: &str) -> String {
    format!("{DAILIES}/date/{date}")
}

pub fn challenge(id: &str) -> String {
    format!("{CHALLENGES}/{id}")
}

pub fn user_subscriptions(user_id: &str) -> String {
    format!("/api/v1/users/{}/subscriptions", encode_path_segment(user_id))
}

pub fn practice_random(technique: u32) -> String {
    format!("{PRACTICES}/technique/{technique}/random")
}
