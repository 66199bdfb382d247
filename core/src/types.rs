//! Domain DTOs and request filters for the sudoku API.
//!
//! # Design
//! These types mirror the backend's JSON (camelCase on the wire) but are
//! defined independently of the mock-server crate; the integration tests
//! catch schema drift. Optional response fields default so that the client
//! keeps working when the backend adds or omits non-essential data.
//!
//! Filters implement `ToQuery`; their output feeds both the URL builder and
//! the cache-key model, which is what makes equal filters produce equal
//! keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::query::{QueryParams, ToQuery};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Body shape of every backend answer: `{"success", "data", "error"}`.
///
/// Exactly one of `data` and `error` is meaningful. A body with neither is
/// unusable and `interpret` rejects it as `ApiError::NoData`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<Value>,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub level: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    pub technique: u32,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub level: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningContent {
    pub id: Uuid,
    pub technique: u32,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: u32,
}

// ---------------------------------------------------------------------------
// Puzzles
// ---------------------------------------------------------------------------

/// A stored puzzle. Boards, challenges, practices and examples share this
/// shape; `technique` is only set for practices and examples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: Uuid,
    pub board: String,
    #[serde(default)]
    pub solution: Option<String>,
    pub level: u32,
    #[serde(default)]
    pub symmetrical: bool,
    #[serde(default)]
    pub techniques: Vec<u32>,
    #[serde(default)]
    pub technique: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

pub type Board = Puzzle;
pub type Challenge = Puzzle;
pub type Practice = Puzzle;
pub type Example = Puzzle;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Daily {
    pub id: Uuid,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub board: String,
    #[serde(default)]
    pub solution: Option<String>,
    pub level: u32,
}

/// Number of stored puzzles per level (or per technique), keyed by the
/// level/technique number as a string.
pub type Counts = BTreeMap<String, u64>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    #[serde(default)]
    pub deleted: u64,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Create / update payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelInput {
    pub level: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueInput {
    pub technique: u32,
    pub title: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningInput {
    pub technique: u32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub order: u32,
}

/// Payload for boards, challenges, practices and examples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleInput {
    pub board: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    pub level: u32,
    #[serde(default)]
    pub symmetrical: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub techniques: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyInput {
    pub date: String,
    pub board: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    pub level: u32,
}

// ---------------------------------------------------------------------------
// Users & subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Entitlement tier, e.g. `"premium"`.
    pub tier: String,
    pub status: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Inputs for `solve`. Grids are 81 characters, `0` or `.` for blanks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveParams {
    pub original: String,
    pub user: String,
    pub auto_pencilmarks: bool,
    /// Comma-separated pencil marks as produced by the board UI.
    pub pencilmarks: Option<String>,
    /// Restrict hints to these technique numbers.
    pub techniques: Vec<u32>,
    /// Requested hint depth, checked against the caller's entitlement.
    pub hint_level: Option<String>,
}

impl ToQuery for SolveParams {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set("original", self.original.as_str())
            .set("user", self.user.as_str())
            .set("autoPencilmarks", self.auto_pencilmarks)
            .set_opt("pencilmarks", self.pencilmarks.as_deref())
            .set_list("techniques", &self.techniques)
            .set_opt("hintLevel", self.hint_level.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub technique: Option<u32>,
    /// Cell indexes 0..81 the hint points at.
    #[serde(default)]
    pub cells: Vec<u32>,
    #[serde(default)]
    pub value: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    #[serde(default)]
    pub hints: Vec<Hint>,
    #[serde(default)]
    pub solved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateParams {
    pub board: String,
}

impl ToQuery for ValidateParams {
    fn to_query(&self) -> QueryParams {
        QueryParams::new().set("board", self.board.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResult {
    /// True when the puzzle has exactly one solution.
    pub unique: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateParams {
    pub symmetrical: Option<bool>,
    pub level: Option<u32>,
}

impl ToQuery for GenerateParams {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set_opt("symmetrical", self.symmetrical)
            .set_opt("level", self.level)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub board: String,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub symmetrical: bool,
}

// ---------------------------------------------------------------------------
// Gamification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartPlay {
    pub board: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaySession {
    pub session_id: Uuid,
    #[serde(default)]
    pub started_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinishPlay {
    pub session_id: Uuid,
    pub solved: bool,
    pub duration_seconds: u64,
    #[serde(default)]
    pub hints_used: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayResult {
    pub points_awarded: i64,
    #[serde(default)]
    pub new_badges: Vec<Badge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GamificationStats {
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub puzzles_solved: u64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PointTransaction {
    pub id: Uuid,
    pub points: i64,
    pub reason: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PointHistory {
    #[serde(default)]
    pub transactions: Vec<PointTransaction>,
    #[serde(default)]
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TechniqueFilter {
    pub level: Option<u32>,
}

impl ToQuery for TechniqueFilter {
    fn to_query(&self) -> QueryParams {
        QueryParams::new().set_opt("level", self.level)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LearningFilter {
    pub technique: Option<u32>,
    pub level: Option<u32>,
}

impl ToQuery for LearningFilter {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set_opt("technique", self.technique)
            .set_opt("level", self.level)
    }
}

/// Filter shared by the puzzle collections (boards, dailies, challenges,
/// practices, examples), for listing and for random picks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PuzzleFilter {
    pub level: Option<u32>,
    pub symmetrical: Option<bool>,
    pub techniques: Vec<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ToQuery for PuzzleFilter {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set_opt("level", self.level)
            .set_opt("symmetrical", self.symmetrical)
            .set_list("techniques", &self.techniques)
            .set_opt("limit", self.limit)
            .set_opt("offset", self.offset)
    }
}

/// Pagination for the point-transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

impl ToQuery for Page {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set("limit", self.limit)
            .set("offset", self.offset)
    }
}
