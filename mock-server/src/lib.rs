//! In-memory stand-in for the sudoku backend.
//!
//! Implements the routes the client core talks to, with the same JSON
//! shapes, status codes and auth rules: writes and user endpoints need a
//! `Bearer` token, and a token starting with `premium` carries the premium
//! entitlement that unlocks `hintLevel=full` on the solver.
//!
//! Every body is an envelope `{"success", "data", "error"}`: answers carry
//! `data`, failures carry `error` (a message, or the paywall object on 402).

pub mod sudoku;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub level: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    pub technique: u32,
    pub title: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningContent {
    pub id: Uuid,
    pub technique: u32,
    pub title: String,
    pub content: String,
    pub order: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningInput {
    pub technique: u32,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: u32,
}

/// A stored puzzle. Boards, challenges, practices and examples all share
/// this shape; practices and examples are keyed by `technique`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: Uuid,
    pub board: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    pub level: u32,
    #[serde(default)]
    pub symmetrical: bool,
    #[serde(default)]
    pub techniques: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleInput {
    pub board: String,
    pub solution: Option<String>,
    pub level: u32,
    #[serde(default)]
    pub symmetrical: bool,
    #[serde(default)]
    pub techniques: Vec<u32>,
    pub technique: Option<u32>,
    pub description: Option<String>,
}

impl PuzzleInput {
    fn into_puzzle(self, id: Uuid) -> Puzzle {
        Puzzle {
            id,
            board: self.board,
            solution: self.solution,
            level: self.level,
            symmetrical: self.symmetrical,
            techniques: self.techniques,
            technique: self.technique,
            description: self.description,
        }
    }
}

/// The puzzle collections that share list/create/random/counts handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Board,
    Challenge,
    Practice,
    Example,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Board => "board",
            Kind::Challenge => "challenge",
            Kind::Practice => "practice",
            Kind::Example => "example",
        }
    }

    fn by_technique(self) -> bool {
        matches!(self, Kind::Practice | Kind::Example)
    }

    /// Bucket used by the `/counts` route: technique for practices and
    /// examples, level otherwise.
    fn count_key(self, puzzle: &Puzzle) -> Option<u32> {
        if self.by_technique() {
            puzzle.technique
        } else {
            Some(puzzle.level)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Daily {
    pub id: Uuid,
    pub date: String,
    pub board: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    pub level: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyInput {
    pub date: String,
    pub board: String,
    pub solution: Option<String>,
    pub level: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Transaction {
    id: Uuid,
    points: i64,
    reason: String,
}

#[derive(Default)]
pub struct Store {
    levels: BTreeMap<u32, Level>,
    techniques: BTreeMap<u32, Technique>,
    learning: BTreeMap<Uuid, LearningContent>,
    puzzles: HashMap<Kind, BTreeMap<Uuid, Puzzle>>,
    dailies: BTreeMap<Uuid, Daily>,
    sessions: HashMap<Uuid, String>,
    history: Vec<Transaction>,
    solved: u64,
}

impl Store {
    fn collection(&self, kind: Kind) -> impl Iterator<Item = &Puzzle> {
        self.puzzles.get(&kind).into_iter().flat_map(|c| c.values())
    }

    fn collection_mut(&mut self, kind: Kind) -> &mut BTreeMap<Uuid, Puzzle> {
        self.puzzles.entry(kind).or_default()
    }

    /// The most recent daily.
    fn today(&self) -> Option<&Daily> {
        self.dailies.values().max_by(|a, b| a.date.cmp(&b.date))
    }
}

pub type Db = Arc<RwLock<Store>>;

const SEED_PUZZLE: &str =
    "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

/// Seed data: a few levels and techniques, one lesson, and a single daily
/// dated `2025-01-15` that serves as "today" until a later one is added.
fn seed() -> Store {
    let mut store = Store::default();
    for (level, name) in [(1, "Beginner"), (2, "Easy"), (3, "Medium")] {
        store.levels.insert(
            level,
            Level {
                level,
                name: name.to_string(),
                description: None,
            },
        );
    }
    for (technique, title, level) in [
        (1, "Naked Single", 1),
        (2, "Hidden Single", 1),
        (3, "Naked Pair", 3),
        (4, "Pointing Pair", 3),
    ] {
        store.techniques.insert(
            technique,
            Technique {
                technique,
                title: title.to_string(),
                level,
                slug: None,
                description: None,
            },
        );
    }
    let lesson = LearningContent {
        id: Uuid::new_v4(),
        technique: 1,
        title: "Spotting a naked single".to_string(),
        content: "A cell with one candidate left holds that digit.".to_string(),
        order: 1,
    };
    store.learning.insert(lesson.id, lesson);
    let id = Uuid::new_v4();
    store.dailies.insert(
        id,
        Daily {
            id,
            date: "2025-01-15".to_string(),
            board: SEED_PUZZLE.to_string(),
            solution: None,
            level: 2,
        },
    );
    store
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/", get(health))
        .route("/api/v1/levels", get(list_levels).post(create_level))
        .route(
            "/api/v1/levels/{level}",
            get(get_level).put(update_level).delete(delete_level),
        )
        .route("/api/v1/techniques", get(list_techniques).post(create_technique))
        .route(
            "/api/v1/techniques/{technique}",
            get(get_technique).put(update_technique).delete(delete_technique),
        )
        .route("/api/v1/learning", get(list_learning).post(create_learning))
        .route(
            "/api/v1/learning/{id}",
            get(get_learning).put(update_learning).delete(delete_learning),
        )
        .route("/api/v1/boards", list_and_create(Kind::Board))
        .route("/api/v1/boards/random", random(Kind::Board))
        .route("/api/v1/boards/counts", counts(Kind::Board))
        .route("/api/v1/boards/{id}", item(Kind::Board))
        .route("/api/v1/dailies", get(list_dailies).post(create_daily))
        .route("/api/v1/dailies/random", get(random_daily))
        .route("/api/v1/dailies/today", get(today_daily))
        .route("/api/v1/dailies/date/{date}", get(daily_by_date))
        .route(
            "/api/v1/dailies/{id}",
            get(get_daily).put(update_daily).delete(delete_daily),
        )
        .route("/api/v1/challenges", list_and_create(Kind::Challenge))
        .route("/api/v1/challenges/random", random(Kind::Challenge))
        .route("/api/v1/challenges/{id}", item(Kind::Challenge))
        .route(
            "/api/v1/practices",
            list_and_create(Kind::Practice).delete(delete_all_practices),
        )
        .route("/api/v1/practices/counts", counts(Kind::Practice))
        .route(
            "/api/v1/practices/technique/{technique}/random",
            get(random_practice),
        )
        .route("/api/v1/examples", list_and_create(Kind::Example))
        .route("/api/v1/examples/counts", counts(Kind::Example))
        .route("/api/v1/users/{user_id}/subscriptions", get(subscriptions))
        .route("/api/v1/solver/solve", get(solve))
        .route("/api/v1/solver/validate", get(validate))
        .route("/api/v1/solver/generate", get(generate))
        .route("/api/v1/play/start", post(start_play))
        .route("/api/v1/play/finish", post(finish_play))
        .route("/api/v1/gamification/stats", get(stats))
        .route("/api/v1/gamification/badges", get(badges))
        .route("/api/v1/gamification/history", get(history))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<Value>,
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    let body = Envelope {
        success: true,
        data: Some(data),
        error: None,
    };
    (status, Json(body)).into_response()
}

fn ok<T: Serialize>(data: T) -> Response {
    respond(StatusCode::OK, data)
}

fn created<T: Serialize>(data: T) -> Response {
    respond(StatusCode::CREATED, data)
}

fn failure(status: StatusCode, error: Value) -> Response {
    let body = Envelope::<()> {
        success: false,
        data: None,
        error: Some(error),
    };
    (status, Json(body)).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    failure(status, Value::String(message.to_string()))
}

fn not_found(what: &str) -> Response {
    error(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

fn deleted(count: usize) -> Response {
    ok(json!({ "deleted": count }))
}

/// The bearer token, or a ready-made 401.
fn bearer(headers: &HeaderMap) -> Result<String, Response> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "missing bearer token"))
}

fn tier(token: &str) -> &'static str {
    if token.starts_with("premium") {
        "premium"
    } else {
        "free"
    }
}

async fn health() -> Response {
    ok(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

// --- levels ---

async fn list_levels(State(db): State<Db>) -> Response {
    ok(db.read().await.levels.values().cloned().collect::<Vec<_>>())
}

async fn get_level(State(db): State<Db>, Path(level): Path<u32>) -> Response {
    match db.read().await.levels.get(&level) {
        Some(l) => ok(l),
        None => not_found("level"),
    }
}

async fn create_level(State(db): State<Db>, headers: HeaderMap, Json(input): Json<Level>) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    if store.levels.contains_key(&input.level) {
        return error(StatusCode::CONFLICT, "level already exists");
    }
    store.levels.insert(input.level, input.clone());
    created(input)
}

async fn update_level(
    State(db): State<Db>,
    Path(level): Path<u32>,
    headers: HeaderMap,
    Json(input): Json<Level>,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    match store.levels.get_mut(&level) {
        Some(existing) => {
            existing.name = input.name;
            existing.description = input.description;
            ok(&*existing)
        }
        None => not_found("level"),
    }
}

async fn delete_level(State(db): State<Db>, Path(level): Path<u32>, headers: HeaderMap) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    match db.write().await.levels.remove(&level) {
        Some(_) => deleted(1),
        None => not_found("level"),
    }
}

// --- techniques ---

#[derive(Deserialize)]
struct LevelQuery {
    level: Option<u32>,
}

async fn list_techniques(State(db): State<Db>, Query(q): Query<LevelQuery>) -> Response {
    let store = db.read().await;
    let techniques: Vec<&Technique> = store
        .techniques
        .values()
        .filter(|t| q.level.map_or(true, |l| t.level == l))
        .collect();
    ok(techniques)
}

async fn get_technique(State(db): State<Db>, Path(technique): Path<u32>) -> Response {
    match db.read().await.techniques.get(&technique) {
        Some(t) => ok(t),
        None => not_found("technique"),
    }
}

async fn create_technique(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Technique>,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    if store.techniques.contains_key(&input.technique) {
        return error(StatusCode::CONFLICT, "technique already exists");
    }
    store.techniques.insert(input.technique, input.clone());
    created(input)
}

async fn update_technique(
    State(db): State<Db>,
    Path(technique): Path<u32>,
    headers: HeaderMap,
    Json(input): Json<Technique>,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    match store.techniques.get_mut(&technique) {
        Some(existing) => {
            existing.title = input.title;
            existing.level = input.level;
            existing.slug = input.slug;
            existing.description = input.description;
            ok(&*existing)
        }
        None => not_found("technique"),
    }
}

async fn delete_technique(
    State(db): State<Db>,
    Path(technique): Path<u32>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    match db.write().await.techniques.remove(&technique) {
        Some(_) => deleted(1),
        None => not_found("technique"),
    }
}

// --- learning ---

#[derive(Deserialize)]
struct LearningQuery {
    technique: Option<u32>,
    level: Option<u32>,
}

async fn list_learning(State(db): State<Db>, Query(q): Query<LearningQuery>) -> Response {
    let store = db.read().await;
    let technique_level = |t: u32| store.techniques.get(&t).map(|t| t.level);
    let mut items: Vec<&LearningContent> = store
        .learning
        .values()
        .filter(|l| q.technique.map_or(true, |t| l.technique == t))
        .filter(|l| q.level.map_or(true, |lv| technique_level(l.technique) == Some(lv)))
        .collect();
    items.sort_by_key(|l| (l.technique, l.order));
    ok(items)
}

async fn get_learning(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    match db.read().await.learning.get(&id) {
        Some(l) => ok(l),
        None => not_found("learning content"),
    }
}

async fn create_learning(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<LearningInput>,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    if !store.techniques.contains_key(&input.technique) {
        return error(StatusCode::BAD_REQUEST, "unknown technique");
    }
    let item = LearningContent {
        id: Uuid::new_v4(),
        technique: input.technique,
        title: input.title,
        content: input.content,
        order: input.order,
    };
    store.learning.insert(item.id, item.clone());
    created(item)
}

async fn update_learning(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<LearningInput>,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    match store.learning.get_mut(&id) {
        Some(item) => {
            item.technique = input.technique;
            item.title = input.title;
            item.content = input.content;
            item.order = input.order;
            ok(&*item)
        }
        None => not_found("learning content"),
    }
}

async fn delete_learning(State(db): State<Db>, Path(id): Path<Uuid>, headers: HeaderMap) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    match db.write().await.learning.remove(&id) {
        Some(_) => deleted(1),
        None => not_found("learning content"),
    }
}

// --- puzzle collections ---

#[derive(Deserialize, Default)]
struct PuzzleQuery {
    level: Option<u32>,
    symmetrical: Option<bool>,
    /// Comma-separated technique numbers; a puzzle must use all of them.
    techniques: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl PuzzleQuery {
    fn techniques(&self) -> Vec<u32> {
        self.techniques
            .as_deref()
            .map(|raw| raw.split(',').filter_map(|t| t.trim().parse().ok()).collect())
            .unwrap_or_default()
    }

    fn matches(&self, puzzle: &Puzzle) -> bool {
        self.level.map_or(true, |l| puzzle.level == l)
            && self.symmetrical.map_or(true, |s| puzzle.symmetrical == s)
            && self.techniques().iter().all(|t| puzzle.techniques.contains(t))
    }

    fn page<'a, T: 'a>(&self, items: impl Iterator<Item = &'a T>) -> Vec<&'a T> {
        items
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

fn list_and_create(kind: Kind) -> MethodRouter<Db> {
    get(move |State(db): State<Db>, Query(q): Query<PuzzleQuery>| list_puzzles(kind, db, q)).post(
        move |State(db): State<Db>, headers: HeaderMap, Json(input): Json<PuzzleInput>| {
            create_puzzle(kind, db, headers, input)
        },
    )
}

fn random(kind: Kind) -> MethodRouter<Db> {
    get(move |State(db): State<Db>, Query(q): Query<PuzzleQuery>| random_puzzle(kind, db, q))
}

fn counts(kind: Kind) -> MethodRouter<Db> {
    get(move |State(db): State<Db>| puzzle_counts(kind, db))
}

fn item(kind: Kind) -> MethodRouter<Db> {
    get(move |State(db): State<Db>, Path(id): Path<Uuid>| get_puzzle(kind, db, id))
        .put(
            move |State(db): State<Db>,
                  Path(id): Path<Uuid>,
                  headers: HeaderMap,
                  Json(input): Json<PuzzleInput>| update_puzzle(kind, db, id, headers, input),
        )
        .delete(
            move |State(db): State<Db>, Path(id): Path<Uuid>, headers: HeaderMap| {
                delete_puzzle(kind, db, id, headers)
            },
        )
}

async fn list_puzzles(kind: Kind, db: Db, q: PuzzleQuery) -> Response {
    let store = db.read().await;
    ok(q.page(store.collection(kind).filter(|p| q.matches(p))))
}

async fn random_puzzle(kind: Kind, db: Db, q: PuzzleQuery) -> Response {
    let store = db.read().await;
    let pick = store
        .collection(kind)
        .filter(|p| q.matches(p))
        .choose(&mut rand::thread_rng());
    match pick {
        Some(p) => ok(p),
        None => not_found(kind.name()),
    }
}

async fn puzzle_counts(kind: Kind, db: Db) -> Response {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for puzzle in db.read().await.collection(kind) {
        if let Some(key) = kind.count_key(puzzle) {
            *counts.entry(key.to_string()).or_insert(0) += 1;
        }
    }
    ok(counts)
}

async fn create_puzzle(kind: Kind, db: Db, headers: HeaderMap, input: PuzzleInput) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    if sudoku::parse(&input.board).is_none() {
        return error(StatusCode::BAD_REQUEST, "board must be 81 cells");
    }
    if kind.by_technique() && input.technique.is_none() {
        return error(StatusCode::BAD_REQUEST, "technique required");
    }
    let puzzle = input.into_puzzle(Uuid::new_v4());
    db.write().await.collection_mut(kind).insert(puzzle.id, puzzle.clone());
    log::debug!("created {} {}", kind.name(), puzzle.id);
    created(puzzle)
}

async fn get_puzzle(kind: Kind, db: Db, id: Uuid) -> Response {
    match db.read().await.collection(kind).find(|p| p.id == id) {
        Some(p) => ok(p),
        None => not_found(kind.name()),
    }
}

async fn update_puzzle(kind: Kind, db: Db, id: Uuid, headers: HeaderMap, input: PuzzleInput) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    if sudoku::parse(&input.board).is_none() {
        return error(StatusCode::BAD_REQUEST, "board must be 81 cells");
    }
    let mut store = db.write().await;
    match store.collection_mut(kind).get_mut(&id) {
        Some(puzzle) => {
            *puzzle = input.into_puzzle(id);
            ok(&*puzzle)
        }
        None => not_found(kind.name()),
    }
}

async fn delete_puzzle(kind: Kind, db: Db, id: Uuid, headers: HeaderMap) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    match db.write().await.collection_mut(kind).remove(&id) {
        Some(_) => deleted(1),
        None => not_found(kind.name()),
    }
}

async fn random_practice(State(db): State<Db>, Path(technique): Path<u32>) -> Response {
    let store = db.read().await;
    let pick = store
        .collection(Kind::Practice)
        .filter(|p| p.technique == Some(technique))
        .choose(&mut rand::thread_rng());
    match pick {
        Some(p) => ok(p),
        None => not_found("practice"),
    }
}

#[derive(Deserialize)]
struct ConfirmQuery {
    confirm: Option<bool>,
}

/// Clears every practice puzzle. Refused unless the caller passes
/// `confirm=true`.
async fn delete_all_practices(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(q): Query<ConfirmQuery>,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    if q.confirm != Some(true) {
        return error(StatusCode::BAD_REQUEST, "confirm=true required");
    }
    let mut store = db.write().await;
    let practices = store.collection_mut(Kind::Practice);
    let count = practices.len();
    practices.clear();
    log::info!("cleared {count} practice puzzle(s)");
    deleted(count)
}

// --- dailies ---

async fn list_dailies(State(db): State<Db>, Query(q): Query<PuzzleQuery>) -> Response {
    let store = db.read().await;
    let mut dailies: Vec<&Daily> = store
        .dailies
        .values()
        .filter(|d| q.level.map_or(true, |l| d.level == l))
        .collect();
    dailies.sort_by(|a, b| b.date.cmp(&a.date));
    ok(q.page(dailies.into_iter()))
}

async fn random_daily(State(db): State<Db>, Query(q): Query<PuzzleQuery>) -> Response {
    let store = db.read().await;
    let pick = store
        .dailies
        .values()
        .filter(|d| q.level.map_or(true, |l| d.level == l))
        .choose(&mut rand::thread_rng());
    match pick {
        Some(d) => ok(d),
        None => not_found("daily"),
    }
}

async fn today_daily(State(db): State<Db>) -> Response {
    match db.read().await.today() {
        Some(d) => ok(d),
        None => not_found("daily"),
    }
}

async fn daily_by_date(State(db): State<Db>, Path(date): Path<String>) -> Response {
    match db.read().await.dailies.values().find(|d| d.date == date) {
        Some(d) => ok(d),
        None => not_found("daily"),
    }
}

async fn get_daily(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    match db.read().await.dailies.get(&id) {
        Some(d) => ok(d),
        None => not_found("daily"),
    }
}

async fn create_daily(State(db): State<Db>, headers: HeaderMap, Json(input): Json<DailyInput>) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    if sudoku::parse(&input.board).is_none() {
        return error(StatusCode::BAD_REQUEST, "board must be 81 cells");
    }
    let mut store = db.write().await;
    if store.dailies.values().any(|d| d.date == input.date) {
        return error(StatusCode::CONFLICT, "a daily already exists for that date");
    }
    let daily = Daily {
        id: Uuid::new_v4(),
        date: input.date,
        board: input.board,
        solution: input.solution,
        level: input.level,
    };
    store.dailies.insert(daily.id, daily.clone());
    created(daily)
}

async fn update_daily(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<DailyInput>,
) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    match store.dailies.get_mut(&id) {
        Some(daily) => {
            daily.date = input.date;
            daily.board = input.board;
            daily.solution = input.solution;
            daily.level = input.level;
            ok(&*daily)
        }
        None => not_found("daily"),
    }
}

async fn delete_daily(State(db): State<Db>, Path(id): Path<Uuid>, headers: HeaderMap) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    match db.write().await.dailies.remove(&id) {
        Some(_) => deleted(1),
        None => not_found("daily"),
    }
}

// --- users ---

async fn subscriptions(Path(user_id): Path<String>, headers: HeaderMap) -> Response {
    let token = match bearer(&headers) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    if user_id.is_empty() {
        return error(StatusCode::BAD_REQUEST, "userId required");
    }
    let subs = match tier(&token) {
        "premium" => json!([{ "tier": "premium", "status": "active", "expiresAt": "2099-01-01" }]),
        _ => json!([]),
    };
    ok(subs)
}

// --- solver ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolveQuery {
    original: String,
    user: String,
    #[serde(default)]
    auto_pencilmarks: bool,
    hint_level: Option<String>,
}

async fn solve(headers: HeaderMap, Query(q): Query<SolveQuery>) -> Response {
    let token = match bearer(&headers) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let current = tier(&token);
    if q.hint_level.as_deref() == Some("full") && current != "premium" {
        return failure(
            StatusCode::PAYMENT_REQUIRED,
            json!({
                "code": "SUBSCRIPTION_REQUIRED",
                "message": "full hints require a premium subscription",
                "requiredEntitlement": "premium",
                "currentEntitlement": current,
                "hintLevel": "full",
            }),
        );
    }
    let (Some(original), Some(user)) = (sudoku::parse(&q.original), sudoku::parse(&q.user)) else {
        return error(StatusCode::BAD_REQUEST, "original and user must be 81 cells");
    };
    let mut grid = original;
    for (i, &d) in user.iter().enumerate() {
        if grid[i] == 0 {
            grid[i] = d;
        }
    }
    if !sudoku::consistent(&grid) {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "board has conflicts");
    }
    let hints = match sudoku::next_step(&grid) {
        Some(step) => vec![json!({
            "title": step.title,
            "text": format!("r{}c{} can only be {}", step.cell / 9 + 1, step.cell % 9 + 1, step.value),
            "cells": [step.cell],
            "value": step.value,
        })],
        None => Vec::new(),
    };
    let solved = grid.iter().all(|&d| d != 0);
    log::debug!("solve: {} hint(s), autoPencilmarks={}", hints.len(), q.auto_pencilmarks);
    ok(json!({ "hints": hints, "solved": solved }))
}

#[derive(Deserialize)]
struct ValidateQuery {
    board: String,
}

async fn validate(Query(q): Query<ValidateQuery>) -> Response {
    let Some(grid) = sudoku::parse(&q.board) else {
        return error(StatusCode::BAD_REQUEST, "board must be 81 cells");
    };
    let (count, solution) = sudoku::count_solutions(&grid, 2);
    let body = match count {
        0 => json!({ "unique": false, "message": "no solution" }),
        1 => json!({
            "unique": true,
            "message": "unique solution",
            "solution": solution.map(|s| sudoku::format(&s)),
        }),
        _ => json!({ "unique": false, "message": "multiple solutions" }),
    };
    ok(body)
}

#[derive(Deserialize)]
struct GenerateQuery {
    symmetrical: Option<bool>,
}

async fn generate(Query(q): Query<GenerateQuery>) -> Response {
    let symmetrical = q.symmetrical.unwrap_or(false);
    let (puzzle, solution) = sudoku::generate(symmetrical, &mut rand::thread_rng());
    ok(json!({
        "board": sudoku::format(&puzzle),
        "solution": sudoku::format(&solution),
        "symmetrical": symmetrical,
    }))
}

// --- play & gamification ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartInput {
    board: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinishInput {
    session_id: Uuid,
    solved: bool,
    #[serde(default)]
    hints_used: u32,
}

async fn start_play(State(db): State<Db>, headers: HeaderMap, Json(input): Json<StartInput>) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let session_id = Uuid::new_v4();
    db.write().await.sessions.insert(session_id, input.board);
    created(json!({ "sessionId": session_id }))
}

async fn finish_play(State(db): State<Db>, headers: HeaderMap, Json(input): Json<FinishInput>) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let mut store = db.write().await;
    if store.sessions.remove(&input.session_id).is_none() {
        return not_found("session");
    }
    let points = if input.solved {
        100 - 10 * i64::from(input.hints_used.min(9))
    } else {
        0
    };
    let mut new_badges = Vec::new();
    if input.solved {
        store.solved += 1;
        if store.solved == 1 {
            new_badges.push(json!({ "id": "first-solve", "name": "First Solve" }));
        }
    }
    store.history.push(Transaction {
        id: Uuid::new_v4(),
        points,
        reason: if input.solved { "puzzle solved" } else { "puzzle abandoned" }.to_string(),
    });
    ok(json!({ "pointsAwarded": points, "newBadges": new_badges }))
}

async fn stats(State(db): State<Db>, headers: HeaderMap) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let store = db.read().await;
    let total: i64 = store.history.iter().map(|t| t.points).sum();
    let badges: Vec<&str> = if store.solved > 0 { vec!["first-solve"] } else { vec![] };
    ok(json!({
        "totalPoints": total,
        "puzzlesSolved": store.solved,
        "currentStreak": store.solved.min(1),
        "longestStreak": store.solved.min(1),
        "badges": badges,
    }))
}

async fn badges() -> Response {
    ok(json!([
        { "id": "first-solve", "name": "First Solve", "description": "Solve your first puzzle" },
        { "id": "no-hints", "name": "Purist", "description": "Solve a puzzle without hints" },
    ]))
}

#[derive(Deserialize)]
struct PageQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn history(State(db): State<Db>, headers: HeaderMap, Query(q): Query<PageQuery>) -> Response {
    if let Err(resp) = bearer(&headers) {
        return resp;
    }
    let store = db.read().await;
    let limit = q.limit.unwrap_or(20);
    let offset = q.offset.unwrap_or(0);
    let page: Vec<_> = store.history.iter().rev().skip(offset).take(limit).cloned().collect();
    ok(json!({ "transactions": page, "total": store.history.len() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puzzle(level: u32, technique: Option<u32>, techniques: Vec<u32>) -> Puzzle {
        Puzzle {
            id: Uuid::new_v4(),
            board: SEED_PUZZLE.to_string(),
            solution: None,
            level,
            symmetrical: false,
            techniques,
            technique,
            description: None,
        }
    }

    #[test]
    fn puzzle_serializes_camel_case() {
        let puzzle = Puzzle {
            id: Uuid::nil(),
            symmetrical: true,
            ..puzzle(2, None, vec![1])
        };
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["symmetrical"], true);
        assert!(json.get("solution").is_none());
        assert!(json.get("technique").is_none());
    }

    #[test]
    fn puzzle_input_defaults() {
        let input: PuzzleInput =
            serde_json::from_str(&format!(r#"{{"board":"{}","level":1}}"#, "0".repeat(81))).unwrap();
        assert!(!input.symmetrical);
        assert!(input.techniques.is_empty());
        assert!(input.solution.is_none());
        assert!(input.technique.is_none());
    }

    #[test]
    fn puzzle_input_rejects_missing_level() {
        let result: Result<PuzzleInput, _> = serde_json::from_str(r#"{"board":"0"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn tier_comes_from_token_prefix() {
        assert_eq!(tier("premium-user"), "premium");
        assert_eq!(tier("t"), "free");
    }

    #[test]
    fn seed_has_levels_lessons_and_a_daily() {
        let store = seed();
        assert_eq!(store.levels.len(), 3);
        assert_eq!(store.learning.len(), 1);
        assert_eq!(store.dailies.len(), 1);
        assert_eq!(store.today().map(|d| d.date.as_str()), Some("2025-01-15"));
    }

    #[test]
    fn counts_bucket_by_technique_for_practices() {
        let p = puzzle(4, Some(7), vec![7]);
        assert_eq!(Kind::Practice.count_key(&p), Some(7));
        assert_eq!(Kind::Example.count_key(&p), Some(7));
        assert_eq!(Kind::Board.count_key(&p), Some(4));
        assert_eq!(Kind::Practice.count_key(&puzzle(4, None, vec![])), None);
    }

    #[test]
    fn query_requires_every_listed_technique() {
        let q = PuzzleQuery {
            techniques: Some("5,1".to_string()),
            ..Default::default()
        };
        assert!(q.matches(&puzzle(1, None, vec![1, 3, 5])));
        assert!(!q.matches(&puzzle(1, None, vec![1])));
    }

    #[test]
    fn query_pages_with_offset_and_limit() {
        let q = PuzzleQuery {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        };
        let items = [1, 2, 3, 4];
        assert_eq!(q.page(items.iter()), vec![&2, &3]);
    }
}
