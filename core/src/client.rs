//! Endpoint façade for the sudoku API.
//!
//! # Design
//! `SudokuClient` holds an `Executor` (immutable configuration) and a
//! transport, and carries no mutable state between calls. Every method
//! follows the same three steps: validate inputs, describe the call as a
//! `RequestSpec`, hand it to the executor. No method does anything else.
//!
//! Reads are public. Mutations, `solve`, subscriptions and the
//! gamification user endpoints need a bearer token: either the one passed
//! to the call or the static token from `ClientConfig`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::endpoints;
use crate::error::{ApiError, ValidationError};
use crate::executor::{Executor, RequestSpec};
use crate::http::Transport;
use crate::query::{QueryParams, ToQuery};
use crate::types::*;
use crate::validate;

/// Timeout for `validate`, which runs a full uniqueness search server-side.
pub const VALIDATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Async client for the sudoku API over any `Transport`.
#[derive(Debug, Clone)]
pub struct SudokuClient<T> {
    executor: Executor,
    transport: T,
}

impl<T: Transport> SudokuClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            executor: Executor::new(&config),
            transport,
        }
    }

    pub fn with_base_url(base_url: &str, transport: T) -> Self {
        Self::new(ClientConfig::new(base_url), transport)
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn run<R: DeserializeOwned>(&self, spec: RequestSpec) -> Result<R, ApiError> {
        self.executor.execute(&self.transport, spec).await
    }

    /// A call token, or the configured one; fails locally when neither exists.
    fn credential<'a>(&self, token: Option<&'a str>) -> Result<Option<&'a str>, ApiError> {
        match token.filter(|t| !t.is_empty()) {
            Some(t) => Ok(Some(t)),
            None if self.executor.has_api_token() => Ok(None),
            None => Err(ValidationError::Required { field: "token" }.into()),
        }
    }

    fn get_with(path: &str, query: &impl ToQuery) -> RequestSpec {
        RequestSpec::get(query.to_query().append_to(path))
    }

    fn write<B: Serialize + ?Sized>(
        &self,
        spec: RequestSpec,
        body: &B,
        token: Option<&str>,
    ) -> Result<RequestSpec, ApiError> {
        let token = self.credential(token)?;
        spec.json(body).map(|s| s.token(token))
    }

    fn remove(&self, path: String, token: Option<&str>) -> Result<RequestSpec, ApiError> {
        let token = self.credential(token)?;
        Ok(RequestSpec::delete(path).token(token))
    }

    // -----------------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------------

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.run(RequestSpec::get(endpoints::HEALTH)).await
    }

    // -----------------------------------------------------------------------
    // Levels
    // -----------------------------------------------------------------------

    pub async fn list_levels(&self) -> Result<Vec<Level>, ApiError> {
        self.run(RequestSpec::get(endpoints::LEVELS)).await
    }

    pub async fn get_level(&self, level: u32) -> Result<Level, ApiError> {
        let level = validate::level(level)?;
        self.run(RequestSpec::get(endpoints::level(level))).await
    }

    pub async fn create_level<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Level, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::LEVELS), body, token)?;
        self.run(spec).await
    }

    pub async fn update_level<B: Serialize + ?Sized>(
        &self,
        level: u32,
        body: &B,
        token: Option<&str>,
    ) -> Result<Level, ApiError> {
        let level = validate::level(level)?;
        let spec = self.write(RequestSpec::put(endpoints::level(level)), body, token)?;
        self.run(spec).await
    }

    pub async fn delete_level(&self, level: u32, token: Option<&str>) -> Result<DeleteResult, ApiError> {
        let level = validate::level(level)?;
        let spec = self.remove(endpoints::level(level), token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Techniques
    // -----------------------------------------------------------------------

    pub async fn list_techniques(&self, filter: &TechniqueFilter) -> Result<Vec<Technique>, ApiError> {
        if let Some(level) = filter.level {
            validate::level(level)?;
        }
        self.run(Self::get_with(endpoints::TECHNIQUES, filter)).await
    }

    pub async fn get_technique(&self, technique: u32) -> Result<Technique, ApiError> {
        let technique = validate::technique(technique)?;
        self.run(RequestSpec::get(endpoints::technique(technique))).await
    }

    pub async fn create_technique<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Technique, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::TECHNIQUES), body, token)?;
        self.run(spec).await
    }

    pub async fn update_technique<B: Serialize + ?Sized>(
        &self,
        technique: u32,
        body: &B,
        token: Option<&str>,
    ) -> Result<Technique, ApiError> {
        let technique = validate::technique(technique)?;
        let spec = self.write(RequestSpec::put(endpoints::technique(technique)), body, token)?;
        self.run(spec).await
    }

    pub async fn delete_technique(
        &self,
        technique: u32,
        token: Option<&str>,
    ) -> Result<DeleteResult, ApiError> {
        let technique = validate::technique(technique)?;
        let spec = self.remove(endpoints::technique(technique), token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Learning content
    // -----------------------------------------------------------------------

    pub async fn list_learning(&self, filter: &LearningFilter) -> Result<Vec<LearningContent>, ApiError> {
        if let Some(technique) = filter.technique {
            validate::technique(technique)?;
        }
        if let Some(level) = filter.level {
            validate::level(level)?;
        }
        self.run(Self::get_with(endpoints::LEARNING, filter)).await
    }

    pub async fn get_learning(&self, id: &str) -> Result<LearningContent, ApiError> {
        let id = validate::uuid("learningId", id)?;
        self.run(RequestSpec::get(endpoints::learning(id))).await
    }

    pub async fn create_learning<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<LearningContent, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::LEARNING), body, token)?;
        self.run(spec).await
    }

    pub async fn update_learning<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<LearningContent, ApiError> {
        let id = validate::uuid("learningId", id)?;
        let spec = self.write(RequestSpec::put(endpoints::learning(id)), body, token)?;
        self.run(spec).await
    }

    pub async fn delete_learning(&self, id: &str, token: Option<&str>) -> Result<DeleteResult, ApiError> {
        let id = validate::uuid("learningId", id)?;
        let spec = self.remove(endpoints::learning(id), token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Boards
    // -----------------------------------------------------------------------

    pub async fn list_boards(&self, filter: &PuzzleFilter) -> Result<Vec<Board>, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::BOARDS, filter)).await
    }

    pub async fn get_board(&self, id: &str) -> Result<Board, ApiError> {
        let id = validate::uuid("boardId", id)?;
        self.run(RequestSpec::get(endpoints::board(id))).await
    }

    pub async fn random_board(&self, filter: &PuzzleFilter) -> Result<Board, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::BOARDS_RANDOM, filter)).await
    }

    pub async fn board_counts(&self) -> Result<Counts, ApiError> {
        self.run(RequestSpec::get(endpoints::BOARDS_COUNTS)).await
    }

    pub async fn create_board<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Board, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::BOARDS), body, token)?;
        self.run(spec).await
    }

    pub async fn update_board<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<Board, ApiError> {
        let id = validate::uuid("boardId", id)?;
        let spec = self.write(RequestSpec::put(endpoints::board(id)), body, token)?;
        self.run(spec).await
    }

    pub async fn delete_board(&self, id: &str, token: Option<&str>) -> Result<DeleteResult, ApiError> {
        let id = validate::uuid("boardId", id)?;
        let spec = self.remove(endpoints::board(id), token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Dailies
    // -----------------------------------------------------------------------

    pub async fn list_dailies(&self, filter: &PuzzleFilter) -> Result<Vec<Daily>, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::DAILIES, filter)).await
    }

    pub async fn get_daily(&self, id: &str) -> Result<Daily, ApiError> {
        let id = validate::uuid("dailyId", id)?;
        self.run(RequestSpec::get(endpoints::daily(id))).await
    }

    pub async fn random_daily(&self, filter: &PuzzleFilter) -> Result<Daily, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::DAILIES_RANDOM, filter)).await
    }

    pub async fn today_daily(&self) -> Result<Daily, ApiError> {
        self.run(RequestSpec::get(endpoints::DAILIES_TODAY)).await
    }

    pub async fn daily_by_date(&self, date: &str) -> Result<Daily, ApiError> {
        let date = validate::date("date", date)?;
        self.run(RequestSpec::get(endpoints::daily_by_date(date))).await
    }

    pub async fn create_daily<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Daily, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::DAILIES), body, token)?;
        self.run(spec).await
    }

    pub async fn update_daily<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<Daily, ApiError> {
        let id = validate::uuid("dailyId", id)?;
        let spec = self.write(RequestSpec::put(endpoints::daily(id)), body, token)?;
        self.run(spec).await
    }

    pub async fn delete_daily(&self, id: &str, token: Option<&str>) -> Result<DeleteResult, ApiError> {
        let id = validate::uuid("dailyId", id)?;
        let spec = self.remove(endpoints::daily(id), token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Challenges
    // -----------------------------------------------------------------------

    pub async fn list_challenges(&self, filter: &PuzzleFilter) -> Result<Vec<Challenge>, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::CHALLENGES, filter)).await
    }

    pub async fn get_challenge(&self, id: &str) -> Result<Challenge, ApiError> {
        let id = validate::uuid("challengeId", id)?;
        self.run(RequestSpec::get(endpoints::challenge(id))).await
    }

    pub async fn random_challenge(&self, filter: &PuzzleFilter) -> Result<Challenge, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::CHALLENGES_RANDOM, filter)).await
    }

    pub async fn create_challenge<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Challenge, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::CHALLENGES), body, token)?;
        self.run(spec).await
    }

    pub async fn update_challenge<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<Challenge, ApiError> {
        let id = validate::uuid("challengeId", id)?;
        let spec = self.write(RequestSpec::put(endpoints::challenge(id)), body, token)?;
        self.run(spec).await
    }

    pub async fn delete_challenge(&self, id: &str, token: Option<&str>) -> Result<DeleteResult, ApiError> {
        let id = validate::uuid("challengeId", id)?;
        let spec = self.remove(endpoints::challenge(id), token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub async fn user_subscriptions(
        &self,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<Subscription>, ApiError> {
        let user_id = validate::user_id(user_id)?;
        let token = self.credential(token)?;
        self.run(RequestSpec::get(endpoints::user_subscriptions(user_id)).token(token))
            .await
    }

    // -----------------------------------------------------------------------
    // Solver
    // -----------------------------------------------------------------------

    /// Step-by-step hints for the current position. A 402 with a paywall
    /// code comes back as `ApiError::AccessDenied`.
    pub async fn solve(&self, params: &SolveParams, token: Option<&str>) -> Result<SolveResult, ApiError> {
        validate::puzzle("original", &params.original)?;
        validate::puzzle("user", &params.user)?;
        for technique in &params.techniques {
            validate::technique(*technique)?;
        }
        let token = self.credential(token)?;
        let spec = Self::get_with(endpoints::SOLVER_SOLVE, params)
            .token(token)
            .paywall(params.hint_level.as_deref());
        self.run(spec).await
    }

    /// Whether `board` has exactly one solution.
    pub async fn validate(&self, params: &ValidateParams) -> Result<ValidateResult, ApiError> {
        validate::puzzle("board", &params.board)?;
        let spec = Self::get_with(endpoints::SOLVER_VALIDATE, params).timeout(VALIDATE_TIMEOUT);
        self.run(spec).await
    }

    pub async fn generate(&self, params: &GenerateParams) -> Result<GenerateResult, ApiError> {
        if let Some(level) = params.level {
            validate::level(level)?;
        }
        self.run(Self::get_with(endpoints::SOLVER_GENERATE, params)).await
    }

    // -----------------------------------------------------------------------
    // Practices
    // -----------------------------------------------------------------------

    pub async fn list_practices(&self, filter: &PuzzleFilter) -> Result<Vec<Practice>, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::PRACTICES, filter)).await
    }

    pub async fn practice_counts(&self) -> Result<Counts, ApiError> {
        self.run(RequestSpec::get(endpoints::PRACTICES_COUNTS)).await
    }

    pub async fn random_practice(&self, technique: u32) -> Result<Practice, ApiError> {
        let technique = validate::technique(technique)?;
        self.run(RequestSpec::get(endpoints::practice_random(technique))).await
    }

    pub async fn create_practice<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Practice, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::PRACTICES), body, token)?;
        self.run(spec).await
    }

    /// Removes every practice puzzle; the backend demands `confirm=true`.
    pub async fn delete_all_practices(&self, token: Option<&str>) -> Result<DeleteResult, ApiError> {
        let path = QueryParams::new().set("confirm", true).append_to(endpoints::PRACTICES);
        let spec = self.remove(path, token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Examples
    // -----------------------------------------------------------------------

    pub async fn list_examples(&self, filter: &PuzzleFilter) -> Result<Vec<Example>, ApiError> {
        check_puzzle_filter(filter)?;
        self.run(Self::get_with(endpoints::EXAMPLES, filter)).await
    }

    pub async fn example_counts(&self) -> Result<Counts, ApiError> {
        self.run(RequestSpec::get(endpoints::EXAMPLES_COUNTS)).await
    }

    pub async fn create_example<B: Serialize + ?Sized>(
        &self,
        body: &B,
        token: Option<&str>,
    ) -> Result<Example, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::EXAMPLES), body, token)?;
        self.run(spec).await
    }

    // -----------------------------------------------------------------------
    // Play sessions & gamification
    // -----------------------------------------------------------------------

    pub async fn start_play(&self, body: &StartPlay, token: Option<&str>) -> Result<PlaySession, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::PLAY_START), body, token)?;
        self.run(spec).await
    }

    pub async fn finish_play(&self, body: &FinishPlay, token: Option<&str>) -> Result<PlayResult, ApiError> {
        let spec = self.write(RequestSpec::post(endpoints::PLAY_FINISH), body, token)?;
        self.run(spec).await
    }

    pub async fn gamification_stats(&self, token: Option<&str>) -> Result<GamificationStats, ApiError> {
        let token = self.credential(token)?;
        self.run(RequestSpec::get(endpoints::GAMIFICATION_STATS).token(token))
            .await
    }

    pub async fn badges(&self) -> Result<Vec<Badge>, ApiError> {
        self.run(RequestSpec::get(endpoints::GAMIFICATION_BADGES)).await
    }

    pub async fn point_history(&self, page: &Page, token: Option<&str>) -> Result<PointHistory, ApiError> {
        validate::in_range("limit", page.limit, 1, validate::HISTORY_LIMIT_MAX)?;
        let token = self.credential(token)?;
        self.run(Self::get_with(endpoints::GAMIFICATION_HISTORY, page).token(token))
            .await
    }
}

fn check_puzzle_filter(filter: &PuzzleFilter) -> Result<(), ValidationError> {
    if let Some(level) = filter.level {
        validate::level(level)?;
    }
    for technique in &filter.techniques {
        validate::technique(*technique)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};

    /// Records every request and answers `data` in a success envelope.
    struct Recorder {
        reply: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn replying(data: Value) -> Self {
            Self {
                reply: HttpResponse::json(200, json!({"success": true, "data": data, "error": null})),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().expect("no request sent")
        }

        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    fn client(data: Value) -> SudokuClient<Recorder> {
        SudokuClient::with_base_url("http://localhost:5000", Recorder::replying(data))
    }

    fn level_json() -> Value {
        json!({"level": 3, "name": "Medium"})
    }

    #[tokio::test]
    async fn get_level_builds_path() {
        let c = client(level_json());
        let level = c.get_level(3).await.unwrap();
        assert_eq!(level.name, "Medium");
        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:5000/api/v1/levels/3");
        assert!(req.body.is_none());
        assert!(req.header("authorization").is_none());
    }

    #[tokio::test]
    async fn mutation_without_token_fails_locally() {
        let c = client(level_json());
        let input = LevelInput {
            level: 3,
            name: "Medium".to_string(),
            description: None,
        };
        let err = c.create_level(&input, None).await.unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::Required { field: "token" })
        );
        assert_eq!(c.transport().count(), 0);
    }

    #[tokio::test]
    async fn mutation_with_token_sends_body_and_bearer() {
        let c = client(level_json());
        let input = LevelInput {
            level: 3,
            name: "Medium".to_string(),
            description: None,
        };
        c.update_level(3, &input, Some("tok")).await.unwrap();
        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"level": 3, "name": "Medium"}));
    }

    #[tokio::test]
    async fn static_token_satisfies_mutations() {
        let config = ClientConfig::new("http://localhost:5000").with_api_token("static");
        let c = SudokuClient::new(config, Recorder::replying(json!({"deleted": 1})));
        let result = c.delete_level(2, None).await.unwrap();
        assert_eq!(result.deleted, 1);
        assert_eq!(c.transport().last().header("authorization"), Some("Bearer static"));
    }

    #[tokio::test]
    async fn validate_uses_long_timeout_and_others_do_not() {
        let c = client(json!({"unique": true}));
        let board = "0".repeat(81);
        c.validate(&ValidateParams { board: board.clone() }).await.unwrap();
        let req = c.transport().last();
        assert_eq!(req.timeout, Some(VALIDATE_TIMEOUT));
        assert_eq!(req.url, format!("http://localhost:5000/api/v1/solver/validate?board={board}"));

        c.generate(&GenerateParams::default()).await.unwrap_err();
        assert!(c.transport().last().timeout.is_none());
    }

    #[tokio::test]
    async fn generate_sends_symmetry_flag() {
        let c = client(json!({"board": "0".repeat(81), "symmetrical": true}));
        let params = GenerateParams {
            symmetrical: Some(true),
            level: None,
        };
        let result = c.generate(&params).await.unwrap();
        assert!(result.symmetrical);
        assert_eq!(
            c.transport().last().url,
            "http://localhost:5000/api/v1/solver/generate?symmetrical=true"
        );
    }

    #[tokio::test]
    async fn bad_uuid_never_reaches_transport() {
        let c = client(json!({}));
        let err = c.get_board("not-a-uuid").await.unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::InvalidFormat { field: "boardId", .. })
        ));
        let err = c.get_challenge("").await.unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::Required { field: "challengeId" })
        );
        assert_eq!(c.transport().count(), 0);
    }

    #[tokio::test]
    async fn daily_by_date_validates_shape() {
        let c = client(json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "date": "2025-01-15",
            "board": "0",
            "level": 1
        }));
        assert!(c.daily_by_date("01-15-2025").await.is_err());
        assert!(c.daily_by_date("2025/01/15").await.is_err());
        assert_eq!(c.transport().count(), 0);

        let daily = c.daily_by_date("2025-01-15").await.unwrap();
        assert_eq!(daily.date, "2025-01-15");
        assert_eq!(
            c.transport().last().url,
            "http://localhost:5000/api/v1/dailies/date/2025-01-15"
        );
    }

    #[tokio::test]
    async fn list_filters_become_sorted_query() {
        let c = client(json!([]));
        let filter = PuzzleFilter {
            symmetrical: Some(false),
            level: Some(2),
            techniques: vec![4, 9],
            ..Default::default()
        };
        c.list_boards(&filter).await.unwrap();
        assert_eq!(
            c.transport().last().url,
            "http://localhost:5000/api/v1/boards?level=2&symmetrical=false&techniques=4,9"
        );

        c.list_challenges(&PuzzleFilter::default()).await.unwrap();
        assert_eq!(c.transport().last().url, "http://localhost:5000/api/v1/challenges");
    }

    #[tokio::test]
    async fn delete_all_practices_sends_confirmation() {
        let c = client(json!({"deleted": 12}));
        c.delete_all_practices(Some("t")).await.unwrap();
        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:5000/api/v1/practices?confirm=true");
    }

    #[tokio::test]
    async fn history_requires_token_and_bounded_limit() {
        let c = client(json!({"transactions": [], "total": 0}));
        let page = Page { limit: 0, offset: 0 };
        assert!(matches!(
            c.point_history(&page, Some("t")).await.unwrap_err().as_validation(),
            Some(ValidationError::OutOfRange { field: "limit", .. })
        ));
        assert!(c.point_history(&Page::default(), None).await.is_err());

        c.point_history(&Page { limit: 10, offset: 30 }, Some("t")).await.unwrap();
        assert_eq!(
            c.transport().last().url,
            "http://localhost:5000/api/v1/gamification/history?limit=10&offset=30"
        );
    }

    #[tokio::test]
    async fn subscriptions_path_and_length_check() {
        let c = client(json!([{"tier": "premium", "status": "active"}]));
        let subs = c.user_subscriptions("auth0|42", Some("t")).await.unwrap();
        assert_eq!(subs[0].tier, "premium");
        assert_eq!(
            c.transport().last().url,
            "http://localhost:5000/api/v1/users/auth0%7C42/subscriptions"
        );
        let long = "x".repeat(129);
        assert!(c.user_subscriptions(&long, Some("t")).await.is_err());
        assert_eq!(c.transport().count(), 1);
    }

    #[tokio::test]
    async fn badges_are_public() {
        let c = client(json!([{"id": "first-solve", "name": "First Solve"}]));
        let badges = c.badges().await.unwrap();
        assert_eq!(badges.len(), 1);
        assert!(c.transport().last().header("authorization").is_none());
    }
}
