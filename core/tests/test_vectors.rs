//! Verify façade calls against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector names a façade call and its arguments, the request the client
//! must send (or `null` when local validation must stop it), a simulated
//! response with its full `{success, data, error}` body, and the expected
//! outcome. Expected payloads are matched as JSON
//! subsets so optional fields do not have to be spelled out.

mod common;

use std::time::Duration;

use common::MockTransport;
use serde::Serialize;
use serde_json::Value;
use sudoku_core::{
    ApiError, GenerateParams, HttpMethod, HttpResponse, Page, PuzzleFilter, SolveParams,
    SudokuClient, TechniqueFilter, ValidateParams,
};

const BASE_URL: &str = "http://localhost:5000";

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn opt_u32(v: &Value) -> Option<u32> {
    v.as_u64().map(|n| n as u32)
}

fn u32_arg(args: &Value, key: &str) -> u32 {
    opt_u32(&args[key]).unwrap_or_else(|| panic!("missing numeric arg {key}"))
}

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args[key].as_str().unwrap_or_else(|| panic!("missing string arg {key}"))
}

fn u32_list(v: &Value) -> Vec<u32> {
    v.as_array()
        .map(|items| items.iter().filter_map(opt_u32).collect())
        .unwrap_or_default()
}

fn puzzle_filter(args: &Value) -> PuzzleFilter {
    PuzzleFilter {
        level: opt_u32(&args["level"]),
        symmetrical: args["symmetrical"].as_bool(),
        techniques: u32_list(&args["techniques"]),
        limit: opt_u32(&args["limit"]),
        offset: opt_u32(&args["offset"]),
    }
}

fn to_json<T: Serialize>(result: Result<T, ApiError>) -> Result<Value, ApiError> {
    result.map(|v| serde_json::to_value(v).unwrap())
}

/// Dispatch a vector's `call` to the matching façade method.
async fn invoke(c: &SudokuClient<MockTransport>, call: &str, args: &Value, token: Option<&str>) -> Result<Value, ApiError> {
    match call {
        "health" => to_json(c.health().await),
        "get_level" => to_json(c.get_level(u32_arg(args, "level")).await),
        "create_level" => to_json(c.create_level(&args["body"], token).await),
        "delete_level" => to_json(c.delete_level(u32_arg(args, "level"), token).await),
        "list_techniques" => {
            let filter = TechniqueFilter { level: opt_u32(&args["level"]) };
            to_json(c.list_techniques(&filter).await)
        }
        "list_boards" => to_json(c.list_boards(&puzzle_filter(args)).await),
        "get_board" => to_json(c.get_board(str_arg(args, "id")).await),
        "random_challenge" => to_json(c.random_challenge(&puzzle_filter(args)).await),
        "daily_by_date" => to_json(c.daily_by_date(str_arg(args, "date")).await),
        "random_practice" => to_json(c.random_practice(u32_arg(args, "technique")).await),
        "delete_all_practices" => to_json(c.delete_all_practices(token).await),
        "solve" => {
            let params = SolveParams {
                original: str_arg(args, "original").to_string(),
                user: str_arg(args, "user").to_string(),
                auto_pencilmarks: args["autoPencilmarks"].as_bool().unwrap_or(false),
                pencilmarks: args["pencilmarks"].as_str().map(str::to_string),
                techniques: u32_list(&args["techniques"]),
                hint_level: args["hintLevel"].as_str().map(str::to_string),
            };
            to_json(c.solve(&params, token).await)
        }
        "validate" => {
            let params = ValidateParams { board: str_arg(args, "board").to_string() };
            to_json(c.validate(&params).await)
        }
        "generate" => {
            let params = GenerateParams {
                symmetrical: args["symmetrical"].as_bool(),
                level: opt_u32(&args["level"]),
            };
            to_json(c.generate(&params).await)
        }
        "user_subscriptions" => to_json(c.user_subscriptions(str_arg(args, "userId"), token).await),
        "point_history" => {
            let page = Page {
                limit: u32_arg(args, "limit"),
                offset: u32_arg(args, "offset"),
            };
            to_json(c.point_history(&page, token).await)
        }
        "badges" => to_json(c.badges().await),
        "gamification_stats" => to_json(c.gamification_stats(token).await),
        other => panic!("no dispatcher for call {other}"),
    }
}

/// Every field in `expected` must be present and equal in `actual`; arrays
/// must match in length, element by element.
fn assert_subset(expected: &Value, actual: &Value, ctx: &str) {
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, value) in want {
                let found = got.get(key).unwrap_or_else(|| panic!("{ctx}: missing field {key}"));
                assert_subset(value, found, &format!("{ctx}.{key}"));
            }
        }
        (Value::Array(want), Value::Array(got)) => {
            assert_eq!(want.len(), got.len(), "{ctx}: array length");
            for (i, (w, g)) in want.iter().zip(got).enumerate() {
                assert_subset(w, g, &format!("{ctx}[{i}]"));
            }
        }
        _ => assert_eq!(expected, actual, "{ctx}"),
    }
}

async fn run_file(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = MockTransport::new();
        if let Some(response) = case.get("response") {
            let status = response["status"].as_u64().unwrap() as u16;
            transport.push(HttpResponse::json(status, response["body"].clone()));
        }
        let c = SudokuClient::with_base_url(BASE_URL, transport);

        let result = invoke(
            &c,
            case["call"].as_str().unwrap(),
            &case["args"],
            case["token"].as_str(),
        )
        .await;

        // request
        let expected_req = &case["expected_request"];
        if expected_req.is_null() {
            assert_eq!(c.transport().count(), 0, "{name}: nothing may be sent");
        } else {
            let req = c.transport().last();
            assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
            assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["url"].as_str().unwrap()), "{name}: url");
            for pair in expected_req["headers"].as_array().unwrap() {
                let (key, value) = (pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
                assert_eq!(req.header(key), Some(value), "{name}: header {key}");
            }
            if let Some(absent) = expected_req.get("absent_headers").and_then(Value::as_array) {
                for key in absent.iter().filter_map(Value::as_str) {
                    assert_eq!(req.header(key), None, "{name}: header {key} must be absent");
                }
            }
            if let Some(secs) = expected_req.get("timeout_secs").and_then(Value::as_u64) {
                assert_eq!(req.timeout, Some(Duration::from_secs(secs)), "{name}: timeout");
            }
            let body: Option<Value> = req.body.as_deref().map(|b| serde_json::from_str(b).unwrap());
            match &expected_req["body"] {
                Value::Null => assert!(body.is_none(), "{name}: body must be empty"),
                expected => assert_eq!(body.as_ref(), Some(expected), "{name}: body"),
            }
        }

        // outcome
        let expected = &case["expected"];
        match (result, expected.get("ok"), expected.get("error")) {
            (Ok(actual), Some(want), _) => assert_subset(want, &actual, name),
            (Err(err), _, Some(want)) => {
                assert_eq!(format!("{:?}", err.kind()), want["kind"].as_str().unwrap(), "{name}: kind");
                if let Some(field) = want.get("field").and_then(Value::as_str) {
                    assert_eq!(err.as_validation().map(|v| v.field()), Some(field), "{name}: field");
                }
                if let Some(status) = want.get("status").and_then(Value::as_u64) {
                    assert_eq!(err.status(), Some(status as u16), "{name}: status");
                }
                if let Some(message) = want.get("message").and_then(Value::as_str) {
                    assert_eq!(err.to_string(), message, "{name}: message");
                }
            }
            (Ok(actual), None, _) => panic!("{name}: expected an error, got {actual}"),
            (Err(err), None, _) => panic!("{name}: expected success, got {err}"),
            (Err(err), Some(_), None) => panic!("{name}: expected success, got {err}"),
        }
    }
}

#[tokio::test]
async fn reference_vectors() {
    run_file(include_str!("../../test-vectors/reference.json")).await;
}

#[tokio::test]
async fn puzzle_vectors() {
    run_file(include_str!("../../test-vectors/puzzles.json")).await;
}

#[tokio::test]
async fn solver_vectors() {
    run_file(include_str!("../../test-vectors/solver.json")).await;
}

#[tokio::test]
async fn user_vectors() {
    run_file(include_str!("../../test-vectors/users.json")).await;
}
