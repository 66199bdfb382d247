//! Request assembly and response interpretation.
//!
//! # Design
//! `RequestSpec` is what a façade method knows about a call (method, path,
//! body, token, timeout). `Executor::build` turns it into a complete
//! `HttpRequest`; `Executor::execute` sends it and `interpret` maps the
//! envelope to a payload or an `ApiError`. Building and interpreting are
//! pure, so both are unit-tested without a transport.

use std::time::Duration;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{AccessDenied, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::ApiResponse;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// Error codes the backend uses on a 402 from the solve endpoint.
pub const ACCESS_DENIED_CODES: &[&str] = &["SUBSCRIPTION_REQUIRED", "HINT_LEVEL_LOCKED"];

/// How a non-2xx response should be classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    #[default]
    Generic,
    /// Recognize the 402 paywall payload (solve only).
    Paywall,
}

/// Per-call request description, before defaults and base URL are applied.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
    pub policy: ErrorPolicy,
    /// Hint level the caller asked for; reported on a paywall denial when
    /// the payload does not echo it.
    pub hint_level: Option<String>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
            token: None,
            timeout: None,
            policy: ErrorPolicy::Generic,
            hint_level: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn paywall(mut self, hint_level: Option<&str>) -> Self {
        self.policy = ErrorPolicy::Paywall;
        self.hint_level = hint_level.map(str::to_string);
        self
    }
}

/// Applies the client configuration to `RequestSpec`s and runs them.
#[derive(Debug, Clone)]
pub struct Executor {
    base_url: String,
    api_token: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl Executor {
    pub fn new(config: &ClientConfig) -> Self {
        let mut default_headers = vec![
            (CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()),
            (ACCEPT.to_string(), APPLICATION_JSON.to_string()),
        ];
        for (name, value) in &config.default_headers {
            merge_header(&mut default_headers, name, value);
        }
        Self {
            base_url: config.normalized_base_url().to_string(),
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
            default_headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_token(&self) -> bool {
        self.api_token.is_some()
    }

    /// Produce the full request: absolute URL, merged headers, bearer token
    /// (per-call token first, then the configured one), JSON body for
    /// non-GET methods only.
    pub fn build(&self, spec: &RequestSpec) -> Result<HttpRequest, ApiError> {
        let mut headers = self.default_headers.clone();
        for (name, value) in &spec.headers {
            merge_header(&mut headers, name, value);
        }

        let token = spec
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.api_token.as_deref());
        match token {
            Some(t) => merge_header(&mut headers, AUTHORIZATION, &format!("Bearer {t}")),
            None => headers.retain(|(k, _)| !k.eq_ignore_ascii_case(AUTHORIZATION)),
        }

        let body = match (&spec.method, &spec.body) {
            (HttpMethod::Get, _) | (_, None) => None,
            (_, Some(value)) => Some(
                serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))?,
            ),
        };

        Ok(HttpRequest {
            method: spec.method,
            url: format!("{}{}", self.base_url, spec.path),
            headers,
            body,
            timeout: spec.timeout,
        })
    }

    /// Build, send and interpret; the payload is decoded into `T`.
    pub async fn execute<T, C>(&self, transport: &C, spec: RequestSpec) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        C: Transport + ?Sized,
    {
        let request = self.build(&spec)?;
        debug!(
            "{} {} (auth: {})",
            request.method,
            request.url,
            request.header(AUTHORIZATION).is_some()
        );
        let response = transport.send(request).await.map_err(|e| {
            warn!("{} {} failed: {}", spec.method, spec.path, e);
            ApiError::Transport(e)
        })?;
        debug!("{} {} -> {}", spec.method, spec.path, response.status);
        interpret(response, &spec)
    }
}

/// Map a response envelope to a decoded payload or an error.
///
/// A success status must carry an `ApiResponse` body: its `error` becomes
/// `ApiError::Api`, its `data` is the result, and a body with neither is
/// `ApiError::NoData`.
pub fn interpret<T: DeserializeOwned>(response: HttpResponse, spec: &RequestSpec) -> Result<T, ApiError> {
    let status = response.status;
    let ok = response.ok();
    let Some(data) = response.data else {
        warn!("{} {} returned no data (HTTP {status})", spec.method, spec.path);
        return Err(ApiError::NoData { status });
    };

    if !ok {
        if spec.policy == ErrorPolicy::Paywall && status == 402 {
            if let Some(denied) = access_denied(&data, spec.hint_level.as_deref()) {
                debug!("{} {} denied: {}", spec.method, spec.path, denied);
                return Err(ApiError::AccessDenied(denied));
            }
        }
        let message = error_message(&data).unwrap_or_else(|| {
            if response.status_text.is_empty() {
                format!("request failed with status {status}")
            } else {
                response.status_text.clone()
            }
        });
        return Err(ApiError::Api {
            status,
            message,
            body: Some(data),
        });
    }

    let envelope: ApiResponse<T> =
        serde_json::from_value(data).map_err(|e| ApiError::Deserialization {
            status,
            message: e.to_string(),
        })?;
    match envelope {
        ApiResponse {
            error: Some(detail), ..
        } => {
            let message = error_message(&detail).unwrap_or_else(|| "request failed".to_string());
            warn!("{} {} answered {status} with an error: {message}", spec.method, spec.path);
            Err(ApiError::Api {
                status,
                message,
                body: Some(detail),
            })
        }
        ApiResponse { data: Some(data), .. } => Ok(data),
        ApiResponse { data: None, .. } => {
            warn!("{} {} returned an empty envelope (HTTP {status})", spec.method, spec.path);
            Err(ApiError::NoData { status })
        }
    }
}

/// Recognize the paywall payload.
///
/// Accepts the fields either at the top level or nested under `error`:
/// `{"code": "SUBSCRIPTION_REQUIRED", "requiredEntitlement": "premium",
/// "currentEntitlement": null, "hintLevel": "technique", "message": "..."}`.
pub fn access_denied(data: &Value, requested: Option<&str>) -> Option<AccessDenied> {
    let body = match data.get("error") {
        Some(inner @ Value::Object(_)) => inner,
        _ => data,
    };
    let code = body.get("code").and_then(Value::as_str)?;
    if !ACCESS_DENIED_CODES.contains(&code) {
        return None;
    }
    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
    Some(AccessDenied {
        code: code.to_string(),
        message: text("message").unwrap_or_default(),
        required_entitlement: text("requiredEntitlement").unwrap_or_else(|| "premium".to_string()),
        current_entitlement: text("currentEntitlement"),
        hint_level: text("hintLevel").or_else(|| requested.map(str::to_string)),
    })
}

/// Pull a human-readable message out of an error body: `error` or `message`
/// as a string, or either nested one level inside `error`.
fn error_message(data: &Value) -> Option<String> {
    match data {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => {
            for key in ["message", "error"] {
                match map.get(key) {
                    Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
                    Some(nested @ Value::Object(_)) => {
                        if let Some(msg) = error_message(nested) {
                            return Some(msg);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        _ => None,
    }
}

fn merge_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(existing) => existing.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}
