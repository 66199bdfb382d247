//! In-memory transport shared by the integration test binaries.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use sudoku_core::{HttpRequest, HttpResponse, Transport, TransportError};

/// Records every request and replays queued responses in order. When the
/// queue runs dry it answers `200` with an empty object as `data`.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<HttpResponse>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose first answer is `status` with `payload` in the
    /// backend envelope: as `data` for 2xx, as `error` otherwise.
    pub fn replying(status: u16, payload: Value) -> Self {
        let transport = Self::new();
        transport.reply(status, payload);
        transport
    }

    pub fn reply(&self, status: u16, payload: Value) {
        let body = if (200..300).contains(&status) {
            envelope(payload)
        } else {
            failure(payload)
        };
        self.push(HttpResponse::json(status, body));
    }

    pub fn push(&self, response: HttpResponse) {
        self.replies.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or_else(|| HttpResponse::json(200, envelope(json!({})))))
    }
}

/// Fails every request at the transport level.
pub struct BrokenTransport;

#[async_trait]
impl Transport for BrokenTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err("connection refused".into())
    }
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data, "error": null })
}

pub fn failure(error: Value) -> Value {
    json!({ "success": false, "data": null, "error": error })
}

pub const PUZZLE: &str =
    "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
