//! Async API client core for the sudoku puzzle service.
//!
//! # Overview
//! Turns façade calls into `HttpRequest` values, hands them to a pluggable
//! `Transport`, and maps the response envelope to typed results or a typed
//! `ApiError`. The crate never opens a socket and never stores cached data;
//! it produces cache keys and stale times for an external query cache.
//!
//! # Design
//! - `SudokuClient` holds only immutable configuration and its transport.
//! - Inputs are validated before any request is built (`validate`).
//! - Query strings are sorted by key with commas left literal (`query`).
//! - Header, token and body handling live in one place (`executor`).
//! - `cache` derives keys from the same query output the URL builder uses,
//!   so equal filters always give equal keys.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cache;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod executor;
pub mod http;
pub mod query;
pub mod types;
pub mod validate;

pub use cache::{Family, Mutation, QueryKey, ResourceClass};
pub use client::{SudokuClient, VALIDATE_TIMEOUT};
pub use config::ClientConfig;
pub use error::{AccessDenied, ApiError, ErrorKind, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use query::{QueryParams, ToQuery};
pub use types::*;
