//! Synchronous request/response core for the hosted search API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Transports, fail-over and
//! background dispatch live in `search-client`; this crate stays
//! deterministic and testable.
//!
//! # Design
//! - `SearchClient` holds only credentials.
//! - `Operation` is a tagged union with one variant per remote call, so each
//!   call carries exactly the arguments it needs.
//! - Result payloads are `serde_json::Value`; the service owns their schema.

pub mod client;
pub mod error;
pub mod http;
pub mod operation;
pub mod types;

pub use client::{SearchClient, API_KEY_HEADER, APPLICATION_ID_HEADER};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Operation, OperationKind};
pub use types::{IndexQuery, LogType, Query, QueryStrategy};

/// Outcome of one remote call: the JSON payload or the error.
pub type CallOutcome = Result<serde_json::Value, ApiError>;
