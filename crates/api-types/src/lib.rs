//! Data types for the procedure count API.
//!
//! These structs define the JSON bodies accepted and returned by the API
//! server. They live in a separate crate so that clients can depend on them
//! without pulling in the rest of the server implementation.

#![allow(missing_docs)]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of most recent procedure dates considered when none is requested.
pub const DEFAULT_LAST_N_DATES: i64 = 7;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Scalar count returned by both count endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

const fn default_last_n_dates() -> Option<i64> {
    Some(DEFAULT_LAST_N_DATES)
}

/// Request body of `POST /procedure_occurrence/person_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonCountRequest {
    /// Number of most recent distinct procedure dates to consider
    #[serde(default = "default_last_n_dates")]
    #[schema(default = 7, example = 7)]
    pub last_n_dates: Option<i64>,
}

impl Default for PersonCountRequest {
    fn default() -> Self {
        Self { last_n_dates: default_last_n_dates() }
    }
}

impl PersonCountRequest {
    /// Requested window, falling back to the default for `null`.
    pub fn last_n_dates(&self) -> i64 {
        self.last_n_dates.unwrap_or(DEFAULT_LAST_N_DATES)
    }
}

/// Problem-style error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error kind, e.g. `not-found`
    pub r#type: String,
    /// Short human readable summary
    pub title: String,
    /// HTTP status code
    pub status: u16,
    /// Description of this occurrence
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(
        r#type: impl Into<String>,
        title: impl Into<String>,
        status: StatusCode,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    /// 404 for a query that produced no row.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new("not-found", "Not Found", StatusCode::NOT_FOUND, detail)
    }

    /// 400 for a request the API refuses to forward.
    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new("invalid-params", "Bad Request", StatusCode::BAD_REQUEST, detail)
    }

    /// 500 for a failed query.
    pub fn database_error() -> Self {
        Self::new(
            "database-error",
            "Internal Server Error",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Query execution failed",
        )
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
