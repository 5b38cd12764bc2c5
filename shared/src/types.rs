//! Common response types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard success envelope: `{ status, message, data? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Pagination as exposed on list endpoints (`limit`, `pageNumber`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub page_number: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const DEFAULT_PAGE_NUMBER: i64 = 1;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn new(limit: i64, page_number: i64) -> Self {
        Self { limit, page_number }
    }

    /// Rows to skip: `(limit * pageNumber) - limit`. `None` when out of range.
    pub fn offset(&self) -> Option<i64> {
        self.limit
            .checked_mul(self.page_number)?
            .checked_sub(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::DEFAULT_PAGE_NUMBER)
    }
}
