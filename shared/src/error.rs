//! Error handling for the invoicing service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, AppError>;

/// A single field-level input problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reasons: Vec<FieldViolation>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        violations: Vec<FieldViolation>,
    },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store operation failed: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unexpected error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn validation_with(message: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self::Validation {
            message: message.into(),
            violations,
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Generic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "INPUT_VALIDATION_ERROR",
            AppError::NotFound { .. } => "NOT_FOUND_ERROR",
            AppError::Database(_) | AppError::Store { .. } => "DB_OPERATION_ERROR",
            AppError::Configuration { .. } => "CONFIGURATION_ERROR",
            AppError::Generic(_) => "UNCATEGORIZED_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations = Vec::new();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = match error.message {
                    Some(ref msg) => msg.to_string(),
                    None => match error.code.as_ref() {
                        "length" => "Invalid length".to_string(),
                        "range" => "Value out of range".to_string(),
                        "required" => "Field is required".to_string(),
                        _ => "Invalid value".to_string(),
                    },
                };
                violations.push(FieldViolation::new(camel_case(&field.to_string()), message));
            }
        }
        violations.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::validation_with("Please provide valid inputs.", violations)
    }
}

/// Request bodies are camelCase on the wire while validator reports struct field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Validation { .. } | AppError::NotFound { .. } => {
                tracing::warn!("API Error: {} - {}", self.error_code(), self);
            }
            _ => {
                tracing::error!("API Error: {} - {}", self.error_code(), self);
            }
        }

        let message = match &self {
            // Store details stay in the log.
            AppError::Database(_) | AppError::Store { .. } => "Database operation failed".to_string(),
            _ => self.to_string(),
        };
        let error = self.error_code().to_string();
        let reasons = match self {
            AppError::Validation { violations, .. } => violations,
            _ => Vec::new(),
        };

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message,
            error,
            reasons,
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("Invoice").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Generic(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::validation("bad").error_code(), "INPUT_VALIDATION_ERROR");
        assert_eq!(AppError::not_found("Invoice").error_code(), "NOT_FOUND_ERROR");
        assert_eq!(
            AppError::Database(sqlx::Error::PoolTimedOut).error_code(),
            "DB_OPERATION_ERROR"
        );
        assert_eq!(AppError::not_found("Invoice").to_string(), "Invoice not found");
    }

    #[test]
    fn test_validation_error_response() {
        let error = AppError::validation_with(
            "Please provide valid inputs.",
            vec![FieldViolation::new("amount", "Amount is required")],
        );

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("payment_mode"), "paymentMode");
        assert_eq!(camel_case("shop_id"), "shopId");
        assert_eq!(camel_case("amount"), "amount");
    }
}
