//! Error types for the article models library
//!
//! Provides:
//! - A per-service namespaced error-code registry ([`registry`])
//! - [`ModelError`], the validation failure returned by every constructor
//! - [`ApiError`], the API-boundary variant carrying an HTTP status code
//! - Field-level error details so callers can render a full error report

mod registry;

pub use registry::{
    error_category, service_short_code, ErrorCategory, ErrorCode, ParseErrorCodeError, Service,
    UNKNOWN_SERVICE_CODE,
};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::metrics;
use crate::schemas::ResponseEnvelope;

/// Result type alias using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

/// Kind of a single field failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Required field absent, null or empty
    Missing,
    /// Field present but fails a pattern, range or type constraint
    InvalidFormat,
    /// Cross-field or collection rule broken
    InvariantViolation,
}

impl FieldErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FieldErrorKind::Missing => ErrorCategory::MissingField,
            FieldErrorKind::InvalidFormat => ErrorCategory::InvalidField,
            FieldErrorKind::InvariantViolation => ErrorCategory::InvariantViolation,
        }
    }
}

/// A single offending field, addressed by path (`authors[0].surname`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Missing,
            message: "field required".to_string(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::InvalidFormat,
            message: message.into(),
        }
    }

    pub fn invariant(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::InvariantViolation,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of looking a requested code up in a service namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeResolution {
    Registered(ErrorCode),
    Unregistered { fallback: ErrorCode, requested: String },
}

/// Resolve a requested code against `service`'s own namespace.
///
/// Codes from another namespace, unknown prefixes and unknown suffixes all
/// resolve to the service's `UNDEFINED_ERROR` code.
pub fn resolve_code(service: Service, code: &str) -> CodeResolution {
    match code.parse::<ErrorCode>() {
        Ok(parsed) if parsed.service() == service => CodeResolution::Registered(parsed),
        _ => CodeResolution::Unregistered {
            fallback: service.code(ErrorCategory::UndefinedError),
            requested: code.to_string(),
        },
    }
}

/// Validation failure carrying a stable code, a message and diagnostics
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{error_code}: {error_message}\n{additional_info}")]
pub struct ModelError {
    error_code: ErrorCode,
    error_message: &'static str,
    additional_info: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    field_errors: Vec<FieldError>,
    /// Set only when the requested code was unregistered
    #[serde(skip)]
    fallback: bool,
}

impl ModelError {
    /// Build an error from a code string requested by `service`.
    ///
    /// An unregistered code never fails: it produces `<prefix>-0` with the
    /// requested code preserved in `additional_info`.
    pub fn new(service: Service, code: &str, additional_info: impl Into<String>) -> Self {
        match resolve_code(service, code) {
            CodeResolution::Registered(code) => Self::from_code(code, additional_info),
            CodeResolution::Unregistered { fallback, requested } => {
                tracing::error!(
                    service = service.name(),
                    requested_code = %requested,
                    "Unregistered error code requested"
                );
                metrics::record_undefined_error(service);
                Self {
                    fallback: true,
                    ..Self::from_code(fallback, format!("Unknown error_code {}.", requested))
                }
            }
        }
    }

    /// Build an error from an already-registered code
    pub fn from_code(code: ErrorCode, additional_info: impl Into<String>) -> Self {
        Self {
            error_code: code,
            error_message: code.category().as_str(),
            additional_info: additional_info.into(),
            field_errors: Vec::new(),
            fallback: false,
        }
    }

    /// Aggregate field failures into one library error.
    ///
    /// The code is the category shared by every failure, or
    /// `VALIDATION_ERROR` when the failures are of mixed kinds.
    pub fn from_field_errors(field_errors: Vec<FieldError>) -> Self {
        let category = match field_errors.split_first() {
            Some((first, rest)) if rest.iter().all(|e| e.kind == first.kind) => {
                first.kind.category()
            }
            _ => ErrorCategory::ValidationError,
        };

        let additional_info = field_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            field_errors,
            ..Self::from_code(
                Service::ArticleModelsLibrary.code(category),
                additional_info,
            )
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn category(&self) -> ErrorCategory {
        self.error_code.category()
    }

    pub fn error_message(&self) -> &str {
        self.error_message
    }

    pub fn additional_info(&self) -> &str {
        &self.additional_info
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// First failure reported for `field`, if any
    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.field_errors.iter().find(|e| e.field == field)
    }

    /// True for any `UNDEFINED_ERROR` code, requested or substituted
    pub fn is_undefined(&self) -> bool {
        self.category() == ErrorCategory::UndefinedError
    }

    /// True when the requested code was unregistered and `<prefix>-0` was substituted
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// API-boundary error: a [`ModelError`] plus an HTTP status code
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error} (HTTP {})", .status.as_u16())]
pub struct ApiError {
    error: ModelError,
    status: StatusCode,
}

impl ApiError {
    /// Build with the default 400 status (500 if the code is unregistered)
    pub fn new(service: Service, code: &str, additional_info: impl Into<String>) -> Self {
        Self::with_status(service, code, additional_info, StatusCode::BAD_REQUEST)
    }

    /// Build with an explicit status; the registry fallback always forces 500
    pub fn with_status(
        service: Service,
        code: &str,
        additional_info: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        let error = ModelError::new(service, code, additional_info);
        let status = if error.is_fallback() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            status
        };
        Self { error, status }
    }

    pub fn error(&self) -> &ModelError {
        &self.error
    }

    pub fn into_inner(self) -> ModelError {
        self.error
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }
}

impl From<ModelError> for ApiError {
    fn from(error: ModelError) -> Self {
        let status = if error.is_fallback() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        };
        Self { error, status }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let code = self.error.error_code();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %self.error,
                code = %code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %self.error,
                code = %code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ResponseEnvelope::from_error(&self.error);

        (status, Json(body)).into_response()
    }
}
