//! Uniform API response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

use super::build_record;
use crate::errors::{ErrorCode, FieldError, ModelError, Result};
use crate::input::{Normalizer, RawRecord};

/// Outcome reported by a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "SUCCESS",
            ResponseStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid response status {0:?}, expected SUCCESS or ERROR")]
pub struct ParseStatusError(String);

impl FromStr for ResponseStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(ResponseStatus::Success),
            "ERROR" => Ok(ResponseStatus::Error),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Body returned by every service endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    status: ResponseStatus,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "errorCode")]
    error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            error_code: None,
            data,
        }
    }

    pub fn error(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            error_code: Some(code.to_string()),
            data: None,
        }
    }

    /// Error body for a failed validation; field errors travel in `data`
    pub fn from_error(error: &ModelError) -> Self {
        let message = if error.additional_info().is_empty() {
            error.error_message()
        } else {
            error.additional_info()
        };

        let data = if error.field_errors().is_empty() {
            None
        } else {
            serde_json::to_value(error.field_errors()).ok()
        };

        Self {
            data,
            ..Self::error(message, error.error_code())
        }
    }

    /// Validate an envelope received from another service
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let status = reader
            .required_str("status")
            .and_then(|s| match s.parse::<ResponseStatus>() {
                Ok(status) => Some(status),
                Err(e) => {
                    reader.push(FieldError::invalid("status", e.to_string()));
                    None
                }
            });
        let draft = ResponseDraft {
            status,
            message: reader.required_str("message"),
            error_code: reader.optional_str("error_code"),
            data: reader
                .optional_value("data")
                .map(|value| value.to_json()),
        };
        build_record("response_envelope", draft, reader.finish(), ResponseDraft::into_envelope)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_raw(&RawRecord::from_json(value)?)
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl TryFrom<&RawRecord> for ResponseEnvelope {
    type Error = ModelError;

    fn try_from(raw: &RawRecord) -> Result<Self> {
        Self::from_raw(raw)
    }
}

#[derive(Debug, Validate)]
struct ResponseDraft {
    status: Option<ResponseStatus>,
    message: Option<String>,
    error_code: Option<String>,
    data: Option<Value>,
}

impl ResponseDraft {
    fn into_envelope(self) -> Option<ResponseEnvelope> {
        Some(ResponseEnvelope {
            status: self.status?,
            message: self.message?,
            error_code: self.error_code,
            data: self.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCategory, FieldErrorKind, Service};
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let raw = RawRecord::new()
            .with("status", "SUCCESS")
            .with("message", "Request processed successfully.")
            .with("data", RawRecord::new().with("id", "10.1000/10/123456"));
        let envelope = ResponseEnvelope::from_raw(&raw).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.error_code(), None);
        assert_eq!(envelope.data(), Some(&json!({"id": "10.1000/10/123456"})));
    }

    #[test]
    fn test_error_envelope_from_json() {
        let envelope = ResponseEnvelope::from_json(&json!({
            "status": "ERROR",
            "message": "An error occurred.",
            "errorCode": "AML-1",
            "data": null
        }))
        .unwrap();
        assert_eq!(envelope.status(), ResponseStatus::Error);
        assert_eq!(envelope.error_code(), Some("AML-1"));
        assert_eq!(envelope.data(), None);
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let raw = RawRecord::new()
            .with("status", "INVALID_STATUS")
            .with("message", "Invalid status test.");
        let err = ResponseEnvelope::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidField);
        assert_eq!(err.field_errors()[0].field, "status");
    }

    #[test]
    fn test_missing_status_is_rejected() {
        let raw = RawRecord::new().with("message", "Missing status.");
        let err = ResponseEnvelope::from_raw(&raw).unwrap_err();
        assert_eq!(
            err.field_error("status").map(|e| e.kind),
            Some(FieldErrorKind::Missing)
        );
    }

    #[test]
    fn test_from_error_carries_field_errors() {
        let model = ModelError::from_field_errors(vec![FieldError::missing("title")]);
        let envelope = ResponseEnvelope::from_error(&model);
        assert_eq!(envelope.status(), ResponseStatus::Error);
        assert_eq!(envelope.error_code(), Some("AML-2"));
        assert_eq!(envelope.message(), "title: field required");
        assert_eq!(
            envelope.data(),
            Some(&json!([{"field": "title", "kind": "missing", "message": "field required"}]))
        );
    }

    #[test]
    fn test_from_error_without_info_uses_category() {
        let code = Service::ArticleSearchService.code(ErrorCategory::ValidationError);
        let envelope = ResponseEnvelope::from_error(&ModelError::from_code(code, ""));
        assert_eq!(envelope.message(), "VALIDATION_ERROR");
        assert_eq!(envelope.data(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let envelope = ResponseEnvelope::success("ok", None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "SUCCESS", "message": "ok"})
        );
    }
}
