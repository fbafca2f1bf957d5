//! Service and error-code registry
//!
//! Every deployed service owns a short code used as the prefix of its error
//! codes (`AML-1`, `DMS-2`, ...). All namespaces share the same category
//! table, so a code seen in isolation identifies both its origin service and
//! its category. Both tables are constants and are never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sentinel returned for service names that are not registered
pub const UNKNOWN_SERVICE_CODE: &str = "UNKNOWN";

/// Services that own an error-code namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    ArticleModelsLibrary,
    DatabaseManagementService,
    ArticleSearchService,
    ArticleDownloadService,
    ArticlePdfManagementService,
    ArticleSummariseService,
    ArticleAnalyserApi,
}

impl Service {
    /// All registered services
    pub const ALL: [Service; 7] = [
        Service::ArticleModelsLibrary,
        Service::DatabaseManagementService,
        Service::ArticleSearchService,
        Service::ArticleDownloadService,
        Service::ArticlePdfManagementService,
        Service::ArticleSummariseService,
        Service::ArticleAnalyserApi,
    ];

    /// Registered service name
    pub fn name(&self) -> &'static str {
        match self {
            Service::ArticleModelsLibrary => "article_models_library",
            Service::DatabaseManagementService => "database_management_service",
            Service::ArticleSearchService => "article_search_service",
            Service::ArticleDownloadService => "article_download_service",
            Service::ArticlePdfManagementService => "article_pdf_management_service",
            Service::ArticleSummariseService => "article_summarise_service",
            Service::ArticleAnalyserApi => "article_analyser_api",
        }
    }

    /// Short code used as the error-code prefix
    pub fn short_code(&self) -> &'static str {
        match self {
            Service::ArticleModelsLibrary => "AML",
            Service::DatabaseManagementService => "DMS",
            Service::ArticleSearchService => "ASS",
            Service::ArticleDownloadService => "ADS",
            Service::ArticlePdfManagementService => "APMS",
            Service::ArticleSummariseService => "ASumS",
            Service::ArticleAnalyserApi => "AAA",
        }
    }

    /// Look up a service by its registered name.
    ///
    /// Kebab-case spellings (`article-search-service`) are accepted as well.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().replace('-', "_");
        Self::ALL.into_iter().find(|s| s.name() == normalized)
    }

    /// Look up a service by its short code (case-sensitive, `ASS` vs `ASumS`)
    pub fn from_short_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.short_code() == code)
    }

    /// Error code for a category inside this service's namespace
    pub fn code(&self, category: ErrorCategory) -> ErrorCode {
        ErrorCode::new(*self, category)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Short code for a service name, or [`UNKNOWN_SERVICE_CODE`] when unregistered
pub fn service_short_code(name: &str) -> &'static str {
    Service::from_name(name)
        .map(|s| s.short_code())
        .unwrap_or(UNKNOWN_SERVICE_CODE)
}

/// Error categories shared by every service namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    UndefinedError,
    InvalidField,
    MissingField,
    ValidationError,
    InvariantViolation,
}

impl ErrorCategory {
    /// All categories, ordered by numeric suffix
    pub const ALL: [ErrorCategory; 5] = [
        ErrorCategory::UndefinedError,
        ErrorCategory::InvalidField,
        ErrorCategory::MissingField,
        ErrorCategory::ValidationError,
        ErrorCategory::InvariantViolation,
    ];

    /// Numeric suffix of the category inside a namespace
    pub fn suffix(&self) -> u16 {
        match self {
            ErrorCategory::UndefinedError => 0,
            ErrorCategory::InvalidField => 1,
            ErrorCategory::MissingField => 2,
            ErrorCategory::ValidationError => 3,
            ErrorCategory::InvariantViolation => 4,
        }
    }

    /// Category for a numeric suffix
    pub fn from_suffix(suffix: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.suffix() == suffix)
    }

    /// Human-readable category name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::UndefinedError => "UNDEFINED_ERROR",
            ErrorCategory::InvalidField => "INVALID_FIELD",
            ErrorCategory::MissingField => "MISSING_FIELD",
            ErrorCategory::ValidationError => "VALIDATION_ERROR",
            ErrorCategory::InvariantViolation => "INVARIANT_VIOLATION",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to parse an error code string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorCodeError {
    #[error("Malformed error code: {0}")]
    Malformed(String),

    #[error("Unknown service prefix in error code: {0}")]
    UnknownService(String),

    #[error("Unknown category suffix in error code: {0}")]
    UnknownCategory(String),
}

/// A registered error code, `<service prefix>-<category suffix>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    service: Service,
    category: ErrorCategory,
}

impl ErrorCode {
    pub fn new(service: Service, category: ErrorCategory) -> Self {
        Self { service, category }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.service.short_code(), self.category.suffix())
    }
}

impl FromStr for ErrorCode {
    type Err = ParseErrorCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, suffix) = s
            .split_once('-')
            .ok_or_else(|| ParseErrorCodeError::Malformed(s.to_string()))?;

        let suffix: u16 = suffix
            .parse()
            .map_err(|_| ParseErrorCodeError::Malformed(s.to_string()))?;

        let service = Service::from_short_code(prefix)
            .ok_or_else(|| ParseErrorCodeError::UnknownService(s.to_string()))?;

        let category = ErrorCategory::from_suffix(suffix)
            .ok_or_else(|| ParseErrorCodeError::UnknownCategory(s.to_string()))?;

        Ok(Self { service, category })
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Category of any registered code, across all service namespaces.
///
/// Returns `None` for an unregistered code. This is a lookup only; the
/// `UNDEFINED_ERROR` fallback happens when an error is built with
/// [`ModelError::new`](crate::errors::ModelError::new).
pub fn error_category(code: &str) -> Option<ErrorCategory> {
    code.parse::<ErrorCode>().ok().map(|c| c.category())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_short_codes() {
        assert_eq!(service_short_code("article_models_library"), "AML");
        assert_eq!(service_short_code("article_summarise_service"), "ASumS");
        assert_eq!(service_short_code("article-search-service"), "ASS");
        assert_eq!(service_short_code("billing_service"), UNKNOWN_SERVICE_CODE);
    }

    #[test]
    fn test_short_codes_are_unique() {
        for a in Service::ALL {
            for b in Service::ALL {
                if a != b {
                    assert_ne!(a.short_code(), b.short_code());
                }
            }
        }
    }

    #[test]
    fn test_error_code_round_trip_display() {
        let code = Service::ArticlePdfManagementService.code(ErrorCategory::MissingField);
        assert_eq!(code.to_string(), "APMS-2");
        assert_eq!("APMS-2".parse::<ErrorCode>().unwrap(), code);
    }

    #[test]
    fn test_error_category_lookup() {
        assert_eq!(error_category("AML-1"), Some(ErrorCategory::InvalidField));
        assert_eq!(error_category("DMS-2"), Some(ErrorCategory::MissingField));
        assert_eq!(error_category("AML-0"), Some(ErrorCategory::UndefinedError));
        assert_eq!(error_category("ZZZ-99"), None);
        assert_eq!(error_category("AML-99"), None);
        assert_eq!(error_category("AML"), None);
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert_eq!(
            "asums-1".parse::<ErrorCode>(),
            Err(ParseErrorCodeError::UnknownService("asums-1".into()))
        );
        assert!("ASumS-1".parse::<ErrorCode>().is_ok());
    }

    #[test]
    fn test_category_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCategory::InvariantViolation).unwrap();
        assert_eq!(json, "\"INVARIANT_VIOLATION\"");
    }
}
