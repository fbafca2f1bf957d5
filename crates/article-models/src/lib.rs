//! Article Models Library
//!
//! Validated data model shared by the article services including:
//! - Format validators for DOIs, page ranges and file paths
//! - Immutable article schemas built from untrusted raw mappings
//! - Error types with per-service namespaced codes
//! - Configuration management
//! - Structured logging and validation metrics
//!
//! ```
//! use article_models::{ArticlePdfRecord, RawRecord};
//!
//! let raw = RawRecord::new()
//!     .with("id", "10.1000/10/123456")
//!     .with("is_pdf_available", true);
//! let record = ArticlePdfRecord::from_raw(&raw).unwrap();
//! assert!(!record.is_pdf_available());
//! ```

pub mod config;
pub mod errors;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod schemas;
pub mod validators;

// Re-export commonly used types
pub use config::ModelsConfig;
pub use errors::{ApiError, ErrorCategory, ErrorCode, FieldError, FieldErrorKind, ModelError, Result, Service};
pub use input::{FieldValue, RawRecord};
pub use schemas::{
    ArticleDocument, ArticleMetadataRecord, ArticleMetadataRequest, ArticlePdfFile,
    ArticlePdfRecord, Author, ImageRef, ResponseEnvelope, ResponseStatus, TableRef,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
