//! Validated article schemas
//!
//! Every record is built the same way:
//! 1. a [`Normalizer`](crate::input) reads the raw mapping into a draft,
//!    recording missing fields and wrong types
//! 2. the draft's `validator` rules check lengths, ranges and formats
//! 3. the draft becomes the immutable record, or every failure is returned
//!    in a single [`ModelError`]

mod author;
mod document;
mod metadata;
mod pdf;
mod response;

pub use author::{Author, ImageRef, TableRef};
pub use document::ArticleDocument;
pub use metadata::{ArticleMetadataRecord, ArticleMetadataRequest};
pub use pdf::{ArticlePdfFile, ArticlePdfRecord};
pub use response::{ResponseEnvelope, ResponseStatus};

use validator::Validate;

use crate::errors::{FieldError, ModelError, Result};
use crate::input::field_errors_from;
use crate::metrics;

/// Run the constraint phase on `draft` and turn it into a record.
///
/// `build` only returns `None` when a field failed the first phase, in which
/// case `errors` already explains why.
pub(crate) fn build_record<D, T, F>(
    schema: &'static str,
    draft: D,
    mut errors: Vec<FieldError>,
    build: F,
) -> Result<T>
where
    D: Validate,
    F: FnOnce(D) -> Option<T>,
{
    if let Err(failures) = draft.validate() {
        errors.extend(field_errors_from(&failures, ""));
    }

    if errors.is_empty() {
        if let Some(record) = build(draft) {
            metrics::record_validation(schema, true);
            tracing::debug!(schema, "Record accepted");
            return Ok(record);
        }
        errors.push(FieldError::invalid(schema, "incomplete record"));
    }

    metrics::record_validation(schema, false);
    tracing::warn!(schema, error_count = errors.len(), "Record rejected");
    Err(ModelError::from_field_errors(errors))
}
