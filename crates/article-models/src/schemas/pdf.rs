//! PDF availability records
//!
//! Both records carry an availability flag that is a pure function of
//! payload presence. The flag is recomputed on every construction and any
//! value found in the input is ignored.

use axum::body::Bytes;
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use super::build_record;
use crate::errors::{ModelError, Result};
use crate::input::{Normalizer, RawRecord};
use crate::validators::{validate_doi, validate_path};

/// Where an article's PDF lives, if anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticlePdfRecord {
    id: String,
    file_path: Option<String>,
    is_pdf_available: bool,
}

impl ArticlePdfRecord {
    pub fn new(id: impl Into<String>, file_path: Option<String>) -> Result<Self> {
        let draft = PdfRecordDraft {
            id: Some(id.into()),
            file_path,
        };
        build_record("article_pdf_record", draft, Vec::new(), PdfRecordDraft::into_record)
    }

    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = PdfRecordDraft {
            id: reader.required_str("id"),
            file_path: reader.optional_str("file_path"),
        };
        // Type-checked only; the stored flag always follows file_path
        let _ = reader.optional_bool("is_pdf_available");
        build_record(
            "article_pdf_record",
            draft,
            reader.finish(),
            PdfRecordDraft::into_record,
        )
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_raw(&RawRecord::from_json(value)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn is_pdf_available(&self) -> bool {
        self.is_pdf_available
    }
}

impl TryFrom<&RawRecord> for ArticlePdfRecord {
    type Error = ModelError;

    fn try_from(raw: &RawRecord) -> Result<Self> {
        Self::from_raw(raw)
    }
}

#[derive(Debug, Validate)]
struct PdfRecordDraft {
    #[validate(
        length(min = 1, code = "missing", message = "field required"),
        custom(function = "validate_doi")
    )]
    id: Option<String>,

    #[validate(custom(function = "validate_path"))]
    file_path: Option<String>,
}

impl PdfRecordDraft {
    fn into_record(self) -> Option<ArticlePdfRecord> {
        let is_pdf_available = self.file_path.is_some();
        Some(ArticlePdfRecord {
            id: self.id?,
            file_path: self.file_path,
            is_pdf_available,
        })
    }
}

/// An article's PDF payload.
///
/// The payload is a shared [`Bytes`] handle; cloning the record never copies
/// the PDF. It is left out of serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticlePdfFile {
    id: String,
    #[serde(skip)]
    pdf_file: Option<Bytes>,
    is_available: bool,
}

impl ArticlePdfFile {
    pub fn new(id: impl Into<String>, pdf_file: Option<Bytes>) -> Result<Self> {
        let draft = PdfFileDraft {
            id: Some(id.into()),
            pdf_file,
        };
        build_record("article_pdf_file", draft, Vec::new(), PdfFileDraft::into_file)
    }

    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = PdfFileDraft {
            id: reader.required_str("id"),
            pdf_file: reader.optional_bytes("pdf_file"),
        };
        let _ = reader.optional_bool("is_available");
        build_record("article_pdf_file", draft, reader.finish(), PdfFileDraft::into_file)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pdf_file(&self) -> Option<&Bytes> {
        self.pdf_file.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }
}

impl TryFrom<&RawRecord> for ArticlePdfFile {
    type Error = ModelError;

    fn try_from(raw: &RawRecord) -> Result<Self> {
        Self::from_raw(raw)
    }
}

#[derive(Debug, Validate)]
struct PdfFileDraft {
    #[validate(
        length(min = 1, code = "missing", message = "field required"),
        custom(function = "validate_doi")
    )]
    id: Option<String>,

    pdf_file: Option<Bytes>,
}

impl PdfFileDraft {
    fn into_file(self) -> Option<ArticlePdfFile> {
        let is_available = self.pdf_file.is_some();
        Some(ArticlePdfFile {
            id: self.id?,
            pdf_file: self.pdf_file,
            is_available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCategory, FieldErrorKind};
    use crate::input::FieldValue;

    const DOI: &str = "10.1000/10/123456";

    #[test]
    fn test_null_path_is_unavailable() {
        let raw = RawRecord::new()
            .with("id", DOI)
            .with("filePath", FieldValue::Null);
        let record = ArticlePdfRecord::from_raw(&raw).unwrap();
        assert_eq!(record.file_path(), None);
        assert!(!record.is_pdf_available());
    }

    #[test]
    fn test_path_makes_record_available() {
        let record = ArticlePdfRecord::new(DOI, Some("path/to/file.pdf".into())).unwrap();
        assert!(record.is_pdf_available());
        assert_eq!(record.file_path(), Some("path/to/file.pdf"));
    }

    #[test]
    fn test_caller_flag_is_ignored() {
        let raw = RawRecord::new()
            .with("id", DOI)
            .with("isPdfAvailable", true);
        let record = ArticlePdfRecord::from_raw(&raw).unwrap();
        assert!(!record.is_pdf_available());

        let raw = RawRecord::new()
            .with("id", DOI)
            .with("file_path", "path/to/file.pdf")
            .with("is_pdf_available", false);
        assert!(ArticlePdfRecord::from_raw(&raw).unwrap().is_pdf_available());
    }

    #[test]
    fn test_non_bool_flag_is_invalid() {
        let raw = RawRecord::new()
            .with("id", DOI)
            .with("is_pdf_available", "not_a_bool");
        let err = ArticlePdfRecord::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidField);
        assert_eq!(err.field_errors()[0].field, "is_pdf_available");
    }

    #[test]
    fn test_unsafe_path_is_invalid() {
        let err = ArticlePdfRecord::new(DOI, Some("path/to/file>".into())).unwrap_err();
        assert_eq!(
            err.field_error("file_path").map(|e| e.kind),
            Some(FieldErrorKind::InvalidFormat)
        );
    }

    #[test]
    fn test_pdf_record_requires_doi() {
        let err = ArticlePdfRecord::new("invalid_doi", None).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "id");
    }

    #[test]
    fn test_pdf_file_availability_follows_payload() {
        let payload = Bytes::from_static(b"%PDF-1.7");
        let file = ArticlePdfFile::new(DOI, Some(payload.clone())).unwrap();
        assert!(file.is_available());
        assert_eq!(file.pdf_file(), Some(&payload));

        let raw = RawRecord::new().with("id", DOI).with("isAvailable", true);
        assert!(!ArticlePdfFile::from_raw(&raw).unwrap().is_available());
    }

    #[test]
    fn test_pdf_file_payload_must_be_binary() {
        let raw = RawRecord::new().with("id", DOI).with("pdf_file", "base64?");
        let err = ArticlePdfFile::from_raw(&raw).unwrap_err();
        assert_eq!(err.field_errors()[0].message, "expected binary payload, got string");
    }

    #[test]
    fn test_pdf_file_non_bool_flag_is_invalid() {
        let raw = RawRecord::new()
            .with("id", DOI)
            .with("pdf_file", Bytes::from_static(b"%PDF"))
            .with("is_available", "yes");
        let err = ArticlePdfFile::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidField);
        assert_eq!(err.field_errors()[0].field, "is_available");
        assert_eq!(err.field_errors()[0].message, "expected bool, got string");
    }

    #[test]
    fn test_non_ascii_path_is_accepted() {
        let record = ArticlePdfRecord::new(DOI, Some("/papers/Łódź_2024.pdf".into())).unwrap();
        assert!(record.is_pdf_available());
    }

    #[test]
    fn test_pdf_construction_is_idempotent() {
        let raw = RawRecord::new()
            .with("id", DOI)
            .with("file_path", "path/to/file.pdf")
            .with("is_pdf_available", false);
        assert_eq!(
            ArticlePdfRecord::from_raw(&raw).unwrap(),
            ArticlePdfRecord::try_from(&raw).unwrap()
        );

        let raw = RawRecord::new()
            .with("id", DOI)
            .with("pdf_file", Bytes::from_static(b"%PDF-1.7"));
        let first = ArticlePdfFile::from_raw(&raw).unwrap();
        let second = ArticlePdfFile::try_from(&raw).unwrap();
        assert_eq!(first, second);
        assert!(second.is_available());
    }

    #[test]
    fn test_pdf_file_skips_payload_when_serialized() {
        let file = ArticlePdfFile::new(DOI, Some(Bytes::from_static(b"%PDF"))).unwrap();
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json, serde_json::json!({"id": DOI, "is_available": true}));
    }
}
