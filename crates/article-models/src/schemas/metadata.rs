//! Article metadata at its two boundaries
//!
//! [`ArticleMetadataRecord`] is the relational shape, with authors and
//! keywords flattened to comma-delimited strings. [`ArticleMetadataRequest`]
//! is the API shape with structured authors and a keyword set.
//! [`ArticleMetadataRequest::to_record`] converts one into the other.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use validator::Validate;

use super::author::AuthorDraft;
use super::build_record;
use super::Author;
use crate::errors::{ModelError, Result};
use crate::input::{Normalizer, RawRecord};
use crate::validators::{validate_doi, validate_page_range};

/// Separator used when flattening lists into relational columns
pub const LIST_SEPARATOR: &str = ", ";

/// Relational article metadata row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleMetadataRecord {
    id: String,
    title: String,
    /// Comma-separated list of authors
    authors: String,
    journal: String,
    year: i64,
    volume: i64,
    issue: Option<i64>,
    /// Page range, `23-34`
    pages: String,
    /// Comma-separated list of keywords
    keywords: String,
}

impl ArticleMetadataRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = MetadataRecordDraft {
            id: reader.required_str("id"),
            title: reader.required_str("title"),
            authors: reader.required_str("authors"),
            journal: reader.required_str("journal"),
            year: reader.required_int("year"),
            volume: reader.required_int("volume"),
            issue: reader.optional_int("issue"),
            pages: reader.required_str("pages"),
            keywords: reader.required_str("keywords"),
        };
        build_record(
            "article_metadata_record",
            draft,
            reader.finish(),
            MetadataRecordDraft::into_record,
        )
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_raw(&RawRecord::from_json(value)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &str {
        &self.authors
    }

    pub fn journal(&self) -> &str {
        &self.journal
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    pub fn issue(&self) -> Option<i64> {
        self.issue
    }

    pub fn pages(&self) -> &str {
        &self.pages
    }

    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    /// Returns the author names as a vector
    pub fn author_list(&self) -> Vec<&str> {
        split_list(&self.authors)
    }

    /// Returns the keywords as a vector
    pub fn keyword_list(&self) -> Vec<&str> {
        split_list(&self.keywords)
    }

    /// First and last page of the range
    pub fn page_bounds(&self) -> Option<(u32, u32)> {
        let (start, end) = self.pages.split_once('-')?;
        Some((start.parse().ok()?, end.parse().ok()?))
    }
}

impl TryFrom<&RawRecord> for ArticleMetadataRecord {
    type Error = ModelError;

    fn try_from(raw: &RawRecord) -> Result<Self> {
        Self::from_raw(raw)
    }
}

fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Validate)]
struct MetadataRecordDraft {
    #[validate(
        length(min = 1, code = "missing", message = "field required"),
        custom(function = "validate_doi")
    )]
    id: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    title: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    authors: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    journal: Option<String>,

    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    year: Option<i64>,

    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    volume: Option<i64>,

    issue: Option<i64>,

    #[validate(
        length(min = 1, code = "missing", message = "field required"),
        custom(function = "validate_page_range")
    )]
    pages: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    keywords: Option<String>,
}

impl MetadataRecordDraft {
    fn into_record(self) -> Option<ArticleMetadataRecord> {
        Some(ArticleMetadataRecord {
            id: self.id?,
            title: self.title?,
            authors: self.authors?,
            journal: self.journal?,
            year: self.year?,
            volume: self.volume?,
            issue: self.issue,
            pages: self.pages?,
            keywords: self.keywords?,
        })
    }
}

/// Article metadata as submitted through the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleMetadataRequest {
    id: String,
    title: String,
    authors: Vec<Author>,
    journal: String,
    year: i64,
    volume: i64,
    issue: Option<i64>,
    pages: String,
    keywords: BTreeSet<String>,
}

impl ArticleMetadataRequest {
    /// Validate a raw mapping; author mappings are promoted to [`Author`] first
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = MetadataRequestDraft {
            id: reader.required_str("id"),
            title: reader.required_str("title"),
            authors: reader.records("authors", true, AuthorDraft::read),
            journal: reader.required_str("journal"),
            year: reader.required_int("year"),
            volume: reader.required_int("volume"),
            issue: reader.optional_int("issue"),
            pages: reader.required_str("pages"),
            keywords: reader.string_set("keywords"),
        };
        build_record(
            "article_metadata_request",
            draft,
            reader.finish(),
            MetadataRequestDraft::into_request,
        )
    }

    /// Validate a JSON object. Rejection only: JSON arrays are lists, and
    /// `keywords` must be a set, so this never returns `Ok`. Build a
    /// [`RawRecord`] with a [`FieldValue::Set`](crate::input::FieldValue::Set)
    /// and call [`from_raw`](Self::from_raw) to accept JSON-sourced keywords.
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_raw(&RawRecord::from_json(value)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn journal(&self) -> &str {
        &self.journal
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    pub fn issue(&self) -> Option<i64> {
        self.issue
    }

    pub fn pages(&self) -> &str {
        &self.pages
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    /// Flatten into the relational shape.
    ///
    /// Authors become `"Name Surname, ..."` in authorship order; keywords are
    /// joined in sorted order. A request with an empty keyword set has no
    /// relational form and is rejected.
    pub fn to_record(&self) -> Result<ArticleMetadataRecord> {
        let draft = MetadataRecordDraft {
            id: Some(self.id.clone()),
            title: Some(self.title.clone()),
            authors: Some(
                self.authors
                    .iter()
                    .map(Author::full_name)
                    .collect::<Vec<_>>()
                    .join(LIST_SEPARATOR),
            ),
            journal: Some(self.journal.clone()),
            year: Some(self.year),
            volume: Some(self.volume),
            issue: self.issue,
            pages: Some(self.pages.clone()),
            keywords: Some(
                self.keywords
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(LIST_SEPARATOR),
            ),
        };
        build_record(
            "article_metadata_record",
            draft,
            Vec::new(),
            MetadataRecordDraft::into_record,
        )
    }
}

impl TryFrom<&RawRecord> for ArticleMetadataRequest {
    type Error = ModelError;

    fn try_from(raw: &RawRecord) -> Result<Self> {
        Self::from_raw(raw)
    }
}

#[derive(Debug, Validate)]
struct MetadataRequestDraft {
    #[validate(
        length(min = 1, code = "missing", message = "field required"),
        custom(function = "validate_doi")
    )]
    id: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    title: Option<String>,

    #[validate(
        length(min = 1, code = "invariant", message = "at least one author required"),
        nested
    )]
    authors: Option<Vec<AuthorDraft>>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    journal: Option<String>,

    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    year: Option<i64>,

    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    volume: Option<i64>,

    issue: Option<i64>,

    #[validate(
        length(min = 1, code = "missing", message = "field required"),
        custom(function = "validate_page_range")
    )]
    pages: Option<String>,

    keywords: Option<BTreeSet<String>>,
}

impl MetadataRequestDraft {
    fn into_request(self) -> Option<ArticleMetadataRequest> {
        Some(ArticleMetadataRequest {
            id: self.id?,
            title: self.title?,
            authors: self
                .authors?
                .into_iter()
                .map(AuthorDraft::into_author)
                .collect::<Option<_>>()?,
            journal: self.journal?,
            year: self.year?,
            volume: self.volume?,
            issue: self.issue,
            pages: self.pages?,
            keywords: self.keywords?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCategory, FieldErrorKind};
    use crate::input::FieldValue;

    fn valid_record() -> RawRecord {
        RawRecord::new()
            .with("id", "10.1000/123456")
            .with("title", "Test Article")
            .with("authors", "John Doe, Jane Smith")
            .with("journal", "Test Journal")
            .with("year", 2024)
            .with("volume", 1)
            .with("pages", "10-20")
            .with("keywords", "science, research")
    }

    fn valid_request() -> RawRecord {
        RawRecord::new()
            .with("id", "10.1000/10/123456")
            .with("title", "Example Article Title")
            .with(
                "authors",
                vec![FieldValue::from(
                    RawRecord::new().with("name", "John").with("surname", "Smith"),
                )],
            )
            .with("keywords", FieldValue::set(["keyword1", "keyword2"]))
            .with("journal", "Example Journal")
            .with("year", 2022)
            .with("volume", 10)
            .with("issue", 2)
            .with("pages", "23-34")
    }

    #[test]
    fn test_valid_record() {
        let record = ArticleMetadataRecord::from_raw(&valid_record()).unwrap();
        assert_eq!(record.id(), "10.1000/123456");
        assert_eq!(record.year(), 2024);
        assert_eq!(record.issue(), None);
        assert_eq!(record.author_list(), vec!["John Doe", "Jane Smith"]);
        assert_eq!(record.keyword_list(), vec!["science", "research"]);
        assert_eq!(record.page_bounds(), Some((10, 20)));
    }

    #[test]
    fn test_record_rejects_non_doi_prefix() {
        let raw = valid_record().with("id", "11.1000/123456");
        let err = ArticleMetadataRecord::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidField);
    }

    #[test]
    fn test_record_missing_id() {
        let mut raw = RawRecord::new();
        for (key, value) in valid_record().iter().filter(|(k, _)| *k != "id") {
            raw.insert(key, value.clone());
        }
        let err = ArticleMetadataRecord::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MissingField);
        assert_eq!(err.field_errors()[0].field, "id");
    }

    #[test]
    fn test_record_negative_volume() {
        let raw = valid_record().with("volume", -1);
        let err = ArticleMetadataRecord::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidField);
        assert_eq!(err.field_errors()[0].field, "volume");
    }

    #[test]
    fn test_record_bad_page_range() {
        let raw = valid_record().with("pages", "10 to 20");
        let err = ArticleMetadataRecord::from_raw(&raw).unwrap_err();
        assert_eq!(err.field_error("pages").map(|e| e.kind), Some(FieldErrorKind::InvalidFormat));
    }

    #[test]
    fn test_record_year_must_be_integer() {
        let raw = valid_record().with("year", "2024");
        let err = ArticleMetadataRecord::from_raw(&raw).unwrap_err();
        assert_eq!(err.field_errors()[0].message, "expected int, got string");
    }

    #[test]
    fn test_valid_request_promotes_authors() {
        let request = ArticleMetadataRequest::from_raw(&valid_request()).unwrap();
        assert_eq!(request.authors(), &[Author::new("John", "Smith").unwrap()]);
        assert_eq!(request.issue(), Some(2));
        assert_eq!(request.keywords().len(), 2);
    }

    #[test]
    fn test_request_accepts_typed_authors() {
        let typed = Author::new("Jane", "Doe").unwrap();
        let raw = valid_request().with("authors", vec![typed.clone()]);
        let request = ArticleMetadataRequest::from_raw(&raw).unwrap();
        assert_eq!(request.authors(), &[typed]);
    }

    #[test]
    fn test_request_empty_id() {
        let raw = valid_request().with("id", "");
        let err = ArticleMetadataRequest::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MissingField);
    }

    #[test]
    fn test_request_empty_title() {
        let raw = valid_request().with("title", "");
        assert!(ArticleMetadataRequest::from_raw(&raw).is_err());
    }

    #[test]
    fn test_request_empty_pages() {
        let raw = valid_request().with("pages", "");
        let err = ArticleMetadataRequest::from_raw(&raw).unwrap_err();
        assert_eq!(err.field_error("pages").map(|e| e.kind), Some(FieldErrorKind::Missing));
    }

    #[test]
    fn test_request_empty_authors() {
        let raw = valid_request().with("authors", Vec::<FieldValue>::new());
        let err = ArticleMetadataRequest::from_raw(&raw).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvariantViolation);
    }

    #[test]
    fn test_request_keywords_list_is_rejected() {
        let raw = valid_request().with("keywords", vec!["keyword1", "keyword2"]);
        let err = ArticleMetadataRequest::from_raw(&raw).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "keywords");
    }

    #[test]
    fn test_request_flattens_to_record() {
        let raw = valid_request().with(
            "authors",
            vec![
                Author::new("John", "Smith").unwrap(),
                Author::new("Jane", "Doe").unwrap(),
            ],
        );
        let record = ArticleMetadataRequest::from_raw(&raw)
            .unwrap()
            .to_record()
            .unwrap();
        assert_eq!(record.authors(), "John Smith, Jane Doe");
        assert_eq!(record.keywords(), "keyword1, keyword2");
        assert_eq!(record.pages(), "23-34");
        assert_eq!(record.issue(), Some(2));
    }

    #[test]
    fn test_request_from_json_rejects_keyword_array() {
        let err = ArticleMetadataRequest::from_json(&serde_json::json!({
            "id": "10.1000/10/123456",
            "title": "Example Article Title",
            "authors": [{"name": "John", "surname": "Smith"}],
            "keywords": ["keyword1"],
            "journal": "Example Journal",
            "year": 2022,
            "volume": 10,
            "pages": "23-34"
        }))
        .unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, "keywords");
    }

    #[test]
    fn test_metadata_construction_is_idempotent() {
        let raw = valid_record().with("issue", 3);
        assert_eq!(
            ArticleMetadataRecord::from_raw(&raw).unwrap(),
            ArticleMetadataRecord::try_from(&raw).unwrap()
        );

        let raw = valid_request();
        assert_eq!(
            ArticleMetadataRequest::from_raw(&raw).unwrap(),
            ArticleMetadataRequest::try_from(&raw).unwrap()
        );
    }

    #[test]
    fn test_request_without_keywords_has_no_record_form() {
        let raw = valid_request().with("keywords", FieldValue::Set(BTreeSet::new()));
        let request = ArticleMetadataRequest::from_raw(&raw).unwrap();
        let err = request.to_record().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "keywords");
    }
}
