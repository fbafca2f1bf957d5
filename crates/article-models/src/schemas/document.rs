//! Document-style full article record

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use validator::Validate;

use super::author::{AuthorDraft, ImageDraft, TableDraft};
use super::build_record;
use super::{Author, ImageRef, TableRef};
use crate::errors::{ModelError, Result};
use crate::input::{Normalizer, RawRecord};
use crate::validators::validate_doi;

const SCHEMA: &str = "article_document";

/// Full text of an article with its structured metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleDocument {
    id: String,
    title: String,
    /// Authorship order is significant
    authors: Vec<Author>,
    #[serde(rename = "abstract")]
    abstract_text: String,
    keywords: BTreeSet<String>,
    markdown_full_text: String,
    images: Vec<ImageRef>,
    tables: Vec<TableRef>,
}

impl ArticleDocument {
    /// Validate a raw mapping into a document, reporting every failing field
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = ArticleDocumentDraft {
            id: reader.required_str("id"),
            title: reader.required_str("title"),
            authors: reader.records("authors", true, AuthorDraft::read),
            r#abstract: reader.required_str("abstract"),
            keywords: reader.string_set("keywords"),
            markdown_full_text: reader.required_str("markdown_full_text"),
            images: reader.records("images", false, ImageDraft::read),
            tables: reader.records("tables", false, TableDraft::read),
        };
        build_record(SCHEMA, draft, reader.finish(), ArticleDocumentDraft::into_record)
    }

    /// Validate a JSON object. Rejection only: JSON has no set type, so the
    /// keywords list always fails and this never returns `Ok`. Convert the
    /// keywords to a set in a [`RawRecord`] and call [`from_raw`](Self::from_raw)
    /// when a caller vouches for them.
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

    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn markdown_full_text(&self) -> &str {
        &self.markdown_full_text
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }
}

impl TryFrom<&RawRecord> for ArticleDocument {
    type Error = ModelError;

    fn try_from(raw: &RawRecord) -> Result<Self> {
        Self::from_raw(raw)
    }
}

#[derive(Debug, Validate)]
struct ArticleDocumentDraft {
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
    r#abstract: Option<String>,

    keywords: Option<BTreeSet<String>>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    markdown_full_text: Option<String>,

    #[validate(nested)]
    images: Option<Vec<ImageDraft>>,

    #[validate(nested)]
    tables: Option<Vec<TableDraft>>,
}

impl ArticleDocumentDraft {
    fn into_record(self) -> Option<ArticleDocument> {
        Some(ArticleDocument {
            id: self.id?,
            title: self.title?,
            authors: self
                .authors?
                .into_iter()
                .map(AuthorDraft::into_author)
                .collect::<Option<_>>()?,
            abstract_text: self.r#abstract?,
            keywords: self.keywords?,
            markdown_full_text: self.markdown_full_text?,
            images: self
                .images?
                .into_iter()
                .map(ImageDraft::into_image)
                .collect::<Option<_>>()?,
            tables: self
                .tables?
                .into_iter()
                .map(TableDraft::into_table)
                .collect::<Option<_>>()?,
        })
    }
}
