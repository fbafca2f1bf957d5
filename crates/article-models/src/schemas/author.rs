//! Value objects: authors and figure/table references

use serde::Serialize;
use validator::Validate;

use super::build_record;
use crate::errors::Result;
use crate::input::{FieldValue, Normalizer, RawRecord};

/// An article author, compared by value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Author {
    name: String,
    surname: String,
}

impl Author {
    /// Create an author; both parts must be non-empty
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Result<Self> {
        let draft = AuthorDraft {
            name: Some(name.into()),
            surname: Some(surname.into()),
        };
        build_record("author", draft, Vec::new(), AuthorDraft::into_author)
    }

    /// Create an author from a raw `{name, surname}` mapping
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = AuthorDraft::read(&mut reader);
        build_record("author", draft, reader.finish(), AuthorDraft::into_author)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// "Name Surname"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Typed authors can be placed back into raw input unchanged
impl From<Author> for FieldValue {
    fn from(author: Author) -> Self {
        FieldValue::Map(
            RawRecord::new()
                .with("name", author.name)
                .with("surname", author.surname),
        )
    }
}

#[derive(Debug, Default, Serialize, Validate)]
pub(crate) struct AuthorDraft {
    #[validate(length(min = 1, code = "missing", message = "field required"))]
    name: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    surname: Option<String>,
}

impl AuthorDraft {
    pub(crate) fn read(reader: &mut Normalizer<'_>) -> Self {
        Self {
            name: reader.required_str("name"),
            surname: reader.required_str("surname"),
        }
    }

    pub(crate) fn into_author(self) -> Option<Author> {
        Some(Author {
            name: self.name?,
            surname: self.surname?,
        })
    }
}

/// A numbered image in the article (`fig.1.3`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageRef {
    image_number: String,
    file_path: String,
}

impl ImageRef {
    pub fn new(image_number: impl Into<String>, file_path: impl Into<String>) -> Result<Self> {
        let draft = ImageDraft {
            image_number: Some(image_number.into()),
            file_path: Some(file_path.into()),
        };
        build_record("image", draft, Vec::new(), ImageDraft::into_image)
    }

    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = ImageDraft::read(&mut reader);
        build_record("image", draft, reader.finish(), ImageDraft::into_image)
    }

    pub fn image_number(&self) -> &str {
        &self.image_number
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }
}

/// A numbered table in the article (`tab.2.1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    table_number: String,
    file_path: String,
}

impl TableRef {
    pub fn new(table_number: impl Into<String>, file_path: impl Into<String>) -> Result<Self> {
        let draft = TableDraft {
            table_number: Some(table_number.into()),
            file_path: Some(file_path.into()),
        };
        build_record("table", draft, Vec::new(), TableDraft::into_table)
    }

    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let mut reader = Normalizer::new(raw);
        let draft = TableDraft::read(&mut reader);
        build_record("table", draft, reader.finish(), TableDraft::into_table)
    }

    pub fn table_number(&self) -> &str {
        &self.table_number
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }
}

/// The label key, or plain `number` when only that is given
fn label_key<'k>(reader: &Normalizer<'_>, key: &'k str) -> &'k str {
    if !reader.has(key) && reader.has("number") {
        "number"
    } else {
        key
    }
}

#[derive(Debug, Default, Validate)]
pub(crate) struct ImageDraft {
    #[validate(length(min = 1, code = "missing", message = "field required"))]
    image_number: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    file_path: Option<String>,
}

impl ImageDraft {
    pub(crate) fn read(reader: &mut Normalizer<'_>) -> Self {
        let key = label_key(reader, "image_number");
        Self {
            image_number: reader.required_str(key),
            file_path: reader.required_str("file_path"),
        }
    }

    pub(crate) fn into_image(self) -> Option<ImageRef> {
        Some(ImageRef {
            image_number: self.image_number?,
            file_path: self.file_path?,
        })
    }
}

#[derive(Debug, Default, Validate)]
pub(crate) struct TableDraft {
    #[validate(length(min = 1, code = "missing", message = "field required"))]
    table_number: Option<String>,

    #[validate(length(min = 1, code = "missing", message = "field required"))]
    file_path: Option<String>,
}

impl TableDraft {
    pub(crate) fn read(reader: &mut Normalizer<'_>) -> Self {
        let key = label_key(reader, "table_number");
        Self {
            table_number: reader.required_str(key),
            file_path: reader.required_str("file_path"),
        }
    }

    pub(crate) fn into_table(self) -> Option<TableRef> {
        Some(TableRef {
            table_number: self.table_number?,
            file_path: self.file_path?,
        })
    }
}
