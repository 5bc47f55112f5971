//! YAML frontmatter extraction for documents.
//!
//! A document may start with a `---` delimited YAML block. Only `title` and
//! `date` are read here; every other key is ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Fields read from a document's frontmatter.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Frontmatter {
    /// Display title, if set and non-blank.
    pub title: Option<String>,
    /// Raw `date` value, parsed separately with [`parse_date`].
    pub date: Option<String>,
}

/// Raw frontmatter as deserialized from YAML.
///
/// Values are kept as YAML scalars so `title: 2024` or `date: 2024-01-01`
/// don't fail on their scalar type.
#[derive(Deserialize)]
struct RawFrontmatter {
    title: Option<serde_yaml::Value>,
    date: Option<serde_yaml::Value>,
}

/// Error type for frontmatter parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum FrontmatterError {
    /// Opening `---` without a closing delimiter.
    #[error("unterminated frontmatter block")]
    Unterminated,
    /// YAML could not be parsed into a mapping.
    #[error("invalid YAML: {0}")]
    Yaml(String),
    /// A field has a non-scalar value.
    #[error("field `{0}` must be a scalar")]
    NotScalar(&'static str),
}

/// Locate the YAML block at the head of a document.
///
/// Returns `Ok(None)` when the document has no frontmatter.
pub(crate) fn extract_frontmatter(content: &str) -> Result<Option<&str>, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if first.trim_end() != "---" {
        return Ok(None);
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "---" {
            return Ok(Some(&content[start..offset]));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Parse `title` and `date` from a frontmatter YAML block.
///
/// Blank content yields empty frontmatter.
pub(crate) fn parse_frontmatter(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    let trimmed = yaml.trim();
    if trimmed.is_empty() {
        return Ok(Frontmatter::default());
    }

    let raw: RawFrontmatter =
        serde_yaml::from_str(trimmed).map_err(|e| FrontmatterError::Yaml(e.to_string()))?;

    let title = raw
        .title
        .map(|v| scalar_to_string(v, "title"))
        .transpose()?
        .flatten()
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().to_owned());
    let date = raw
        .date
        .map(|v| scalar_to_string(v, "date"))
        .transpose()?
        .flatten();

    Ok(Frontmatter { title, date })
}

/// Render a YAML scalar as a string. `null` becomes `None`.
fn scalar_to_string(
    value: serde_yaml::Value,
    field: &'static str,
) -> Result<Option<String>, FrontmatterError> {
    match value {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::String(s) => Ok(Some(s)),
        serde_yaml::Value::Number(n) => Ok(Some(n.to_string())),
        serde_yaml::Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(FrontmatterError::NotScalar(field)),
    }
}

/// Parse a frontmatter date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` (space or `T` separator) and
/// RFC 3339 timestamps (normalised to UTC). Returns `None` for anything else.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
