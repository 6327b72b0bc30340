//! Manifest parsing: the `---` delimited YAML header at the top of a
//! `SKILL.md` document.

use serde_yaml::{Mapping, Value};

const OPENING: &str = "---\n";
const CLOSING: &str = "\n---\n";

/// Structural failures while extracting or parsing a manifest header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("document does not start with a --- delimited header")]
    MissingHeader,
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("header is not a mapping")]
    NotAMapping,
}

/// Parsed header fields plus the document body that follows the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub fields: Mapping,
    pub body: String,
}

impl Manifest {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String value of a top-level key. Non-string values yield `None`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }
}

/// Split a document into `(header, body)`.
///
/// The header must start at offset zero with a `---` line and ends at the
/// first following `---` line that has at least one character of content
/// before it. Returns `None` when no such block exists.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix(OPENING)?;
    let close = rest
        .bytes()
        .enumerate()
        .skip(1)
        .find(|&(i, b)| b == b'\n' && rest[i..].starts_with(CLOSING))
        .map(|(i, _)| i)?;

    Some((&rest[..=close], &rest[close + CLOSING.len()..]))
}

/// Parse a document's manifest header.
pub fn parse_manifest(content: &str) -> Result<Manifest, ManifestError> {
    let (header, body) = split_frontmatter(content).ok_or(ManifestError::MissingHeader)?;
    let value: Value = serde_yaml::from_str(header)
        .map_err(|e| ManifestError::MalformedHeader(e.to_string()))?;

    match value {
        Value::Mapping(fields) => Ok(Manifest {
            fields,
            body: body.to_string(),
        }),
        _ => Err(ManifestError::NotAMapping),
    }
}

/// Whether a header value renders as blank text: null, or a string that is
/// empty after trimming. Numbers, booleans and collections never are.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Tagged(tagged) => is_blank(&tagged.value),
        Value::Bool(_) | Value::Number(_) | Value::Sequence(_) | Value::Mapping(_) => false,
    }
}
