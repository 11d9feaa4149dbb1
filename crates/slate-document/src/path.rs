use std::fmt;

use crate::error::DocumentError;

/// A dotted field path such as `"address.city"`, split into segments.
///
/// Parsed once and reused for every document the path is resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    dotted: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path. Rejects the empty path and empty segments
    /// (`"a..b"`, `".a"`, `"a."`).
    pub fn parse(dotted: &str) -> Result<Self, DocumentError> {
        if dotted.is_empty() {
            return Err(DocumentError::InvalidPath(dotted.to_string()));
        }
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(DocumentError::InvalidPath(dotted.to_string()));
        }
        Ok(Self {
            dotted: dotted.to_string(),
            segments,
        })
    }

    pub fn dotted(&self) -> &str {
        &self.dotted
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment. Top-level field name.
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// True if `self` names `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// Two paths conflict when writing one would overwrite (part of) the other.
    pub fn conflicts_with(&self, other: &FieldPath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted)
    }
}
