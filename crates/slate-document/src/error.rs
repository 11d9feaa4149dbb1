use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The dotted path is empty or contains an empty segment.
    InvalidPath(String),
    /// A path segment tries to descend through a scalar.
    PathConflict { path: String, segment: String },
    /// Missing suffixes are never synthesized inside arrays.
    ArrayElementMissing { path: String, segment: String },
    NotALeaf,
    RootNotObject,
    WidthMismatch { old: &'static str, new: &'static str },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::InvalidPath(path) => write!(f, "invalid field path: '{path}'"),
            DocumentError::PathConflict { path, segment } => write!(
                f,
                "cannot traverse '{segment}' in '{path}': element is not a container"
            ),
            DocumentError::ArrayElementMissing { path, segment } => write!(
                f,
                "cannot create element '{segment}' of '{path}' inside an array"
            ),
            DocumentError::NotALeaf => write!(f, "node is not a leaf value"),
            DocumentError::RootNotObject => write!(f, "document root must be an object"),
            DocumentError::WidthMismatch { old, new } => write!(
                f,
                "cannot overwrite {old} with {new} in place: storage width differs"
            ),
        }
    }
}

impl std::error::Error for DocumentError {}
