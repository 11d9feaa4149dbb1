use slate_document::DocumentError;
use slate_query::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum ModifierError {
    #[error("{operator}: operand for '{field}' must be a number, found {found}")]
    InvalidOperand {
        operator: &'static str,
        field: String,
        found: &'static str,
    },

    #[error("cannot apply {operator} to '{field}': existing value has non-numeric type {found}")]
    TypeMismatch {
        operator: &'static str,
        field: String,
        found: &'static str,
    },

    #[error("cannot traverse '{segment}' in '{path}': element is not a container")]
    PathConflict { path: String, segment: String },

    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),

    #[error("{operator}: 64-bit integer overflow at '{field}'")]
    NumericOverflow {
        operator: &'static str,
        field: String,
    },

    #[error("log entry for '{path}' conflicts with existing entry '{existing}'")]
    ConflictingLogEntry { path: String, existing: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("document error: {0}")]
    Document(DocumentError),
}

impl From<DocumentError> for ModifierError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::PathConflict { path, segment } => {
                ModifierError::PathConflict { path, segment }
            }
            other => ModifierError::Document(other),
        }
    }
}
