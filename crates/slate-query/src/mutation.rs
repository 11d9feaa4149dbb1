use bson::{Bson, Document};
use slate_document::FieldPath;

/// A single field-level update operator.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOp {
    /// Increment a numeric field by the operand (negative for decrement).
    /// The operand is validated when the modifier is initialized.
    Inc(Bson),
}

/// A single field + operator pair within a Mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMutation {
    pub field: FieldPath,
    pub op: MutationOp,
}

/// A complete update specification: a list of (field, operator) pairs in
/// document order. No two fields conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub ops: Vec<FieldMutation>,
}

/// Parse an update document into a validated `Mutation`.
///
/// Recognizes `$inc`, whose value is a sub-document mapping dotted field
/// paths to operands. A top-level `_id` is skipped.
///
/// # Errors
///
/// Returns an error if the document is empty, contains unknown operators or
/// bare (replacement-style) fields, targets `_id`, has a malformed path, or
/// names two paths where one equals or contains the other.
pub fn parse_mutation(doc: &Document) -> Result<Mutation, ParseError> {
    let mut ops = Vec::new();

    for (key, value) in doc {
        if key == "_id" {
            continue; // silently skip _id
        }

        match key.as_str() {
            "$inc" => parse_operator_fields(key, value, MutationOp::Inc, &mut ops)?,
            k if k.starts_with('$') => {
                return Err(ParseError(format!("unknown operator: {k}")));
            }
            k => {
                return Err(ParseError(format!(
                    "bare field '{k}' is not allowed in an operator update"
                )));
            }
        }
    }

    if ops.is_empty() {
        return Err(ParseError("empty mutation document".into()));
    }

    for (i, fm) in ops.iter().enumerate() {
        if fm.field.head() == "_id" {
            return Err(ParseError("cannot mutate _id field".into()));
        }
        if let Some(other) = ops[..i].iter().find(|o| o.field.conflicts_with(&fm.field)) {
            return Err(ParseError(format!(
                "updating '{}' would conflict with '{}'",
                fm.field, other.field
            )));
        }
    }

    Ok(Mutation { ops })
}

/// Parse error for mutation documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mutation parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

// ── Internal helpers ────────────────────────────────────────────

/// Parse an operator sub-document where each field maps to an operand.
fn parse_operator_fields(
    operator: &str,
    value: &Bson,
    make_op: fn(Bson) -> MutationOp,
    ops: &mut Vec<FieldMutation>,
) -> Result<(), ParseError> {
    let sub_doc = match value {
        Bson::Document(d) => d,
        _ => return Err(ParseError(format!("{operator} value must be a document"))),
    };
    if sub_doc.is_empty() {
        return Err(ParseError(format!("{operator} document must not be empty")));
    }
    for (field, operand) in sub_doc {
        let field = FieldPath::parse(field)
            .map_err(|e| ParseError(format!("{operator}: {e}")))?;
        ops.push(FieldMutation {
            field,
            op: make_op(operand.clone()),
        });
    }
    Ok(())
}
