use bson::Bson;

/// Encoded byte width of a fixed-size BSON value, or `None` for
/// variable-length and container types.
///
/// Two values with the same fixed width can replace each other inside the
/// same storage slot without touching the surrounding layout.
pub fn fixed_width(value: &Bson) -> Option<usize> {
    match value {
        Bson::Null | Bson::Undefined | Bson::MinKey | Bson::MaxKey => Some(0),
        Bson::Boolean(_) => Some(1),
        Bson::Int32(_) => Some(4),
        Bson::Int64(_) | Bson::Double(_) | Bson::DateTime(_) | Bson::Timestamp(_) => Some(8),
        Bson::ObjectId(_) => Some(12),
        Bson::Decimal128(_) => Some(16),
        _ => None,
    }
}

/// Short, stable type name used in error messages.
pub fn type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Document(_) => "object",
        Bson::Array(_) => "array",
        Bson::Binary(_) => "binData",
        Bson::Undefined => "undefined",
        Bson::ObjectId(_) => "objectId",
        Bson::Boolean(_) => "bool",
        Bson::DateTime(_) => "date",
        Bson::Null => "null",
        Bson::RegularExpression(_) => "regex",
        Bson::DbPointer(_) => "dbPointer",
        Bson::JavaScriptCode(_) => "javascript",
        Bson::Symbol(_) => "symbol",
        Bson::JavaScriptCodeWithScope(_) => "javascriptWithScope",
        Bson::Int32(_) => "int",
        Bson::Timestamp(_) => "timestamp",
        Bson::Int64(_) => "long",
        Bson::Decimal128(_) => "decimal",
        Bson::MinKey => "minKey",
        Bson::MaxKey => "maxKey",
    }
}
