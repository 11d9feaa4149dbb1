use bson::Bson;
use slate_document::{Document, FieldPath};
use slate_query::ParseError;

use crate::error::ModifierError;

const SET: &str = "$set";

/// Accumulates the net effect of one update as absolute assignments.
///
/// Entries keep insertion order. Two entries may not name the same path or
/// a path and one of its ancestors, so replay order never matters.
#[derive(Debug, Default)]
pub struct LogBuilder {
    sets: Vec<(FieldPath, Bson)>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path = value`.
    pub fn add_to_sets(&mut self, path: &FieldPath, value: Bson) -> Result<(), ModifierError> {
        if let Some((existing, _)) = self.sets.iter().find(|(p, _)| p.conflicts_with(path)) {
            return Err(ModifierError::ConflictingLogEntry {
                path: path.dotted().to_string(),
                existing: existing.dotted().to_string(),
            });
        }
        self.sets.push((path.clone(), value));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn finish(self) -> LogRecord {
        LogRecord { sets: self.sets }
    }
}

/// A finished, replayable log record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    sets: Vec<(FieldPath, Bson)>,
}

impl LogRecord {
    pub fn entries(&self) -> &[(FieldPath, Bson)] {
        &self.sets
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Render as `{ "$set": { "<dotted path>": value, ... } }`, or `{}` when
    /// nothing was recorded.
    pub fn to_bson(&self) -> bson::Document {
        if self.sets.is_empty() {
            return bson::Document::new();
        }
        let mut sets = bson::Document::new();
        for (path, value) in &self.sets {
            sets.insert(path.dotted(), value.clone());
        }
        let mut out = bson::Document::new();
        out.insert(SET, sets);
        out
    }

    /// Parse the shape produced by [`LogRecord::to_bson`].
    pub fn from_bson(doc: &bson::Document) -> Result<Self, ModifierError> {
        let mut builder = LogBuilder::new();
        for (key, value) in doc {
            match (key.as_str(), value) {
                (SET, Bson::Document(sets)) => {
                    for (field, value) in sets {
                        let path = FieldPath::parse(field)
                            .map_err(|e| ParseError(format!("log entry: {e}")))?;
                        builder.add_to_sets(&path, value.clone())?;
                    }
                }
                (SET, _) => {
                    return Err(ParseError("$set log section must be a document".into()).into());
                }
                (k, _) => return Err(ParseError(format!("unknown log section: {k}")).into()),
            }
        }
        Ok(builder.finish())
    }

    /// Apply every assignment to `doc`.
    ///
    /// The result at each logged path does not depend on what `doc` held
    /// there before. All paths are resolved up front, so a conflict leaves
    /// `doc` unmodified.
    pub fn replay(&self, doc: &mut Document) -> Result<(), ModifierError> {
        for (path, _) in &self.sets {
            doc.resolve(path)?;
        }
        for (path, value) in &self.sets {
            doc.set_path(path, value)?;
        }
        Ok(())
    }
}
