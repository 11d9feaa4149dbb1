use slate_document::Document;
use slate_query::{Mutation, parse_mutation};

use crate::config::UpdateConfig;
use crate::error::ModifierError;
use crate::log::{LogBuilder, LogRecord};
use crate::modifier::{AnyModifier, Modifier};

/// Result of running an [`Update`] against one document.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// Absolute assignments for every modifier that was not a no-op.
    pub log: LogRecord,
    /// False when every modifier was a no-op.
    pub changed: bool,
    /// The document's sticky in-place flag after the update.
    pub in_place: bool,
}

/// All modifiers of one update document, reusable across target documents.
#[derive(Debug, Clone)]
pub struct Update {
    modifiers: Vec<AnyModifier>,
}

impl Update {
    /// Build one modifier per field mutation. Fails on the first invalid operand.
    pub fn new(mutation: &Mutation, config: &UpdateConfig) -> Result<Self, ModifierError> {
        let modifiers = mutation
            .ops
            .iter()
            .map(|fm| AnyModifier::init(fm, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { modifiers })
    }

    /// Parse an update document such as `{ "$inc": { "a": 1 } }`.
    pub fn parse(doc: &bson::Document, config: &UpdateConfig) -> Result<Self, ModifierError> {
        let mutation = parse_mutation(doc)?;
        Self::new(&mutation, config)
    }

    /// Run every modifier against `doc`.
    ///
    /// All modifiers are prepared before anything is written; if any prepare
    /// fails the error is returned and `doc` is left exactly as it was.
    /// Once the first write lands, each later modifier is prepared again
    /// against the current document before it applies.
    pub fn apply(&mut self, doc: &mut Document) -> Result<UpdateOutcome, ModifierError> {
        let version = doc.version();
        let mut infos = Vec::with_capacity(self.modifiers.len());
        for modifier in &mut self.modifiers {
            match modifier.prepare(doc) {
                Ok(info) => infos.push(info),
                Err(error) => {
                    tracing::warn!(%error, "update rejected; document left untouched");
                    return Err(error);
                }
            }
        }

        let mut log = LogBuilder::new();
        let mut changed = false;
        for (modifier, info) in self.modifiers.iter_mut().zip(infos) {
            let info = if doc.version() == version {
                info
            } else {
                modifier.prepare(doc)?
            };
            if info.no_op {
                continue;
            }
            modifier.apply(doc)?;
            modifier.log(&mut log)?;
            changed = true;
        }

        let outcome = UpdateOutcome {
            log: log.finish(),
            changed,
            in_place: doc.is_in_place_mode_enabled(),
        };
        tracing::debug!(
            modifiers = self.modifiers.len(),
            changed,
            in_place = outcome.in_place,
            "update applied"
        );
        Ok(outcome)
    }
}
