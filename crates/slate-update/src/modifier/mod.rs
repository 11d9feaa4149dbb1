mod inc;

use slate_document::{Document, FieldPath};
use slate_query::{FieldMutation, MutationOp};

use crate::config::UpdateConfig;
use crate::error::ModifierError;
use crate::log::LogBuilder;

pub use inc::IncModifier;

/// What a successful `prepare` decided for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecInfo {
    /// The resolved target path.
    pub field: FieldPath,
    /// Nothing to write and nothing to log.
    pub no_op: bool,
    /// The pending write fits the existing storage slot. Always `true` for a
    /// no-op, always `false` when the field has to be created.
    pub in_place: bool,
}

/// Lifecycle shared by every update operator.
///
/// Construction validates the operand. Then, per document:
/// `prepare` → (`apply`) → (`log`). Each `prepare` replaces whatever the
/// previous cycle left behind, so one instance serves many documents.
pub trait Modifier {
    /// Resolve the target and compute the result without touching `doc`.
    fn prepare(&mut self, doc: &Document) -> Result<ExecInfo, ModifierError>;

    /// Commit the prepared result to the document it was prepared against.
    fn apply(&self, doc: &mut Document) -> Result<(), ModifierError>;

    /// Append the prepared effect to `log`. Valid with or without `apply`.
    fn log(&self, log: &mut LogBuilder) -> Result<(), ModifierError>;
}

/// Closed set of supported operators.
#[derive(Debug, Clone)]
pub enum AnyModifier {
    Inc(IncModifier),
}

impl AnyModifier {
    pub fn init(spec: &FieldMutation, config: &UpdateConfig) -> Result<Self, ModifierError> {
        match &spec.op {
            MutationOp::Inc(operand) => Ok(AnyModifier::Inc(IncModifier::init(
                spec.field.clone(),
                operand,
                config,
            )?)),
        }
    }
}

impl Modifier for AnyModifier {
    fn prepare(&mut self, doc: &Document) -> Result<ExecInfo, ModifierError> {
        match self {
            AnyModifier::Inc(m) => m.prepare(doc),
        }
    }

    fn apply(&self, doc: &mut Document) -> Result<(), ModifierError> {
        match self {
            AnyModifier::Inc(m) => m.apply(doc),
        }
    }

    fn log(&self, log: &mut LogBuilder) -> Result<(), ModifierError> {
        match self {
            AnyModifier::Inc(m) => m.log(log),
        }
    }
}
