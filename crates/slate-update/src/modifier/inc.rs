use bson::Bson;
use slate_document::{Document, DocumentId, FieldPath, NodeId, NodeKind, Resolution, type_name};

use super::{ExecInfo, Modifier};
use crate::config::{OverflowPolicy, UpdateConfig};
use crate::error::ModifierError;
use crate::log::LogBuilder;
use crate::numeric::Number;

const OPERATOR: &str = "$inc";

/// `$inc`: add a number to a numeric field, creating it if missing.
///
/// The result type is the wider of the field's and the operand's type
/// (`int < long < double`), except that an `int + int` overflow spills into
/// `long`. A missing field counts as zero in the operand's type.
#[derive(Debug, Clone)]
pub struct IncModifier {
    field: FieldPath,
    operand: Number,
    policy: OverflowPolicy,
    prepared: Option<Prepared>,
}

#[derive(Debug, Clone)]
struct Prepared {
    doc: DocumentId,
    version: u64,
    target: Target,
    result: Number,
    no_op: bool,
    in_place: bool,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Existing(NodeId),
    Missing { ancestor: NodeId, first_missing: usize },
}

impl IncModifier {
    /// Validate the operand. Anything but int, long or double is rejected.
    pub fn init(
        field: FieldPath,
        operand: &Bson,
        config: &UpdateConfig,
    ) -> Result<Self, ModifierError> {
        let Some(number) = Number::from_bson(operand) else {
            return Err(ModifierError::InvalidOperand {
                operator: OPERATOR,
                field: field.dotted().to_string(),
                found: type_name(operand),
            });
        };
        Ok(Self {
            field,
            operand: number,
            policy: config.int64_overflow,
            prepared: None,
        })
    }

    pub fn operand(&self) -> Number {
        self.operand
    }

    fn prepared(&self, phase: &'static str) -> Result<&Prepared, ModifierError> {
        self.prepared
            .as_ref()
            .ok_or(ModifierError::PreconditionViolation(phase))
    }

    fn type_mismatch(&self, found: &'static str) -> ModifierError {
        ModifierError::TypeMismatch {
            operator: OPERATOR,
            field: self.field.dotted().to_string(),
            found,
        }
    }
}

impl Modifier for IncModifier {
    fn prepare(&mut self, doc: &Document) -> Result<ExecInfo, ModifierError> {
        self.prepared = None;

        let (target, current) = match doc.resolve(&self.field)? {
            Resolution::Found(id) => match (doc.kind(id), doc.value(id)) {
                (NodeKind::Leaf, Some(value)) => match Number::from_bson(value) {
                    Some(n) => (Target::Existing(id), Some(n)),
                    None => return Err(self.type_mismatch(type_name(value))),
                },
                (NodeKind::Array, _) => return Err(self.type_mismatch("array")),
                _ => return Err(self.type_mismatch("object")),
            },
            Resolution::Creatable {
                ancestor,
                first_missing,
            } => (
                Target::Missing {
                    ancestor,
                    first_missing,
                },
                None,
            ),
        };

        let base = current.unwrap_or_else(|| Number::zero(self.operand.numeric_type()));
        let result = base
            .add(self.operand, self.policy)
            .map_err(|_| ModifierError::NumericOverflow {
                operator: OPERATOR,
                field: self.field.dotted().to_string(),
            })?;

        let (no_op, in_place) = match current {
            Some(current) => {
                let (from, to) = (current.numeric_type(), result.numeric_type());
                (
                    self.operand.is_zero() && from == to,
                    from.storage_width() == to.storage_width(),
                )
            }
            None => (false, false),
        };

        tracing::debug!(
            field = %self.field,
            ?current,
            ?result,
            no_op,
            in_place,
            "prepared $inc"
        );

        self.prepared = Some(Prepared {
            doc: doc.id(),
            version: doc.version(),
            target,
            result,
            no_op,
            in_place,
        });
        Ok(ExecInfo {
            field: self.field.clone(),
            no_op,
            in_place: no_op || in_place,
        })
    }

    fn apply(&self, doc: &mut Document) -> Result<(), ModifierError> {
        let prepared = self.prepared("apply called without a successful prepare")?;
        if prepared.no_op {
            return Err(ModifierError::PreconditionViolation(
                "apply called after a no-op prepare",
            ));
        }
        if prepared.doc != doc.id() {
            return Err(ModifierError::PreconditionViolation(
                "apply called on a different document than prepare",
            ));
        }
        if prepared.version != doc.version() {
            return Err(ModifierError::PreconditionViolation(
                "document changed between prepare and apply",
            ));
        }

        let value = prepared.result.to_bson();
        match prepared.target {
            Target::Existing(id) if prepared.in_place => doc.overwrite_in_place(id, value)?,
            Target::Existing(id) => doc.replace_value(id, &value)?,
            Target::Missing {
                ancestor,
                first_missing,
            } => {
                doc.create_path(ancestor, &self.field, first_missing, &value)?;
            }
        }

        tracing::trace!(field = %self.field, in_place = prepared.in_place, "applied $inc");
        Ok(())
    }

    fn log(&self, log: &mut LogBuilder) -> Result<(), ModifierError> {
        let prepared = self.prepared("log called without a successful prepare")?;
        if prepared.no_op {
            return Ok(());
        }
        log.add_to_sets(&self.field, prepared.result.to_bson())
    }
}
