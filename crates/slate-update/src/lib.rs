//! Update modifier engine: applies field-level update operators to a
//! mutable document and records their effect as an idempotent log.
//!
//! Lifecycle per document: `prepare` (resolve + compute, no mutation) →
//! `apply` (commit) → `log` (absolute assignment). [`Update`] drives a whole
//! update document through that lifecycle.

mod config;
mod error;
mod log;
pub mod modifier;
mod numeric;
mod update;

pub use config::{OverflowPolicy, UpdateConfig};
pub use error::ModifierError;
pub use log::{LogBuilder, LogRecord};
pub use modifier::{AnyModifier, ExecInfo, IncModifier, Modifier};
pub use numeric::{Number, NumericType, Overflow};
pub use update::{Update, UpdateOutcome};
