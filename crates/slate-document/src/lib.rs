//! Mutable, arena-backed document tree with dotted-path addressing.
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Leaf values
//! live in a separate slot arena so that swapping a value for one of a
//! different storage width is a slot rebind rather than a tree edit.

mod document;
mod error;
mod path;
mod value;

pub use bson::{Bson, doc};
pub use document::{Document, DocumentId, NodeId, NodeKind, Resolution};
pub use error::DocumentError;
pub use path::FieldPath;
pub use value::{fixed_width, type_name};
