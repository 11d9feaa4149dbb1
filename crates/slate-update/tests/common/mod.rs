#![allow(dead_code)]

use bson::Bson;
use slate_document::{Document, FieldPath};
use slate_update::{IncModifier, LogBuilder, Modifier, UpdateConfig};

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn path(p: &str) -> FieldPath {
    FieldPath::parse(p).unwrap()
}

pub fn inc(field: &str, operand: impl Into<Bson>) -> IncModifier {
    IncModifier::init(path(field), &operand.into(), &UpdateConfig::default()).unwrap()
}

/// prepare → apply → log against `doc`, returning the rendered log.
pub fn run(m: &mut IncModifier, doc: &mut Document) -> bson::Document {
    let info = m.prepare(doc).unwrap();
    let mut log = LogBuilder::new();
    if !info.no_op {
        m.apply(doc).unwrap();
        m.log(&mut log).unwrap();
    }
    log.finish().to_bson()
}
