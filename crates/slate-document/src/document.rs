use std::sync::atomic::{AtomicU64, Ordering};

use bson::Bson;

use crate::error::DocumentError;
use crate::path::FieldPath;
use crate::value::{fixed_width, type_name};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one live [`Document`]. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

/// Stable index of a node in a document's arena.
///
/// Only meaningful for the document that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    Leaf,
}

#[derive(Debug, Clone, Copy)]
enum Storage {
    Object,
    Array,
    /// Index into `Document::slots`.
    Leaf(u32),
}

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    storage: Storage,
    children: Vec<NodeId>,
}

/// Outcome of resolving a [`FieldPath`] against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The full path exists. The node may be a leaf or a container.
    Found(NodeId),
    /// `ancestor` is the deepest existing object on the path and
    /// `segments()[first_missing..]` must be created below it.
    Creatable { ancestor: NodeId, first_missing: usize },
}

/// A mutable document tree.
///
/// Objects keep their children in insertion order. Leaf values sit in a
/// slot arena: an in-place write overwrites a slot whose width is unchanged,
/// a structural replace binds the leaf to a fresh slot. Any structural
/// change permanently clears [`Document::is_in_place_mode_enabled`].
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    nodes: Vec<Node>,
    slots: Vec<Bson>,
    in_place: bool,
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document: a root object with no children.
    pub fn new() -> Self {
        Self {
            id: DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                storage: Storage::Object,
                children: Vec::new(),
            }],
            slots: Vec::new(),
            in_place: true,
            version: 0,
        }
    }

    /// Build a tree from a BSON document. The result starts in in-place mode.
    pub fn from_bson(doc: &bson::Document) -> Self {
        let mut out = Self::new();
        let root = out.root();
        for (name, value) in doc {
            out.push_child(root, name.clone(), value);
        }
        out
    }

    /// Render the tree back into a BSON document.
    pub fn to_bson(&self) -> bson::Document {
        self.render_object(self.root())
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// True while every committed mutation has been an in-place overwrite.
    /// Sticky: once false, stays false for the document's lifetime.
    pub fn is_in_place_mode_enabled(&self) -> bool {
        self.in_place
    }

    /// Bumped by every mutation. Node ids and values observed at one version
    /// may be stale at another.
    pub fn version(&self) -> u64 {
        self.version
    }

    // ── Introspection ───────────────────────────────────────────

    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.nodes[id.index()].storage {
            Storage::Object => NodeKind::Object,
            Storage::Array => NodeKind::Array,
            Storage::Leaf(_) => NodeKind::Leaf,
        }
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Look up a direct child by field name (objects) or decimal index (arrays).
    /// Array indices must be canonical: `"01"` or `"+1"` name no element.
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = &self.nodes[id.index()];
        match node.storage {
            Storage::Object => node
                .children
                .iter()
                .copied()
                .find(|c| self.nodes[c.index()].name == name),
            Storage::Array => name
                .parse::<usize>()
                .ok()
                .filter(|i| i.to_string() == name)
                .and_then(|i| node.children.get(i).copied()),
            Storage::Leaf(_) => None,
        }
    }

    /// The scalar held by a leaf, `None` for containers.
    pub fn value(&self, id: NodeId) -> Option<&Bson> {
        match self.nodes[id.index()].storage {
            Storage::Leaf(slot) => Some(&self.slots[slot as usize]),
            _ => None,
        }
    }

    /// Convenience lookup of a leaf value by path. Missing paths and
    /// containers yield `None`.
    pub fn get(&self, path: &FieldPath) -> Option<&Bson> {
        match self.resolve(path) {
            Ok(Resolution::Found(id)) => self.value(id),
            _ => None,
        }
    }

    // ── Path resolution ─────────────────────────────────────────

    /// Resolve `path` without modifying anything.
    ///
    /// Fails with `PathConflict` when a segment would descend through a
    /// scalar, and with `ArrayElementMissing` when the first missing segment
    /// sits inside an array.
    pub fn resolve(&self, path: &FieldPath) -> Result<Resolution, DocumentError> {
        let mut current = self.root();
        for (depth, segment) in path.segments().iter().enumerate() {
            match self.nodes[current.index()].storage {
                Storage::Leaf(_) => {
                    return Err(DocumentError::PathConflict {
                        path: path.dotted().to_string(),
                        segment: path.segments()[depth - 1].clone(),
                    });
                }
                Storage::Object => match self.child(current, segment) {
                    Some(next) => current = next,
                    None => {
                        return Ok(Resolution::Creatable {
                            ancestor: current,
                            first_missing: depth,
                        });
                    }
                },
                Storage::Array => match self.child(current, segment) {
                    Some(next) => current = next,
                    None => {
                        return Err(DocumentError::ArrayElementMissing {
                            path: path.dotted().to_string(),
                            segment: segment.clone(),
                        });
                    }
                },
            }
        }
        Ok(Resolution::Found(current))
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Overwrite a leaf's value within its existing slot.
    ///
    /// Only legal when old and new values share a fixed storage width; the
    /// in-place flag is left untouched.
    pub fn overwrite_in_place(&mut self, id: NodeId, value: Bson) -> Result<(), DocumentError> {
        let Storage::Leaf(slot) = self.nodes[id.index()].storage else {
            return Err(DocumentError::NotALeaf);
        };
        let current = &self.slots[slot as usize];
        match (fixed_width(current), fixed_width(&value)) {
            (Some(old), Some(new)) if old == new => {}
            _ => {
                return Err(DocumentError::WidthMismatch {
                    old: type_name(current),
                    new: type_name(&value),
                });
            }
        }
        self.slots[slot as usize] = value;
        self.version += 1;
        Ok(())
    }

    /// Reinstall a node's value. Leaves are rebound to a new slot, containers
    /// have their children detached. Disables in-place mode.
    pub fn replace_value(&mut self, id: NodeId, value: &Bson) -> Result<(), DocumentError> {
        if id == self.root() && !matches!(value, Bson::Document(_)) {
            return Err(DocumentError::RootNotObject);
        }
        self.fill(id, value);
        self.in_place = false;
        self.version += 1;
        Ok(())
    }

    /// Materialize `path.segments()[first_missing..]` below `ancestor`.
    ///
    /// Every segment except the last becomes an empty object (existing
    /// objects on the way are reused), the last one holds `value`.
    /// Disables in-place mode.
    pub fn create_path(
        &mut self,
        ancestor: NodeId,
        path: &FieldPath,
        first_missing: usize,
        value: &Bson,
    ) -> Result<NodeId, DocumentError> {
        let Some((last, intermediates)) = path.segments()[first_missing..].split_last() else {
            return Err(DocumentError::InvalidPath(path.dotted().to_string()));
        };
        self.version += 1;

        let mut current = ancestor;
        for segment in intermediates {
            current = match self.child(current, segment) {
                Some(existing) if self.kind(existing) != NodeKind::Leaf => existing,
                Some(_) => {
                    return Err(DocumentError::PathConflict {
                        path: path.dotted().to_string(),
                        segment: segment.clone(),
                    });
                }
                None => self.insert_child(
                    current,
                    path,
                    segment,
                    &Bson::Document(bson::Document::new()),
                )?,
            };
        }

        let id = match self.child(current, last) {
            Some(existing) => {
                self.fill(existing, value);
                existing
            }
            None => self.insert_child(current, path, last, value)?,
        };
        self.in_place = false;
        Ok(id)
    }

    /// Assign `value` at `path`, creating whatever is missing. Uses an
    /// in-place overwrite when the target is a leaf of the same width.
    pub fn set_path(&mut self, path: &FieldPath, value: &Bson) -> Result<NodeId, DocumentError> {
        match self.resolve(path)? {
            Resolution::Found(id) => {
                let same_width = match (self.value(id), fixed_width(value)) {
                    (Some(current), Some(new)) => fixed_width(current) == Some(new),
                    _ => false,
                };
                if same_width {
                    self.overwrite_in_place(id, value.clone())?;
                } else {
                    self.replace_value(id, value)?;
                }
                Ok(id)
            }
            Resolution::Creatable {
                ancestor,
                first_missing,
            } => self.create_path(ancestor, path, first_missing, value),
        }
    }

    // ── Internal helpers ────────────────────────────────────────

    fn insert_child(
        &mut self,
        parent: NodeId,
        path: &FieldPath,
        name: &str,
        value: &Bson,
    ) -> Result<NodeId, DocumentError> {
        match self.nodes[parent.index()].storage {
            Storage::Object => Ok(self.push_child(parent, name.to_string(), value)),
            Storage::Array => Err(DocumentError::ArrayElementMissing {
                path: path.dotted().to_string(),
                segment: name.to_string(),
            }),
            Storage::Leaf(_) => Err(DocumentError::PathConflict {
                path: path.dotted().to_string(),
                segment: self.nodes[parent.index()].name.clone(),
            }),
        }
    }

    /// Allocate a node for `value` and append it to `parent`'s children.
    fn push_child(&mut self, parent: NodeId, name: String, value: &Bson) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name,
            parent: Some(parent),
            storage: Storage::Object,
            children: Vec::new(),
        });
        self.fill(id, value);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// (Re)build the subtree rooted at `id` from `value`. Previous children
    /// and slots stay in the arena, unreachable, until the document drops.
    fn fill(&mut self, id: NodeId, value: &Bson) {
        let node = &mut self.nodes[id.index()];
        node.children.clear();
        match value {
            Bson::Document(doc) => {
                node.storage = Storage::Object;
                for (name, child) in doc {
                    self.push_child(id, name.clone(), child);
                }
            }
            Bson::Array(items) => {
                node.storage = Storage::Array;
                for (i, child) in items.iter().enumerate() {
                    self.push_child(id, i.to_string(), child);
                }
            }
            scalar => {
                node.storage = Storage::Leaf(self.slots.len() as u32);
                self.slots.push(scalar.clone());
            }
        }
    }

    fn render(&self, id: NodeId) -> Bson {
        let node = &self.nodes[id.index()];
        match node.storage {
            Storage::Object => Bson::Document(self.render_object(id)),
            Storage::Array => Bson::Array(node.children.iter().map(|c| self.render(*c)).collect()),
            Storage::Leaf(slot) => self.slots[slot as usize].clone(),
        }
    }

    fn render_object(&self, id: NodeId) -> bson::Document {
        let mut out = bson::Document::new();
        for child in &self.nodes[id.index()].children {
            out.insert(self.nodes[child.index()].name.clone(), self.render(*child));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    // ── Conversion ──────────────────────────────────────────────

    #[test]
    fn round_trips_nested_bson() {
        let src = doc! { "a": 1, "b": { "c": "x", "d": [1_i64, 2.5, { "e": true }] }, "z": null };
        let doc = Document::from_bson(&src);
        assert_eq!(doc.to_bson(), src);
        assert!(doc.is_in_place_mode_enabled());
    }

    #[test]
    fn preserves_insertion_order() {
        let doc = Document::from_bson(&doc! { "z": 1, "a": 2, "m": 3 });
        let names: Vec<&str> = doc
            .children(doc.root())
            .iter()
            .map(|c| doc.name(*c))
            .collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn fresh_documents_have_distinct_ids() {
        assert_ne!(Document::new().id(), Document::new().id());
    }

    // ── resolve ─────────────────────────────────────────────────

    #[test]
    fn resolve_existing_leaf() {
        let doc = Document::from_bson(&doc! { "a": { "b": 2 } });
        let Resolution::Found(id) = doc.resolve(&path("a.b")).unwrap() else {
            panic!("expected Found");
        };
        assert_eq!(doc.kind(id), NodeKind::Leaf);
        assert_eq!(doc.value(id), Some(&Bson::Int32(2)));
        assert_eq!(doc.name(doc.parent(id).unwrap()), "a");
    }

    #[test]
    fn resolve_existing_container() {
        let doc = Document::from_bson(&doc! { "a": { "b": 2 } });
        let Resolution::Found(id) = doc.resolve(&path("a")).unwrap() else {
            panic!("expected Found");
        };
        assert_eq!(doc.kind(id), NodeKind::Object);
    }

    #[test]
    fn resolve_missing_suffix() {
        let doc = Document::from_bson(&doc! { "a": { "b": 2 } });
        let res = doc.resolve(&path("a.c.d")).unwrap();
        let a = doc.child(doc.root(), "a").unwrap();
        assert_eq!(
            res,
            Resolution::Creatable {
                ancestor: a,
                first_missing: 1
            }
        );
    }

    #[test]
    fn resolve_through_scalar_conflicts() {
        let doc = Document::from_bson(&doc! { "a": 5 });
        assert_eq!(
            doc.resolve(&path("a.b")),
            Err(DocumentError::PathConflict {
                path: "a.b".into(),
                segment: "a".into()
            })
        );
    }

    #[test]
    fn resolve_array_index() {
        let doc = Document::from_bson(&doc! { "a": [10, 20] });
        let Resolution::Found(id) = doc.resolve(&path("a.1")).unwrap() else {
            panic!("expected Found");
        };
        assert_eq!(doc.value(id), Some(&Bson::Int32(20)));
        assert!(matches!(
            doc.resolve(&path("a.5")),
            Err(DocumentError::ArrayElementMissing { .. })
        ));
    }

    #[test]
    fn array_index_must_be_canonical() {
        let doc = Document::from_bson(&doc! { "a": [10, 20] });
        for alias in ["a.01", "a.+1", "a.1 "] {
            assert!(
                matches!(
                    doc.resolve(&path(alias)),
                    Err(DocumentError::ArrayElementMissing { .. })
                ),
                "{alias} should not resolve"
            );
        }
        let a = doc.child(doc.root(), "a").unwrap();
        assert_eq!(doc.child(a, "0"), doc.children(a).first().copied());
        assert_eq!(doc.child(a, "00"), None);
    }

    // ── Mutation ────────────────────────────────────────────────

    #[test]
    fn every_mutation_bumps_version() {
        let mut doc = Document::from_bson(&doc! { "a": 1, "b": "x" });
        assert_eq!(doc.version(), 0);
        let a = doc.child(doc.root(), "a").unwrap();
        doc.overwrite_in_place(a, Bson::Int32(2)).unwrap();
        assert_eq!(doc.version(), 1);
        doc.replace_value(a, &Bson::Int64(3)).unwrap();
        assert_eq!(doc.version(), 2);
        doc.set_path(&path("c.d"), &Bson::Int32(4)).unwrap();
        assert_eq!(doc.version(), 3);

        let _ = doc.resolve(&path("a")).unwrap();
        assert!(doc.overwrite_in_place(a, Bson::String("y".into())).is_err());
        assert_eq!(doc.version(), 3);
    }

    #[test]
    fn in_place_overwrite_keeps_mode() {
        let mut doc = Document::from_bson(&doc! { "a": 1_i64 });
        let a = doc.child(doc.root(), "a").unwrap();
        doc.overwrite_in_place(a, Bson::Double(1.5)).unwrap();
        assert!(doc.is_in_place_mode_enabled());
        assert_eq!(doc.to_bson(), doc! { "a": 1.5 });
    }

    #[test]
    fn in_place_overwrite_rejects_width_change() {
        let mut doc = Document::from_bson(&doc! { "a": 1 });
        let a = doc.child(doc.root(), "a").unwrap();
        assert_eq!(
            doc.overwrite_in_place(a, Bson::Int64(1)),
            Err(DocumentError::WidthMismatch {
                old: "int",
                new: "long"
            })
        );
        assert_eq!(doc.to_bson(), doc! { "a": 1 });
    }

    #[test]
    fn in_place_overwrite_rejects_container() {
        let mut doc = Document::from_bson(&doc! { "a": {} });
        let a = doc.child(doc.root(), "a").unwrap();
        assert_eq!(
            doc.overwrite_in_place(a, Bson::Int32(1)),
            Err(DocumentError::NotALeaf)
        );
    }

    #[test]
    fn replace_value_is_sticky() {
        let mut doc = Document::from_bson(&doc! { "a": 1, "b": 2 });
        let a = doc.child(doc.root(), "a").unwrap();
        doc.replace_value(a, &Bson::Int64(1)).unwrap();
        assert!(!doc.is_in_place_mode_enabled());

        let b = doc.child(doc.root(), "b").unwrap();
        doc.overwrite_in_place(b, Bson::Int32(3)).unwrap();
        assert!(!doc.is_in_place_mode_enabled());
        assert_eq!(doc.to_bson(), doc! { "a": 1_i64, "b": 3 });
    }

    #[test]
    fn replace_root_with_scalar_fails() {
        let mut doc = Document::new();
        let root = doc.root();
        assert_eq!(
            doc.replace_value(root, &Bson::Int32(1)),
            Err(DocumentError::RootNotObject)
        );
        assert!(doc.is_in_place_mode_enabled());
    }

    #[test]
    fn create_path_builds_intermediates() {
        let mut doc = Document::from_bson(&doc! { "a": { "x": 1 } });
        let p = path("a.b.c");
        let Resolution::Creatable {
            ancestor,
            first_missing,
        } = doc.resolve(&p).unwrap()
        else {
            panic!("expected Creatable");
        };
        doc.create_path(ancestor, &p, first_missing, &Bson::Int32(7))
            .unwrap();
        assert!(!doc.is_in_place_mode_enabled());
        assert_eq!(doc.to_bson(), doc! { "a": { "x": 1, "b": { "c": 7 } } });
    }

    #[test]
    fn create_path_inside_array_fails() {
        let mut doc = Document::from_bson(&doc! { "a": [1] });
        let p = path("a.3");
        let a = doc.child(doc.root(), "a").unwrap();
        assert!(matches!(
            doc.create_path(a, &p, 1, &Bson::Int32(1)),
            Err(DocumentError::ArrayElementMissing { .. })
        ));
    }

    #[test]
    fn set_path_overwrites_in_place_when_width_matches() {
        let mut doc = Document::from_bson(&doc! { "a": 1_i64 });
        doc.set_path(&path("a"), &Bson::Double(2.0)).unwrap();
        assert!(doc.is_in_place_mode_enabled());
        assert_eq!(doc.to_bson(), doc! { "a": 2.0 });

        doc.set_path(&path("a"), &Bson::Int32(3)).unwrap();
        assert!(!doc.is_in_place_mode_enabled());
        assert_eq!(doc.to_bson(), doc! { "a": 3 });
    }

    #[test]
    fn set_path_replaces_container() {
        let mut doc = Document::from_bson(&doc! { "a": { "b": 1 } });
        doc.set_path(&path("a"), &Bson::Int32(5)).unwrap();
        assert_eq!(doc.to_bson(), doc! { "a": 5 });
        assert_eq!(doc.get(&path("a")), Some(&Bson::Int32(5)));
    }
}
