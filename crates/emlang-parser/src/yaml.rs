//! Located YAML node trees.
//!
//! This module turns YAML text into one [`Tree`] per physical document,
//! using the `yaml-rust2` event parser. Every node keeps the 1-based line and
//! column it starts at. Nodes live in an arena and are addressed by
//! [`NodeId`]; an alias is stored as a node pointing at its anchored target
//! and is followed by [`Tree::resolve`] before a node is inspected.

use std::{cell::Cell, collections::HashMap};

use log::trace;
use yaml_rust2::{
    parser::{Event, MarkedEventReceiver, Parser, Tag},
    scanner::{Marker, TScalarStyle},
};

use emlang_core::{PropEntry, PropValue};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    location::Location,
};

/// Tag handles that denote the YAML core schema (`!!str`, `!!null`, ...).
const CORE_SCHEMA_HANDLES: [&str; 2] = ["tag:yaml.org,2002:", "!!"];

/// Values every tree may decode regardless of its size.
const DECODE_BUDGET_BASE: usize = 10_000;

/// Additional decoded values allowed per node of the tree.
const DECODE_BUDGET_PER_NODE: usize = 16;

/// Index of a node within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// A scalar as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Scalar {
    value: String,
    plain: bool,
    tag: Option<String>,
}

impl Scalar {
    /// The raw scalar text.
    pub(crate) fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` if this scalar resolves to null.
    pub(crate) fn is_null(&self) -> bool {
        match self.tag.as_deref() {
            Some("null") => true,
            Some(_) => false,
            None => {
                self.plain && matches!(self.value.as_str(), "" | "~" | "null" | "Null" | "NULL")
            }
        }
    }

    /// Returns `true` if the scalar has no content.
    ///
    /// The event parser reports a missing value (`key:`) as a plain `~`, so
    /// the two spellings cannot be told apart.
    pub(crate) fn is_empty(&self) -> bool {
        self.value.is_empty() || (self.plain && self.tag.is_none() && self.value == "~")
    }

    /// Decode the scalar into the generic value it denotes.
    fn decode(&self) -> PropValue {
        if self.is_null() {
            return PropValue::Null;
        }
        match self.tag.as_deref() {
            Some("str") => return PropValue::String(self.value.clone()),
            Some(_) => {}
            None if !self.plain => return PropValue::String(self.value.clone()),
            None => {}
        }
        decode_plain(&self.value)
    }
}

/// Resolve a plain scalar to a bool, integer, float or string.
fn decode_plain(value: &str) -> PropValue {
    match value {
        "true" | "True" | "TRUE" => return PropValue::Bool(true),
        "false" | "False" | "FALSE" => return PropValue::Bool(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return PropValue::Float(f64::INFINITY);
        }
        "-.inf" | "-.Inf" | "-.INF" => return PropValue::Float(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return PropValue::Float(f64::NAN),
        _ => {}
    }

    if let Some(hex) = value.strip_prefix("0x") {
        if let Ok(i) = i64::from_str_radix(hex, 16) {
            return PropValue::Integer(i);
        }
    }
    if let Some(octal) = value.strip_prefix("0o") {
        if let Ok(i) = i64::from_str_radix(octal, 8) {
            return PropValue::Integer(i);
        }
    }
    if let Ok(i) = value.parse::<i64>() {
        return PropValue::Integer(i);
    }
    let looks_numeric = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && value.chars().any(|c| c.is_ascii_digit());
    if looks_numeric {
        if let Ok(x) = value.parse::<f64>() {
            return PropValue::Float(x);
        }
    }
    PropValue::String(value.to_string())
}

/// The kind of a node, before alias resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Scalar(Scalar),
    Sequence(Vec<NodeId>),
    Mapping(Vec<(NodeId, NodeId)>),
    Alias(NodeId),
}

/// A node and where it starts in the source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    kind: NodeKind,
    location: Location,
}

impl Node {
    pub(crate) fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn location(&self) -> Location {
        self.location
    }

    /// Returns `true` if this node is a null scalar.
    pub(crate) fn is_null(&self) -> bool {
        matches!(&self.kind, NodeKind::Scalar(scalar) if scalar.is_null())
    }

    /// A short name for the node kind, used in error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match &self.kind {
            NodeKind::Scalar(scalar) if scalar.is_null() => "null",
            NodeKind::Scalar(_) => "scalar",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Alias(_) => "alias",
        }
    }
}

/// One physical YAML document.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    decoded: Cell<usize>,
}

impl Tree {
    /// The document root, or `None` for a document with no content.
    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a node without following aliases.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a node, following aliases to the anchored node.
    pub(crate) fn resolve(&self, id: NodeId) -> &Node {
        let mut node = self.node(id);
        while let NodeKind::Alias(target) = node.kind {
            node = self.node(target);
        }
        node
    }

    /// Read a mapping key as text.
    ///
    /// Keys must be scalars; aliases to scalars are accepted.
    pub(crate) fn key_text(&self, id: NodeId) -> Result<(&str, Location)> {
        let node = self.resolve(id);
        match &node.kind {
            NodeKind::Scalar(scalar) => Ok((scalar.value(), self.node(id).location())),
            _ => Err(Diagnostic::error(format!(
                "mapping keys must be scalars, found {}",
                node.describe()
            ))
            .with_code(ErrorCode::E100)
            .with_location(node.location())),
        }
    }

    /// Read the entries of a mapping as `(key text, key location, value)`.
    ///
    /// Fails on non-scalar keys. Repeated keys are returned as written.
    pub(crate) fn pairs(
        &self,
        entries: &[(NodeId, NodeId)],
    ) -> Result<Vec<(&str, Location, NodeId)>> {
        entries
            .iter()
            .map(|&(key, value)| {
                let (text, location) = self.key_text(key)?;
                Ok((text, location, value))
            })
            .collect()
    }

    /// Read the entries of a mapping, failing on non-scalar or duplicate keys.
    pub(crate) fn entries(
        &self,
        entries: &[(NodeId, NodeId)],
    ) -> Result<Vec<(&str, Location, NodeId)>> {
        let pairs = self.pairs(entries)?;
        let mut seen: HashMap<&str, Location> = HashMap::with_capacity(pairs.len());
        for &(text, location, _) in &pairs {
            if let Some(first) = seen.insert(text, location) {
                return Err(duplicate_key(text, location, first));
            }
        }
        Ok(pairs)
    }

    /// Decode any node into a generic property value.
    ///
    /// Aliases are expanded. All decoding in one tree shares a budget
    /// proportional to the tree's size; exceeding it fails with
    /// [`ErrorCode::E003`] at the node being decoded.
    pub(crate) fn decode(&self, id: NodeId) -> Result<PropValue> {
        let decoded = self.decoded.get() + 1;
        if decoded > self.decode_budget() {
            return Err(Diagnostic::error("excessive aliasing")
                .with_code(ErrorCode::E003)
                .with_location(self.node(id).location())
                .with_help("nested aliases expand to too many values"));
        }
        self.decoded.set(decoded);

        let node = self.resolve(id);
        match &node.kind {
            NodeKind::Scalar(scalar) => Ok(scalar.decode()),
            NodeKind::Sequence(items) => items
                .iter()
                .map(|&item| self.decode(item))
                .collect::<Result<Vec<_>>>()
                .map(PropValue::Sequence),
            NodeKind::Mapping(entries) => self
                .entries(entries)?
                .into_iter()
                .map(|(key, _, value)| Ok(PropEntry::new(key, self.decode(value)?)))
                .collect::<Result<Vec<_>>>()
                .map(PropValue::Mapping),
            NodeKind::Alias(_) => unreachable!("resolve() never returns an alias"),
        }
    }

    fn decode_budget(&self) -> usize {
        DECODE_BUDGET_BASE.saturating_add(self.nodes.len().saturating_mul(DECODE_BUDGET_PER_NODE))
    }

    fn push(&mut self, kind: NodeKind, location: Location) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { kind, location });
        id
    }
}

/// Error for a key that repeats an earlier key of the same mapping.
pub(crate) fn duplicate_key(key: &str, location: Location, first: Location) -> Diagnostic {
    Diagnostic::error(format!("duplicate key `{key}`"))
        .with_code(ErrorCode::E103)
        .with_location(location)
        .with_help(format!("first defined at {first}"))
}

/// A collection that is still receiving children.
#[derive(Debug)]
struct OpenCollection {
    id: NodeId,
    anchor_id: usize,
    pending_key: Option<NodeId>,
}

/// Event receiver that builds [`Tree`]s.
#[derive(Debug, Default)]
struct TreeBuilder {
    documents: Vec<Tree>,
    current: Option<Tree>,
    open: Vec<OpenCollection>,
    anchors: HashMap<usize, NodeId>,
    error: Option<Diagnostic>,
}

impl TreeBuilder {
    fn tree(&mut self) -> &mut Tree {
        self.current.get_or_insert_with(Tree::default)
    }

    /// Attach a finished or newly opened node to its parent, or make it root.
    fn attach(&mut self, id: NodeId) {
        let Some(parent) = self.open.last_mut() else {
            self.tree().root = Some(id);
            return;
        };
        let parent_id = parent.id;
        let entry = match parent.pending_key.take() {
            Some(key) => Some((key, id)),
            None => None,
        };
        let is_mapping = matches!(
            self.current.as_ref().map(|tree| &tree.node(parent_id).kind),
            Some(NodeKind::Mapping(_))
        );
        if is_mapping && entry.is_none() {
            self.place_at_first_key(parent_id, id);
            if let Some(parent) = self.open.last_mut() {
                parent.pending_key = Some(id);
            }
            return;
        }
        match &mut self.tree().nodes[parent_id.0].kind {
            NodeKind::Sequence(items) => items.push(id),
            NodeKind::Mapping(entries) => entries.extend(entry),
            NodeKind::Scalar(_) | NodeKind::Alias(_) => {}
        }
    }

    /// Move a block mapping to the start of its first key.
    ///
    /// The scanner marks a block mapping at the first `:`, while a flow
    /// mapping is marked at its `{`, which already precedes the key.
    fn place_at_first_key(&mut self, mapping: NodeId, key: NodeId) {
        let tree = self.tree();
        let key_location = tree.node(key).location;
        let node = &mut tree.nodes[mapping.0];
        let is_first = matches!(&node.kind, NodeKind::Mapping(entries) if entries.is_empty());
        if is_first && key_location < node.location {
            node.location = key_location;
        }
    }

    fn register_anchor(&mut self, anchor_id: usize, id: NodeId) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, id);
        }
    }

    fn location(mark: Marker) -> Location {
        Location::new(mark.line(), mark.col() + 1)
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        let location = Self::location(mark);
        match event {
            Event::Scalar(value, style, anchor_id, tag) => {
                let scalar = Scalar {
                    value,
                    plain: matches!(style, TScalarStyle::Plain),
                    tag: tag.and_then(core_schema_suffix),
                };
                let id = self.tree().push(NodeKind::Scalar(scalar), location);
                self.register_anchor(anchor_id, id);
                self.attach(id);
            }
            Event::SequenceStart(anchor_id, ..) => {
                let id = self.tree().push(NodeKind::Sequence(Vec::new()), location);
                self.attach(id);
                self.open.push(OpenCollection {
                    id,
                    anchor_id,
                    pending_key: None,
                });
            }
            Event::MappingStart(anchor_id, ..) => {
                let id = self.tree().push(NodeKind::Mapping(Vec::new()), location);
                self.attach(id);
                self.open.push(OpenCollection {
                    id,
                    anchor_id,
                    pending_key: None,
                });
            }
            Event::SequenceEnd | Event::MappingEnd => {
                // Anchors become visible once their node is complete, so an
                // alias can never point into its own ancestor.
                if let Some(collection) = self.open.pop() {
                    self.register_anchor(collection.anchor_id, collection.id);
                }
            }
            Event::Alias(anchor_id) => match self.anchors.get(&anchor_id).copied() {
                Some(target) => {
                    let id = self.tree().push(NodeKind::Alias(target), location);
                    self.attach(id);
                }
                None => {
                    self.error = Some(
                        Diagnostic::error("alias refers to an anchor that is not yet complete")
                            .with_code(ErrorCode::E002)
                            .with_location(location),
                    );
                }
            },
            Event::DocumentEnd => {
                let tree = self.current.take().unwrap_or_default();
                self.open.clear();
                self.anchors.clear();
                self.documents.push(tree);
            }
            _ => {}
        }
    }
}

/// Keep the suffix of core schema tags (`!!null` → `null`); drop other tags.
fn core_schema_suffix(tag: Tag) -> Option<String> {
    CORE_SCHEMA_HANDLES
        .contains(&tag.handle.as_str())
        .then_some(tag.suffix)
}

/// Load every physical document in `source`.
///
/// An empty source yields no documents. Malformed YAML is reported with the
/// scanner's message and position.
pub(crate) fn load(source: &str) -> Result<Vec<Tree>> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new_from_str(source);

    parser.load(&mut builder, true).map_err(|err| {
        let mark = *err.marker();
        Diagnostic::error(err.info().to_string())
            .with_code(ErrorCode::E001)
            .with_location(TreeBuilder::location(mark))
    })?;

    if let Some(err) = builder.error {
        return Err(err);
    }

    trace!(documents = builder.documents.len(); "Loaded YAML documents");
    Ok(builder.documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> Tree {
        let mut trees = load(source).expect("source should load");
        assert_eq!(trees.len(), 1, "expected exactly one document");
        trees.remove(0)
    }

    fn root_entries(tree: &Tree) -> Vec<(String, NodeId)> {
        let root = tree.resolve(tree.root().unwrap());
        let NodeKind::Mapping(entries) = root.kind() else {
            panic!("root is not a mapping");
        };
        tree.entries(entries)
            .unwrap()
            .into_iter()
            .map(|(key, _, value)| (key.to_string(), value))
            .collect()
    }

    #[test]
    fn test_empty_source_has_no_documents() {
        assert!(load("").unwrap().is_empty());
        assert!(load("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_multiple_documents() {
        let trees = load("a: 1\n---\nb: 2\n").unwrap();
        assert_eq!(trees.len(), 2);
    }

    #[test]
    fn test_explicit_empty_document_has_null_root() {
        let trees = load("---\n").unwrap();
        assert_eq!(trees.len(), 1);
        let root = trees[0].root().expect("empty document still has a root");
        assert!(trees[0].resolve(root).is_null());
    }

    #[test]
    fn test_locations_are_one_based() {
        let tree = single("slices:\n  first:\n    - e: Foo\n");
        let entries = root_entries(&tree);
        let (_, slices) = &entries[0];
        let NodeKind::Mapping(slice_entries) = tree.resolve(*slices).kind() else {
            panic!("slices is not a mapping");
        };
        let (key, location) = tree.key_text(slice_entries[0].0).unwrap();

        assert_eq!(key, "first");
        assert_eq!(location, Location::new(2, 3));
    }

    #[test]
    fn test_block_mapping_located_at_first_key() {
        let tree = single("- command: First\n- {e: Done}\n-   c: Spaced\n");
        let NodeKind::Sequence(items) = tree.resolve(tree.root().unwrap()).kind() else {
            panic!("root is not a sequence");
        };
        let locations: Vec<Location> = items.iter().map(|&id| tree.node(id).location()).collect();

        assert_eq!(
            locations,
            [Location::new(1, 3), Location::new(2, 3), Location::new(3, 5)]
        );
    }

    #[test]
    fn test_null_forms() {
        let tree = single("a:\nb: ~\nc: null\nd: NULL\ne: 'null'\nf: !!null x\n");
        let nulls: Vec<bool> = root_entries(&tree)
            .iter()
            .map(|(_, value)| tree.resolve(*value).is_null())
            .collect();

        assert_eq!(nulls, [true, true, true, true, false, true]);
    }

    #[test]
    fn test_alias_resolves_to_anchor() {
        let tree = single("base: &b {e: Foo}\ncopy: *b\n");
        let entries = root_entries(&tree);

        assert!(matches!(tree.node(entries[1].1).kind(), NodeKind::Alias(_)));
        assert_eq!(tree.resolve(entries[1].1), tree.resolve(entries[0].1));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let tree = single("a: 1\na: 2\n");
        let root = tree.resolve(tree.root().unwrap());
        let NodeKind::Mapping(entries) = root.kind() else {
            panic!("root is not a mapping");
        };
        let err = tree.entries(entries).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E103));
        assert_eq!(err.location().map(|l| l.line()), Some(2));
    }

    #[test]
    fn test_decode_scalars() {
        let tree = single(
            "s: text\nq: \"42\"\ni: 42\nh: 0x1F\nf: 2.5\nb: true\nn: ~\ninf: .inf\ntagged: !!str 7\n",
        );
        let values: Vec<PropValue> = root_entries(&tree)
            .iter()
            .map(|(_, value)| tree.decode(*value).unwrap())
            .collect();

        assert_eq!(values[0], PropValue::String("text".into()));
        assert_eq!(values[1], PropValue::String("42".into()));
        assert_eq!(values[2], PropValue::Integer(42));
        assert_eq!(values[3], PropValue::Integer(31));
        assert_eq!(values[4], PropValue::Float(2.5));
        assert_eq!(values[5], PropValue::Bool(true));
        assert_eq!(values[6], PropValue::Null);
        assert_eq!(values[7], PropValue::Float(f64::INFINITY));
        assert_eq!(values[8], PropValue::String("7".into()));
    }

    #[test]
    fn test_decode_composites_preserve_order() {
        let tree = single("v:\n  z: [1, two]\n  a: {k: v}\n");
        let entries = root_entries(&tree);
        let value = tree.decode(entries[0].1).unwrap();

        let PropValue::Mapping(props) = value else {
            panic!("expected a mapping");
        };
        assert_eq!(props[0].key(), "z");
        assert_eq!(
            props[0].value(),
            &PropValue::Sequence(vec![
                PropValue::Integer(1),
                PropValue::String("two".into())
            ])
        );
        assert_eq!(props[1].key(), "a");
    }

    /// Anchors `l0` to `l{depth}`, each a list of ten aliases to the previous.
    fn nested_anchors(depth: usize) -> String {
        let mut source = String::from("l0: &l0 [x, x, x, x, x, x, x, x, x, x]\n");
        for level in 1..=depth {
            let previous = format!("*l{}", level - 1);
            let items = vec![previous.as_str(); 10].join(", ");
            source.push_str(&format!("l{level}: &l{level} [{items}]\n"));
        }
        source
    }

    #[test]
    fn test_decode_reused_anchor() {
        let tree = single(&nested_anchors(2));
        let entries = root_entries(&tree);
        let PropValue::Sequence(items) = tree.decode(entries[2].1).unwrap() else {
            panic!("expected a sequence");
        };

        assert_eq!(items.len(), 10);
        assert_eq!(items[9], tree.decode(entries[1].1).unwrap());
    }

    #[test]
    fn test_decode_excessive_aliasing() {
        let tree = single(&nested_anchors(7));
        let entries = root_entries(&tree);
        let err = tree.decode(entries[7].1).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E003));
        assert!(err.location().is_some());
    }

    #[test]
    fn test_malformed_yaml_is_syntax_error() {
        let err = load("a: [1, 2\n").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E001));
        assert!(err.location().is_some());
    }
}
