//! Grammar validator for Emlang documents.
//!
//! This module walks the located node tree of one YAML document (see
//! [`yaml`](super::yaml)) and builds a [`SubDoc`]. Validation is fail-fast:
//! the first violation is returned as a [`Diagnostic`] carrying the location
//! of the offending node, and errors from nested positions are prefixed with
//! their path (`slice "a": tests: test "b": given: ...`).

use indexmap::IndexMap;
use log::trace;

use emlang_core::{Element, ElementType, PropEntry, Slice, SubDoc, Test};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    location::Location,
    yaml::{Node, NodeId, NodeKind, Tree, duplicate_key},
};

/// Element types accepted in a test's `given` section.
const GIVEN_TYPES: &[ElementType] = &[ElementType::Event, ElementType::View];

/// Element types accepted in a test's `when` section.
const WHEN_TYPES: &[ElementType] = &[ElementType::Command];

/// Element types accepted in a test's `then` section.
const THEN_TYPES: &[ElementType] = &[
    ElementType::Event,
    ElementType::View,
    ElementType::Exception,
];

/// Why an element name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameError {
    /// Nothing but whitespace.
    Empty,
    /// The name ends with the swimlane separator.
    TrailingSlash,
    /// A swimlane is given but nothing follows the separator.
    EmptyAfterSwimlane,
}

/// Split a raw element name into `(swimlane, name)`.
///
/// The name is trimmed, then split on the first `/`. Both parts are trimmed
/// again. The swimlane may be empty (`"/Foo"` has swimlane `""`), but the
/// name never is.
pub(crate) fn parse_element_name(raw: &str) -> std::result::Result<(String, String), NameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.ends_with('/') {
        return Err(NameError::TrailingSlash);
    }

    let (swimlane, name) = match trimmed.split_once('/') {
        Some((swimlane, name)) => (swimlane.trim(), name.trim()),
        None => ("", trimmed),
    };
    // Unreachable through the checks above for well-formed text; kept so
    // the returned pair upholds "swimlane implies name" on its own.
    if !swimlane.is_empty() && name.is_empty() {
        return Err(NameError::EmptyAfterSwimlane);
    }
    Ok((swimlane.to_string(), name.to_string()))
}

/// Build the sub-document for one physical YAML document.
///
/// A document without content, or with a null root, contributes an empty
/// sub-document.
pub(crate) fn build_sub_doc(tree: &Tree) -> Result<SubDoc> {
    let mut sub_doc = SubDoc::new();
    let Some(root) = tree.root() else {
        return Ok(sub_doc);
    };
    let node = tree.resolve(root);
    if node.is_null() {
        return Ok(sub_doc);
    }
    let NodeKind::Mapping(entries) = node.kind() else {
        return Err(unexpected_kind("document root must be a mapping", node));
    };

    for (key, location, value) in tree.entries(entries)? {
        if key != "slices" {
            return Err(Diagnostic::error(format!("unknown top-level key `{key}`"))
                .with_code(ErrorCode::E101)
                .with_location(location)
                .with_help("the only top-level key is `slices`"));
        }
        for slice in slices(tree, value)? {
            sub_doc.insert(slice);
        }
    }

    trace!(slices = sub_doc.len(); "Validated document");
    Ok(sub_doc)
}

fn slices(tree: &Tree, id: NodeId) -> Result<Vec<Slice>> {
    let node = tree.resolve(id);
    if node.is_null() {
        return Ok(Vec::new());
    }
    let NodeKind::Mapping(entries) = node.kind() else {
        return Err(unexpected_kind("`slices` must be a mapping", node));
    };

    tree.entries(entries)?
        .into_iter()
        .map(|(name, _, value)| {
            slice(tree, name, value).map_err(|err| err.in_context(format!("slice \"{name}\"")))
        })
        .collect()
}

/// Parse a slice definition in null, direct or extended form.
fn slice(tree: &Tree, name: &str, id: NodeId) -> Result<Slice> {
    let node = tree.resolve(id);
    match node.kind() {
        NodeKind::Scalar(_) if node.is_null() => Ok(Slice::placeholder(name)),
        NodeKind::Sequence(items) => {
            if items.is_empty() {
                return Err(empty_list("slice must have at least one element", node));
            }
            Ok(Slice::new(name, element_list(tree, id)?))
        }
        NodeKind::Mapping(entries) => extended_slice(tree, name, node, entries),
        _ => Err(unexpected_kind("slice must be a sequence or a mapping", node)),
    }
}

fn extended_slice(
    tree: &Tree,
    name: &str,
    node: &Node,
    entries: &[(NodeId, NodeId)],
) -> Result<Slice> {
    let mut steps = None;
    let mut tests = IndexMap::new();

    for (key, location, value) in tree.entries(entries)? {
        match key {
            "steps" => {
                let elements = steps_list(tree, value).map_err(|err| err.in_context("steps"))?;
                steps = Some(elements);
            }
            "tests" => {
                tests = test_map(tree, value).map_err(|err| err.in_context("tests"))?;
            }
            _ => {
                return Err(Diagnostic::error(format!("unknown slice key `{key}`"))
                    .with_code(ErrorCode::E101)
                    .with_location(location)
                    .with_help("an extended slice accepts `steps` and `tests`"));
            }
        }
    }

    let Some(steps) = steps else {
        return Err(Diagnostic::error("extended slice must have `steps`")
            .with_code(ErrorCode::E102)
            .with_location(node.location())
            .with_help("use `steps: ~` for a slice that only carries tests"));
    };
    Ok(Slice::new(name, steps).with_tests(tests))
}

fn steps_list(tree: &Tree, id: NodeId) -> Result<Vec<Element>> {
    let node = tree.resolve(id);
    match node.kind() {
        NodeKind::Scalar(_) if node.is_null() => Ok(Vec::new()),
        NodeKind::Sequence(items) if items.is_empty() => {
            Err(empty_list("steps must have at least one element", node))
        }
        _ => element_list(tree, id),
    }
}

fn test_map(tree: &Tree, id: NodeId) -> Result<IndexMap<String, Test>> {
    let node = tree.resolve(id);
    if node.is_null() {
        return Ok(IndexMap::new());
    }
    let NodeKind::Mapping(entries) = node.kind() else {
        return Err(unexpected_kind("tests must be a mapping", node));
    };

    tree.entries(entries)?
        .into_iter()
        .map(|(name, _, value)| {
            let test = test(tree, name, value)
                .map_err(|err| err.in_context(format!("test \"{name}\"")))?;
            Ok((name.to_string(), test))
        })
        .collect()
}

fn test(tree: &Tree, name: &str, id: NodeId) -> Result<Test> {
    let node = tree.resolve(id);
    let mut test = Test::new(name);
    if node.is_null() {
        return Ok(test);
    }
    let NodeKind::Mapping(entries) = node.kind() else {
        return Err(unexpected_kind("test must be a mapping", node));
    };

    for (key, location, value) in tree.entries(entries)? {
        test = match key {
            "given" => test.with_given(section(tree, key, value, GIVEN_TYPES)?),
            "when" => test.with_when(section(tree, key, value, WHEN_TYPES)?),
            "then" => test.with_then(section(tree, key, value, THEN_TYPES)?),
            _ => {
                return Err(Diagnostic::error(format!("unknown test key `{key}`"))
                    .with_code(ErrorCode::E101)
                    .with_location(location)
                    .with_help("a test accepts `given`, `when` and `then`"));
            }
        };
    }
    Ok(test)
}

/// Parse a test section, rejecting element types outside `allowed`.
fn section(
    tree: &Tree,
    section: &str,
    id: NodeId,
    allowed: &[ElementType],
) -> Result<Vec<Element>> {
    if tree.resolve(id).is_null() {
        return Ok(Vec::new());
    }
    let elements = element_list(tree, id).map_err(|err| err.in_context(section))?;

    if let Some(element) = elements
        .iter()
        .find(|element| !allowed.contains(&element.element_type()))
    {
        let accepted: Vec<&str> = allowed.iter().map(ElementType::as_str).collect();
        return Err(
            Diagnostic::error(format!("{section}: {} not allowed", element.element_type()))
                .with_code(ErrorCode::E201)
                .with_location(Location::new(element.line(), element.column()))
                .with_help(format!("`{section}` accepts {}", accepted.join(", "))),
        );
    }
    Ok(elements)
}

fn element_list(tree: &Tree, id: NodeId) -> Result<Vec<Element>> {
    let node = tree.resolve(id);
    let NodeKind::Sequence(items) = node.kind() else {
        return Err(unexpected_kind("expected a sequence of elements", node));
    };
    items.iter().map(|&item| element(tree, item)).collect()
}

fn element(tree: &Tree, id: NodeId) -> Result<Element> {
    let node = tree.resolve(id);
    let NodeKind::Mapping(entries) = node.kind() else {
        return Err(unexpected_kind("element must be a mapping", node));
    };
    let location = node.location();

    let mut typed: Option<(ElementType, String, String)> = None;
    let mut props: Option<(Location, Vec<PropEntry>)> = None;

    // A repeated type key is reported as multiple type keys below.
    for (key, key_location, value) in tree.pairs(entries)? {
        if key == "props" {
            if let Some((first, _)) = &props {
                return Err(duplicate_key(key, key_location, *first));
            }
            let entries = prop_entries(tree, value).map_err(|err| err.in_context("props"))?;
            props = Some((key_location, entries));
            continue;
        }

        let Some(element_type) = ElementType::from_key(key) else {
            return Err(Diagnostic::error(format!("unknown key `{key}`"))
                .with_code(ErrorCode::E101)
                .with_location(key_location)
                .with_help("an element has one type key and an optional `props`"));
        };
        if typed.is_some() {
            return Err(Diagnostic::error("element has multiple type keys")
                .with_code(ErrorCode::E105)
                .with_location(location));
        }

        let value_node = tree.resolve(value);
        let raw = match value_node.kind() {
            NodeKind::Scalar(scalar) if scalar.is_empty() => "",
            NodeKind::Scalar(scalar) => scalar.value(),
            _ => {
                return Err(unexpected_kind("element name must be a scalar", value_node));
            }
        };
        let (swimlane, name) = parse_element_name(raw).map_err(|err| {
            let message = match err {
                NameError::Empty => format!("element {element_type} has no name"),
                NameError::TrailingSlash => "element name must not end with '/'".to_string(),
                NameError::EmptyAfterSwimlane => {
                    format!("element {element_type} has empty name after swimlane")
                }
            };
            Diagnostic::error(message)
                .with_code(ErrorCode::E200)
                .with_location(key_location)
        })?;
        typed = Some((element_type, swimlane, name));
    }

    let Some((element_type, swimlane, name)) = typed else {
        return Err(Diagnostic::error("element missing type")
            .with_code(ErrorCode::E104)
            .with_location(location)
            .with_help("add one of `t`, `c`, `e`, `x` or `v`"));
    };

    Ok(Element::new(element_type, name)
        .with_swimlane(swimlane)
        .with_props(props.map(|(_, entries)| entries).unwrap_or_default())
        .with_location(location.line(), location.column()))
}

fn prop_entries(tree: &Tree, id: NodeId) -> Result<Vec<PropEntry>> {
    let node = tree.resolve(id);
    let NodeKind::Mapping(entries) = node.kind() else {
        return Err(unexpected_kind("props must be a mapping", node));
    };

    tree.entries(entries)?
        .into_iter()
        .map(|(key, _, value)| Ok(PropEntry::new(key, tree.decode(value)?)))
        .collect()
}

fn unexpected_kind(message: &str, node: &Node) -> Diagnostic {
    Diagnostic::error(format!("{message}, found {}", node.describe()))
        .with_code(ErrorCode::E100)
        .with_location(node.location())
}

fn empty_list(message: &str, node: &Node) -> Diagnostic {
    Diagnostic::error(message)
        .with_code(ErrorCode::E106)
        .with_location(node.location())
        .with_help("use `~` for a placeholder slice")
}
