//! Grid layout for sub-documents.
//!
//! [`compute_layout`] places every slice of a [`SubDoc`] on a column grid and
//! groups its elements into rows: one row per trigger swimlane, a shared main
//! row for commands and views, one row per event swimlane, and a trailing
//! tests row. The function is pure; calling it twice on the same input gives
//! equal geometry.
//!
//! [`layout_document`] does this for every sub-document of a [`Document`]
//! and tags each result with a [`DocumentId`] derived from the raw source.

use std::fmt;

use log::{debug, trace};
use sha2::{Digest, Sha256};

use emlang_core::{Document, Element, ElementType, Slice, SubDoc};

/// Number of hex characters of the source digest used in document ids.
const HASH_LEN: usize = 12;

/// The grid columns occupied by one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceColumn<'a> {
    name: &'a str,
    start: usize,
    span: usize,
}

impl<'a> SliceColumn<'a> {
    /// The slice name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The 1-based first grid column.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of columns; at least 1.
    pub fn span(&self) -> usize {
        self.span
    }
}

/// What a row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind<'a> {
    /// Triggers in the given swimlane.
    Trigger(&'a str),
    /// Commands and views from all slices.
    Main,
    /// Events and exceptions in the given swimlane.
    Event(&'a str),
    /// Tests attached to the slices.
    Tests,
}

impl<'a> RowKind<'a> {
    /// The swimlane label of the row, if it is a laned row.
    pub fn swimlane(&self) -> Option<&'a str> {
        match self {
            RowKind::Trigger(lane) | RowKind::Event(lane) => Some(*lane),
            RowKind::Main | RowKind::Tests => None,
        }
    }

    fn admits(&self, element: &Element) -> bool {
        match (self, element.element_type()) {
            (RowKind::Trigger(lane), ElementType::Trigger) => element.swimlane() == *lane,
            (RowKind::Main, ElementType::Command | ElementType::View) => true,
            (RowKind::Event(lane), ElementType::Event | ElementType::Exception) => {
                element.swimlane() == *lane
            }
            _ => false,
        }
    }
}

/// An element and its 1-based position within its own slice.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement<'a> {
    element: &'a Element,
    column: usize,
}

impl<'a> PlacedElement<'a> {
    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

/// The part of a row that falls inside one slice.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSlice<'a> {
    slice: &'a Slice,
    elements: Vec<PlacedElement<'a>>,
}

impl<'a> RowSlice<'a> {
    pub fn slice(&self) -> &'a Slice {
        self.slice
    }

    /// Matching elements in slice order. Always empty in the tests row.
    pub fn elements(&self) -> &[PlacedElement<'a>] {
        &self.elements
    }
}

/// A horizontal band of the grid, split per slice in slice order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    kind: RowKind<'a>,
    slices: Vec<RowSlice<'a>>,
}

impl<'a> Row<'a> {
    pub fn kind(&self) -> RowKind<'a> {
        self.kind
    }

    pub fn slices(&self) -> &[RowSlice<'a>] {
        &self.slices
    }
}

/// Grid geometry of one sub-document.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGeometry<'a> {
    total_columns: usize,
    has_swimlanes: bool,
    has_main_row: bool,
    has_tests_row: bool,
    slice_columns: Vec<SliceColumn<'a>>,
    trigger_lanes: Vec<&'a str>,
    event_lanes: Vec<&'a str>,
    rows: Vec<Row<'a>>,
}

impl<'a> LayoutGeometry<'a> {
    /// Lane label column (if any) plus the widths of all slices.
    pub fn total_columns(&self) -> usize {
        self.total_columns
    }

    /// Whether any element has a non-empty swimlane. When set, column 1
    /// holds the lane labels.
    pub fn has_swimlanes(&self) -> bool {
        self.has_swimlanes
    }

    pub fn has_main_row(&self) -> bool {
        self.has_main_row
    }

    pub fn has_tests_row(&self) -> bool {
        self.has_tests_row
    }

    /// Slice column ranges in slice order.
    pub fn slice_columns(&self) -> &[SliceColumn<'a>] {
        &self.slice_columns
    }

    /// Distinct trigger swimlanes in order of first appearance.
    pub fn trigger_lanes(&self) -> &[&'a str] {
        &self.trigger_lanes
    }

    /// Distinct event and exception swimlanes in order of first appearance.
    pub fn event_lanes(&self) -> &[&'a str] {
        &self.event_lanes
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[Row<'a>] {
        &self.rows
    }
}

/// Compute the grid layout of a sub-document.
pub fn compute_layout(sub_doc: &SubDoc) -> LayoutGeometry<'_> {
    let slices: Vec<&Slice> = sub_doc.slices().collect();

    let mut has_swimlanes = false;
    let mut has_main_row = false;
    let mut trigger_lanes: Vec<&str> = Vec::new();
    let mut event_lanes: Vec<&str> = Vec::new();

    for element in slices.iter().copied().flat_map(Slice::elements) {
        if element.has_swimlane() {
            has_swimlanes = true;
        }
        let lanes = match element.element_type() {
            ElementType::Trigger => &mut trigger_lanes,
            ElementType::Event | ElementType::Exception => &mut event_lanes,
            ElementType::Command | ElementType::View => {
                has_main_row = true;
                continue;
            }
        };
        if !lanes.contains(&element.swimlane()) {
            lanes.push(element.swimlane());
        }
    }

    let mut next_column = if has_swimlanes { 2 } else { 1 };
    let slice_columns: Vec<SliceColumn> = slices
        .iter()
        .map(|slice| {
            let column = SliceColumn {
                name: slice.name(),
                start: next_column,
                span: slice.elements().len().max(1),
            };
            next_column += column.span;
            column
        })
        .collect();
    let total_columns = next_column - 1;

    let has_tests_row = sub_doc.has_tests();
    let row_kinds = trigger_lanes
        .iter()
        .copied()
        .map(RowKind::Trigger)
        .chain(has_main_row.then_some(RowKind::Main))
        .chain(event_lanes.iter().copied().map(RowKind::Event))
        .chain(has_tests_row.then_some(RowKind::Tests));
    let rows: Vec<Row> = row_kinds.map(|kind| build_row(kind, &slices)).collect();

    debug!(
        slices = slices.len(),
        total_columns = total_columns,
        rows = rows.len();
        "Computed layout"
    );

    LayoutGeometry {
        total_columns,
        has_swimlanes,
        has_main_row,
        has_tests_row,
        slice_columns,
        trigger_lanes,
        event_lanes,
        rows,
    }
}

fn build_row<'a>(kind: RowKind<'a>, slices: &[&'a Slice]) -> Row<'a> {
    let slices = slices
        .iter()
        .map(|&slice| RowSlice {
            slice,
            elements: slice
                .elements()
                .iter()
                .enumerate()
                .filter(|(_, element)| kind.admits(element))
                .map(|(index, element)| PlacedElement {
                    element,
                    column: index + 1,
                })
                .collect(),
        })
        .collect();
    Row { kind, slices }
}

/// Stable identity of one sub-document's rendering.
///
/// Displays as `emlang-document-<hash>-<index>`, where the hash covers the
/// whole raw source and the index is the 0-based sub-document position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    hash: String,
    index: usize,
}

impl DocumentId {
    pub fn new(hash: impl Into<String>, index: usize) -> Self {
        Self {
            hash: hash.into(),
            index,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emlang-document-{}-{}", self.hash, self.index)
    }
}

/// First 12 hex characters of the SHA-256 digest of `raw`.
pub fn content_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..HASH_LEN].to_string()
}

/// The layout of one sub-document together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout<'a> {
    id: DocumentId,
    geometry: LayoutGeometry<'a>,
}

impl<'a> DocumentLayout<'a> {
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn geometry(&self) -> &LayoutGeometry<'a> {
        &self.geometry
    }
}

/// Lay out every sub-document of `document`, in order.
pub fn layout_document(document: &Document) -> Vec<DocumentLayout<'_>> {
    let hash = content_hash(document.raw_source());
    trace!(hash = hash.as_str(); "Computed content hash");

    document
        .sub_docs()
        .iter()
        .enumerate()
        .map(|(index, sub_doc)| DocumentLayout {
            id: DocumentId::new(hash.clone(), index),
            geometry: compute_layout(sub_doc),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use emlang_core::Test;
    use indexmap::IndexMap;
    use proptest::prelude::*;

    fn element(element_type: ElementType, swimlane: &str, name: &str) -> Element {
        Element::new(element_type, name).with_swimlane(swimlane)
    }

    fn sub_doc(slices: Vec<Slice>) -> SubDoc {
        let mut sub_doc = SubDoc::new();
        for slice in slices {
            sub_doc.insert(slice);
        }
        sub_doc
    }

    #[test]
    fn test_columns_with_swimlanes() {
        let sub_doc = sub_doc(vec![
            Slice::new(
                "a",
                vec![
                    element(ElementType::Command, "", "A1"),
                    element(ElementType::Event, "", "A2"),
                ],
            ),
            Slice::new(
                "b",
                vec![
                    element(ElementType::Trigger, "X", "B1"),
                    element(ElementType::Command, "", "B2"),
                    element(ElementType::Event, "", "B3"),
                ],
            ),
        ]);
        let geometry = compute_layout(&sub_doc);

        assert!(geometry.has_swimlanes());
        assert_eq!(geometry.total_columns(), 6);
        let columns: Vec<(&str, usize, usize)> = geometry
            .slice_columns()
            .iter()
            .map(|c| (c.name(), c.start(), c.span()))
            .collect();
        assert_eq!(columns, [("a", 2, 2), ("b", 4, 3)]);
    }

    #[test]
    fn test_columns_without_swimlanes() {
        let sub_doc = sub_doc(vec![
            Slice::new(
                "a",
                vec![
                    element(ElementType::Command, "", "A1"),
                    element(ElementType::Event, "", "A2"),
                ],
            ),
            Slice::new(
                "b",
                vec![
                    element(ElementType::Command, "", "B1"),
                    element(ElementType::Event, "", "B2"),
                    element(ElementType::View, "", "B3"),
                ],
            ),
        ]);
        let geometry = compute_layout(&sub_doc);

        assert!(!geometry.has_swimlanes());
        assert_eq!(geometry.total_columns(), 5);
        assert_eq!(geometry.slice_columns()[0].start(), 1);
        assert_eq!(geometry.slice_columns()[1].start(), 3);
    }

    #[test]
    fn test_placeholder_reserves_one_column() {
        let sub_doc = sub_doc(vec![
            Slice::placeholder("later"),
            Slice::new("a", vec![element(ElementType::Command, "", "A")]),
        ]);
        let geometry = compute_layout(&sub_doc);

        assert_eq!(geometry.total_columns(), 2);
        assert_eq!(geometry.slice_columns()[0].span(), 1);
        assert_eq!(geometry.slice_columns()[1].start(), 2);
    }

    #[test]
    fn test_lanes_in_first_appearance_order() {
        let sub_doc = sub_doc(vec![
            Slice::new(
                "a",
                vec![
                    element(ElementType::Trigger, "Customer", "T1"),
                    element(ElementType::Event, "Warehouse", "E1"),
                    element(ElementType::Trigger, "", "T2"),
                ],
            ),
            Slice::new(
                "b",
                vec![
                    element(ElementType::Exception, "Billing", "X1"),
                    element(ElementType::Trigger, "Customer", "T3"),
                    element(ElementType::Event, "Warehouse", "E2"),
                ],
            ),
        ]);
        let geometry = compute_layout(&sub_doc);

        assert_eq!(geometry.trigger_lanes(), ["Customer", ""]);
        assert_eq!(geometry.event_lanes(), ["Warehouse", "Billing"]);
        assert!(!geometry.has_main_row());
    }

    #[test]
    fn test_commands_and_views_never_contribute_lanes() {
        let sub_doc = sub_doc(vec![Slice::new(
            "a",
            vec![
                element(ElementType::Command, "Ops", "C"),
                element(ElementType::View, "Ops", "V"),
            ],
        )]);
        let geometry = compute_layout(&sub_doc);

        assert!(geometry.has_swimlanes());
        assert!(geometry.has_main_row());
        assert!(geometry.trigger_lanes().is_empty());
        assert!(geometry.event_lanes().is_empty());
    }

    #[test]
    fn test_row_grouping() {
        let mut tests = IndexMap::new();
        tests.insert("t1".to_string(), Test::new("t1"));
        let sub_doc = sub_doc(vec![
            Slice::new(
                "a",
                vec![
                    element(ElementType::Trigger, "User", "Click"),
                    element(ElementType::Command, "", "Register"),
                    element(ElementType::Event, "", "Registered"),
                ],
            )
            .with_tests(tests),
        ]);
        let geometry = compute_layout(&sub_doc);
        let kinds: Vec<RowKind> = geometry.rows().iter().map(Row::kind).collect();

        assert_eq!(
            kinds,
            [
                RowKind::Trigger("User"),
                RowKind::Main,
                RowKind::Event(""),
                RowKind::Tests
            ]
        );

        let main = &geometry.rows()[1].slices()[0];
        assert_eq!(main.elements().len(), 1);
        assert_eq!(main.elements()[0].element().name(), "Register");
        assert_eq!(main.elements()[0].column(), 2);

        let events = &geometry.rows()[2].slices()[0];
        assert_eq!(events.elements()[0].column(), 3);
        assert!(geometry.rows()[3].slices()[0].elements().is_empty());
    }

    #[test]
    fn test_empty_sub_doc() {
        let sub_doc = SubDoc::new();
        let geometry = compute_layout(&sub_doc);

        assert_eq!(geometry.total_columns(), 0);
        assert!(geometry.rows().is_empty());
    }

    #[test]
    fn test_document_ids() {
        let mut document = Document::new("slices:\n");
        document.push(SubDoc::new());
        document.push(SubDoc::new());
        let layouts = layout_document(&document);
        let hash = content_hash("slices:\n");

        assert_eq!(hash.len(), 12);
        assert_eq!(
            layouts[0].id().to_string(),
            format!("emlang-document-{hash}-0")
        );
        assert_eq!(
            layouts[1].id().to_string(),
            format!("emlang-document-{hash}-1")
        );
    }

    #[test]
    fn test_content_hash_known_value() {
        // SHA-256 of the empty string starts with e3b0c44298fc.
        assert_eq!(content_hash(""), "e3b0c44298fc");
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    fn arb_element() -> impl Strategy<Value = Element> {
        let types = prop::sample::select(ElementType::ALL.to_vec());
        let lanes = prop::sample::select(vec!["", "", "A", "B"]);
        (types, lanes, "[A-Z][a-z]{1,6}")
            .prop_map(|(element_type, lane, name)| element(element_type, lane, &name))
    }

    fn arb_sub_doc() -> impl Strategy<Value = SubDoc> {
        prop::collection::vec(prop::collection::vec(arb_element(), 0..5), 0..6).prop_map(
            |slices| {
                sub_doc(
                    slices
                        .into_iter()
                        .enumerate()
                        .map(|(i, elements)| Slice::new(format!("s{i}"), elements))
                        .collect(),
                )
            },
        )
    }

    proptest! {
        #[test]
        fn prop_columns_are_contiguous(sub_doc in arb_sub_doc()) {
            let geometry = compute_layout(&sub_doc);
            let mut expected = if geometry.has_swimlanes() { 2 } else { 1 };
            for column in geometry.slice_columns() {
                prop_assert_eq!(column.start(), expected);
                prop_assert!(column.span() >= 1);
                expected += column.span();
            }
            prop_assert_eq!(geometry.total_columns(), expected - 1);
        }

        #[test]
        fn prop_every_element_lands_in_one_row(sub_doc in arb_sub_doc()) {
            let geometry = compute_layout(&sub_doc);
            let placed: usize = geometry
                .rows()
                .iter()
                .flat_map(|row| row.slices())
                .map(|row_slice| row_slice.elements().len())
                .sum();
            let total: usize = sub_doc.slices().map(|slice| slice.elements().len()).sum();
            prop_assert_eq!(placed, total);
        }

        #[test]
        fn prop_layout_is_deterministic(sub_doc in arb_sub_doc()) {
            prop_assert_eq!(compute_layout(&sub_doc), compute_layout(&sub_doc));
        }
    }
}
