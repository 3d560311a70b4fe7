//! Slices and the behavioral tests attached to them.

use indexmap::IndexMap;

use crate::element::Element;

/// A named unit of behavior.
///
/// Both source forms (a bare element list, or a mapping with `steps` and
/// `tests`) produce this one shape. A slice with no elements is a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slice {
    name: String,
    elements: Vec<Element>,
    tests: IndexMap<String, Test>,
}

impl Slice {
    pub fn new(name: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            elements,
            tests: IndexMap::new(),
        }
    }

    /// Create a placeholder slice with no elements.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Set the attached tests (builder style).
    pub fn with_tests(mut self, tests: IndexMap<String, Test>) -> Self {
        self.tests = tests;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The steps of the slice, in source order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Attached tests, in source order.
    pub fn tests(&self) -> &IndexMap<String, Test> {
        &self.tests
    }

    pub fn is_placeholder(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_tests(&self) -> bool {
        !self.tests.is_empty()
    }
}

/// A given/when/then scenario attached to a slice.
///
/// Each section keeps a presence flag next to its elements: a key present
/// with no elements is distinct from an absent key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Test {
    name: String,
    given: Option<Vec<Element>>,
    when: Option<Vec<Element>>,
    then: Option<Vec<Element>>,
}

impl Test {
    /// Create a test with no sections.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Mark the `given` section present with the given elements.
    pub fn with_given(mut self, elements: Vec<Element>) -> Self {
        self.given = Some(elements);
        self
    }

    /// Mark the `when` section present with the given elements.
    pub fn with_when(mut self, elements: Vec<Element>) -> Self {
        self.when = Some(elements);
        self
    }

    /// Mark the `then` section present with the given elements.
    pub fn with_then(mut self, elements: Vec<Element>) -> Self {
        self.then = Some(elements);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Preconditions: events and views.
    pub fn given(&self) -> &[Element] {
        self.given.as_deref().unwrap_or_default()
    }

    /// The action under test: commands.
    pub fn when(&self) -> &[Element] {
        self.when.as_deref().unwrap_or_default()
    }

    /// Expected outcomes: events, views and exceptions.
    pub fn then(&self) -> &[Element] {
        self.then.as_deref().unwrap_or_default()
    }

    pub fn has_given(&self) -> bool {
        self.given.is_some()
    }

    pub fn has_when(&self) -> bool {
        self.when.is_some()
    }

    pub fn has_then(&self) -> bool {
        self.then.is_some()
    }
}
