//! Documents: the root of a parsed source.
//!
//! A source may hold several physical documents. Each one becomes a
//! [`SubDoc`]; the [`Document`] additionally keeps a merged view of all
//! slices, where a later sub-document replaces an earlier slice of the same
//! name. Sub-documents themselves are never touched by the merge.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::slice::Slice;

/// One physical document's slices, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubDoc {
    slices: IndexMap<String, Rc<Slice>>,
}

impl SubDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slice, keyed by its name.
    ///
    /// Returns the previous slice with the same name, if any. Re-inserting an
    /// existing name keeps its original position.
    pub fn insert(&mut self, slice: Slice) -> Option<Rc<Slice>> {
        self.slices.insert(slice.name().to_string(), Rc::new(slice))
    }

    /// Look up a slice by name.
    pub fn slice(&self, name: &str) -> Option<&Rc<Slice>> {
        self.slices.get(name)
    }

    /// Slice names in the order they appeared.
    pub fn slice_order(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    /// Slices in the order they appeared.
    pub fn slices(&self) -> impl Iterator<Item = &Slice> {
        self.slices.values().map(Rc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Returns `true` if any slice carries at least one test.
    pub fn has_tests(&self) -> bool {
        self.slices().any(Slice::has_tests)
    }
}

/// The result of parsing one source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    sub_docs: Vec<SubDoc>,
    slices: IndexMap<String, Rc<Slice>>,
    raw_source: String,
}

impl Document {
    /// Create an empty document for the given raw source text.
    pub fn new(raw_source: impl Into<String>) -> Self {
        Self {
            sub_docs: Vec::new(),
            slices: IndexMap::new(),
            raw_source: raw_source.into(),
        }
    }

    /// Append a sub-document and merge its slices into the document view.
    ///
    /// Merging is last-write-wins: a slice name already present is replaced
    /// by the new sub-document's slice.
    pub fn push(&mut self, sub_doc: SubDoc) {
        for (name, slice) in &sub_doc.slices {
            self.slices.insert(name.clone(), Rc::clone(slice));
        }
        self.sub_docs.push(sub_doc);
    }

    /// Sub-documents in source order.
    pub fn sub_docs(&self) -> &[SubDoc] {
        &self.sub_docs
    }

    /// Merged slices across all sub-documents.
    pub fn slices(&self) -> &IndexMap<String, Rc<Slice>> {
        &self.slices
    }

    /// Look up a slice in the merged view.
    pub fn slice(&self, name: &str) -> Option<&Rc<Slice>> {
        self.slices.get(name)
    }

    /// The source text this document was parsed from.
    pub fn raw_source(&self) -> &str {
        &self.raw_source
    }

    pub fn is_empty(&self) -> bool {
        self.sub_docs.is_empty()
    }
}
