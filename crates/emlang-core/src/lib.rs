//! Emlang Core Types and Definitions
//!
//! This crate provides the immutable domain model produced by the Emlang
//! grammar validator and consumed by layout, linting, formatting and export.
//! It includes:
//!
//! - **Elements**: Typed modeling steps ([`element::Element`], [`element::ElementType`])
//! - **Slices**: Named step sequences with attached tests ([`slice::Slice`], [`slice::Test`])
//! - **Documents**: Per-document and merged slice collections ([`document::Document`])
//! - **Values**: Free-form property values ([`value::PropValue`])

pub mod document;
pub mod element;
pub mod slice;
pub mod value;

pub use document::{Document, SubDoc};
pub use element::{Element, ElementType, UnknownElementType};
pub use slice::{Slice, Test};
pub use value::{PropEntry, PropValue};
