//! # draftlint_ast
//!
//! Element types for draftlint.
//!
//! The structural extractor turns LaTeX sources into a flat, ordered
//! sequence of [`Element`]s: headings, sentences, floats and environments.
//! This crate defines that sequence and its document order; it does not
//! parse anything itself.
//!
//! ## Example
//!
//! ```rust
//! use draftlint_ast::{Element, ElementKind, Range, sort_document_order};
//!
//! let mut elements = vec![
//!     Element::new(ElementKind::Sentence, "Second.", "a.tex", Range::from_coords(2, 0, 2, 7)),
//!     Element::new(ElementKind::Sentence, "First.", "a.tex", Range::from_coords(1, 0, 1, 6)),
//! ];
//! sort_document_order(&mut elements);
//! assert_eq!(elements[0].content, "First.");
//! ```

mod element;
mod order;
mod span;

pub use element::{Element, ElementKind};
pub use order::{document_order, sort_document_order, splice_file};
pub use span::{Position, Range};
