//! Document order.
//!
//! Files are ordered lexicographically by path; within a file elements are
//! ordered by start line, start column, end line, end column and finally by
//! kind. This is a total order over elements with distinct positions.

use std::cmp::Ordering;

use crate::Element;

/// Compares two elements by document order.
pub fn document_order(a: &Element, b: &Element) -> Ordering {
    a.file_path
        .cmp(&b.file_path)
        .then_with(|| a.range.cmp(&b.range))
        .then_with(|| a.kind.cmp(&b.kind))
}

/// Sorts elements into document order.
///
/// The sort is stable, so elements that compare equal keep the order the
/// extractor emitted them in.
pub fn sort_document_order(elements: &mut [Element]) {
    elements.sort_by(document_order);
}

/// Replaces every element of `file_path` with `replacement` and restores
/// document order.
///
/// This is the single-file fast path: the extractor re-parses one file and
/// the rest of the workspace sequence is reused as-is.
pub fn splice_file(
    elements: Vec<Element>,
    file_path: &str,
    replacement: Vec<Element>,
) -> Vec<Element> {
    let mut merged: Vec<Element> = elements
        .into_iter()
        .filter(|element| element.file_path != file_path)
        .collect();
    merged.extend(replacement);
    sort_document_order(&mut merged);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, Range};
    use pretty_assertions::assert_eq;

    fn sentence(path: &str, line: u32, text: &str) -> Element {
        Element::new(
            ElementKind::Sentence,
            text,
            path,
            Range::from_coords(line, 0, line, text.len() as u32),
        )
    }

    fn contents(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn test_sort_by_path_then_position() {
        let mut elements = vec![
            sentence("b.tex", 0, "b0"),
            sentence("a.tex", 5, "a5"),
            sentence("a.tex", 1, "a1"),
        ];

        sort_document_order(&mut elements);

        assert_eq!(contents(&elements), vec!["a1", "a5", "b0"]);
    }

    #[test]
    fn test_kind_breaks_position_ties() {
        let range = Range::from_coords(2, 0, 2, 9);
        let mut elements = vec![
            Element::new(ElementKind::Sentence, "text", "a.tex", range),
            Element::new(ElementKind::Section, "Intro", "a.tex", range),
        ];

        sort_document_order(&mut elements);

        assert_eq!(elements[0].kind, ElementKind::Section);
        assert_eq!(elements[1].kind, ElementKind::Sentence);
    }

    #[test]
    fn test_end_position_breaks_start_ties() {
        let mut elements = vec![
            Element::new(ElementKind::Sentence, "long", "a.tex", Range::from_coords(1, 0, 3, 0)),
            Element::new(ElementKind::Sentence, "short", "a.tex", Range::from_coords(1, 0, 1, 5)),
        ];

        sort_document_order(&mut elements);

        assert_eq!(contents(&elements), vec!["short", "long"]);
    }

    #[test]
    fn test_splice_file_replaces_only_that_file() {
        let elements = vec![
            sentence("a.tex", 0, "a0"),
            sentence("b.tex", 0, "old b0"),
            sentence("b.tex", 1, "old b1"),
            sentence("c.tex", 0, "c0"),
        ];
        let replacement = vec![sentence("b.tex", 3, "new b3"), sentence("b.tex", 0, "new b0")];

        let merged = splice_file(elements, "b.tex", replacement);

        assert_eq!(contents(&merged), vec!["a0", "new b0", "new b3", "c0"]);
    }

    #[test]
    fn test_splice_file_adds_new_file() {
        let elements = vec![sentence("a.tex", 0, "a0"), sentence("c.tex", 0, "c0")];

        let merged = splice_file(elements, "b.tex", vec![sentence("b.tex", 0, "b0")]);

        assert_eq!(contents(&merged), vec!["a0", "b0", "c0"]);
    }

    #[test]
    fn test_splice_file_with_empty_replacement_drops_file() {
        let elements = vec![sentence("a.tex", 0, "a0"), sentence("b.tex", 0, "b0")];

        let merged = splice_file(elements, "b.tex", Vec::new());

        assert_eq!(contents(&merged), vec!["a0"]);
    }
}
