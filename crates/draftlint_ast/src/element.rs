//! Extracted document elements.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Range;

/// Kinds of structural elements produced by the extractor.
///
/// The declaration order is the final tie-breaker of document order, so
/// variants must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ElementKind {
    /// `\chapter{...}` heading.
    Chapter,
    /// `\section{...}` heading.
    Section,
    /// `\subsection{...}` heading.
    Subsection,
    /// `\subsubsection{...}` heading.
    Subsubsection,
    /// Document title.
    Title,
    /// One sentence of running text.
    Sentence,
    /// Display equation.
    Equation,
    /// Figure float.
    Figure,
    /// Table float.
    Table,
    /// Any other environment.
    Environment,
}

impl ElementKind {
    /// All kinds, in declaration order.
    pub const ALL: [ElementKind; 10] = [
        ElementKind::Chapter,
        ElementKind::Section,
        ElementKind::Subsection,
        ElementKind::Subsubsection,
        ElementKind::Title,
        ElementKind::Sentence,
        ElementKind::Equation,
        ElementKind::Figure,
        ElementKind::Table,
        ElementKind::Environment,
    ];

    /// Returns true for headings that open a section of the hierarchy.
    #[inline]
    pub const fn is_section(&self) -> bool {
        matches!(
            self,
            ElementKind::Chapter
                | ElementKind::Section
                | ElementKind::Subsection
                | ElementKind::Subsubsection
        )
    }

    /// Nesting depth of a section heading; `None` for other kinds.
    ///
    /// Smaller is higher in the hierarchy.
    #[inline]
    pub const fn section_level(&self) -> Option<u8> {
        match self {
            ElementKind::Chapter => Some(0),
            ElementKind::Section => Some(1),
            ElementKind::Subsection => Some(2),
            ElementKind::Subsubsection => Some(3),
            _ => None,
        }
    }

    /// Stable lowercase name, used in element keys.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Chapter => "chapter",
            ElementKind::Section => "section",
            ElementKind::Subsection => "subsection",
            ElementKind::Subsubsection => "subsubsection",
            ElementKind::Title => "title",
            ElementKind::Sentence => "sentence",
            ElementKind::Equation => "equation",
            ElementKind::Figure => "figure",
            ElementKind::Table => "table",
            ElementKind::Environment => "environment",
        }
    }

    /// Parses the name produced by [`ElementKind::as_str`].
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted unit of document structure.
///
/// Elements are immutable for the lifetime of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Kind of element.
    pub kind: ElementKind,

    /// Text content, with markup already stripped by the extractor.
    pub content: String,

    /// Workspace-relative path of the source file.
    pub file_path: String,

    /// Location in the source file.
    pub range: Range,

    /// Extractor-specific attributes (caption, label, environment name...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Element {
    /// Creates a new element without metadata.
    pub fn new(
        kind: ElementKind,
        content: impl Into<String>,
        file_path: impl Into<String>,
        range: Range,
    ) -> Self {
        Self {
            kind,
            content: content.into(),
            file_path: file_path.into(),
            range,
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns a metadata entry as a string, if it is one.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ElementKind::Chapter, Some(0))]
    #[case(ElementKind::Section, Some(1))]
    #[case(ElementKind::Subsection, Some(2))]
    #[case(ElementKind::Subsubsection, Some(3))]
    #[case(ElementKind::Title, None)]
    #[case(ElementKind::Sentence, None)]
    #[case(ElementKind::Figure, None)]
    fn test_section_level(#[case] kind: ElementKind, #[case] level: Option<u8>) {
        assert_eq!(kind.section_level(), level);
        assert_eq!(kind.is_section(), level.is_some());
    }

    #[test]
    fn test_kind_name_roundtrip() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ElementKind::parse("paragraph"), None);
    }

    #[test]
    fn test_element_metadata() {
        let element = Element::new(
            ElementKind::Figure,
            "",
            "main.tex",
            Range::from_coords(3, 0, 8, 12),
        )
        .with_metadata("caption", json!("Overview"))
        .with_metadata("label", json!(null));

        assert_eq!(element.metadata_str("caption"), Some("Overview"));
        assert_eq!(element.metadata_str("label"), None);
        assert_eq!(element.metadata_str("missing"), None);
    }

    #[test]
    fn test_element_deserialization() {
        let json = r#"{
            "kind": "Sentence",
            "content": "A is fine.",
            "filePath": "chapters/intro.tex",
            "range": {"start": {"line": 4, "column": 0}, "end": {"line": 4, "column": 10}}
        }"#;

        let element: Element = serde_json::from_str(json).unwrap();

        assert_eq!(element.kind, ElementKind::Sentence);
        assert_eq!(element.file_path, "chapters/intro.tex");
        assert_eq!(element.range, Range::from_coords(4, 0, 4, 10));
        assert!(element.metadata.is_empty());
    }
}
