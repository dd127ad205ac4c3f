//! Persisted snapshot types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use draftlint_ast::{Element, ElementKind, Range, sort_document_order};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{ContentHash, ElementKey, IdentifiedDocument};

/// Format version of [`ElementSnapshot`] files.
pub const ELEMENT_SNAPSHOT_VERSION: u32 = 1;

/// Format version of [`DiagnosticSnapshot`] files.
pub const DIAGNOSTIC_SNAPSHOT_VERSION: u32 = 1;

/// A snapshot type with a format version.
///
/// Files whose version differs from [`Versioned::FORMAT_VERSION`] are
/// treated as absent.
pub trait Versioned: Serialize + DeserializeOwned {
    /// Version written by, and accepted by, this build.
    const FORMAT_VERSION: u32;
}

/// Seconds since the Unix epoch.
pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// One element as recorded in an [`ElementSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    /// Content hash at the time of the snapshot.
    pub hash: ContentHash,

    /// Source file.
    pub file_path: String,

    /// Element kind.
    pub kind: ElementKind,

    /// Location at the time of the snapshot.
    pub range: Range,

    /// Text content.
    pub content: String,

    /// Extractor metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ElementRecord {
    /// Records an element.
    pub fn from_element(element: &Element) -> Self {
        Self {
            hash: ContentHash::of(&element.content),
            file_path: element.file_path.clone(),
            kind: element.kind,
            range: element.range,
            content: element.content.clone(),
            metadata: element.metadata.clone(),
        }
    }

    /// Rebuilds the element.
    pub fn to_element(&self) -> Element {
        Element {
            kind: self.kind,
            content: self.content.clone(),
            file_path: self.file_path.clone(),
            range: self.range,
            metadata: self.metadata.clone(),
        }
    }
}

/// The whole workspace as last successfully analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// File format version.
    pub format_version: u32,

    /// Creation time in seconds since the Unix epoch.
    pub generated_at: u64,

    /// Recorded elements by key.
    pub elements: BTreeMap<ElementKey, ElementRecord>,
}

impl Versioned for ElementSnapshot {
    const FORMAT_VERSION: u32 = ELEMENT_SNAPSHOT_VERSION;
}

impl ElementSnapshot {
    /// Captures an identified document.
    pub fn from_document(doc: &IdentifiedDocument) -> Self {
        Self {
            format_version: ELEMENT_SNAPSHOT_VERSION,
            generated_at: now_secs(),
            elements: doc
                .iter()
                .map(|(key, element)| (key.clone(), ElementRecord::from_element(element)))
                .collect(),
        }
    }

    /// Number of recorded elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Rebuilds the element sequence in document order.
    pub fn to_elements(&self) -> Vec<Element> {
        let mut elements: Vec<Element> =
            self.elements.values().map(ElementRecord::to_element).collect();
        sort_document_order(&mut elements);
        elements
    }
}

/// Severity level for diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    Error,
    /// Warning - should be reviewed.
    #[default]
    Warning,
    /// Info - informational message.
    Info,
    /// Hint - low-priority suggestion.
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        })
    }
}

/// A finding anchored to the element that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    /// Source file.
    pub file_path: String,

    /// Location of the finding.
    pub range: Range,

    /// Human-readable message.
    pub message: String,

    /// Severity level.
    #[serde(default)]
    pub severity: Severity,

    /// Producer of the finding (`draftlint` or a reviewer provider).
    pub source: String,

    /// Rule id.
    pub code: String,

    /// Key of the element the finding is valid for.
    pub element_key: ElementKey,
}

impl DiagnosticRecord {
    /// Default `source` for deterministic rules.
    pub const DEFAULT_SOURCE: &'static str = "draftlint";

    /// Creates a warning anchored to an element, covering the whole element.
    pub fn new(
        key: &ElementKey,
        element: &Element,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file_path: element.file_path.clone(),
            range: element.range,
            message: message.into(),
            severity: Severity::Warning,
            source: Self::DEFAULT_SOURCE.to_string(),
            code: code.into(),
            element_key: key.clone(),
        }
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the producer.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// One family's diagnostics plus the element keys they are valid against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSnapshot {
    /// File format version.
    pub format_version: u32,

    /// Creation time in seconds since the Unix epoch.
    pub generated_at: u64,

    /// Cached findings.
    pub diagnostics: Vec<DiagnosticRecord>,

    /// Elements these diagnostics were computed against, including elements
    /// without any finding.
    pub baseline_keys: BTreeSet<ElementKey>,

    /// Signature of the settings the diagnostics were produced with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_signature: Option<String>,
}

impl Versioned for DiagnosticSnapshot {
    const FORMAT_VERSION: u32 = DIAGNOSTIC_SNAPSHOT_VERSION;
}

impl DiagnosticSnapshot {
    /// Creates a snapshot stamped with the current time.
    pub fn new(
        diagnostics: Vec<DiagnosticRecord>,
        baseline_keys: BTreeSet<ElementKey>,
        config_signature: Option<String>,
    ) -> Self {
        Self {
            format_version: DIAGNOSTIC_SNAPSHOT_VERSION,
            generated_at: now_secs(),
            diagnostics,
            baseline_keys,
            config_signature,
        }
    }

    /// Returns true if the snapshot was produced under `signature`.
    pub fn matches_signature(&self, signature: Option<&str>) -> bool {
        self.config_signature.as_deref() == signature
    }

    /// Cached findings produced by one rule.
    pub fn records_for<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a DiagnosticRecord> {
        self.diagnostics.iter().filter(move |record| record.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify;
    use draftlint_ast::Range;
    use pretty_assertions::assert_eq;

    fn doc() -> IdentifiedDocument {
        identify(vec![
            Element::new(
                ElementKind::Section,
                "Intro",
                "a.tex",
                Range::from_coords(0, 0, 0, 16),
            ),
            Element::new(
                ElementKind::Sentence,
                "A is fine.",
                "a.tex",
                Range::from_coords(1, 0, 1, 10),
            )
            .with_metadata("paragraph", serde_json::json!(1)),
        ])
    }

    #[test]
    fn test_element_snapshot_roundtrips_elements() {
        let doc = doc();
        let snapshot = ElementSnapshot::from_document(&doc);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.format_version, ELEMENT_SNAPSHOT_VERSION);
        assert_eq!(snapshot.to_elements(), doc.elements().to_vec());
    }

    #[test]
    fn test_element_snapshot_json_shape() {
        let snapshot = ElementSnapshot::from_document(&doc());
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["formatVersion"], 1);
        assert!(json["generatedAt"].as_u64().unwrap() > 1_577_836_800);

        let record = &json["elements"][doc().keys()[1].to_string()];
        assert_eq!(record["filePath"], "a.tex");
        assert_eq!(record["kind"], "Sentence");
        assert_eq!(record["content"], "A is fine.");
        assert_eq!(record["hash"], ContentHash::of("A is fine.").to_string());
        assert_eq!(record["metadata"]["paragraph"], 1);
    }

    #[test]
    fn test_diagnostic_record_anchors_to_element() {
        let doc = doc();
        let (key, element) = doc.iter().nth(1).unwrap();

        let record = DiagnosticRecord::new(key, element, "punctuation", "msg")
            .with_severity(Severity::Error)
            .with_source("reviewer");

        assert_eq!(record.file_path, "a.tex");
        assert_eq!(record.range, element.range);
        assert_eq!(&record.element_key, key);
        assert_eq!(record.severity, Severity::Error);
        assert_eq!(record.source, "reviewer");
    }

    #[test]
    fn test_diagnostic_snapshot_deserialization_defaults() {
        let key = doc().keys()[1].to_string();
        let json = format!(
            r#"{{
                "formatVersion": 1,
                "generatedAt": 1700000000,
                "diagnostics": [{{
                    "filePath": "a.tex",
                    "range": {{"start": {{"line": 1, "column": 0}}, "end": {{"line": 1, "column": 10}}}},
                    "message": "m",
                    "source": "draftlint",
                    "code": "punctuation",
                    "elementKey": "{key}"
                }}],
                "baselineKeys": ["{key}"]
            }}"#
        );

        let snapshot: DiagnosticSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot.diagnostics[0].severity, Severity::Warning);
        assert_eq!(snapshot.config_signature, None);
        assert!(snapshot.matches_signature(None));
        assert!(!snapshot.matches_signature(Some("sig")));
        assert_eq!(snapshot.baseline_keys.len(), 1);
    }

    #[test]
    fn test_records_for_filters_by_code() {
        let doc = doc();
        let (key, element) = doc.iter().nth(1).unwrap();
        let snapshot = DiagnosticSnapshot::new(
            vec![
                DiagnosticRecord::new(key, element, "punctuation", "a"),
                DiagnosticRecord::new(key, element, "abbreviation", "b"),
            ],
            doc.key_set(),
            None,
        );

        let messages: Vec<&str> = snapshot
            .records_for("abbreviation")
            .map(|r| r.message.as_str())
            .collect();
        assert_eq!(messages, vec!["b"]);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::default(), Severity::Warning);
    }
}
