//! Model-backed review seam.
//!
//! The provider itself (prompting, response parsing, filtering) lives
//! outside this crate. The analyzer only needs a per-element call and a
//! signature of the settings that shape its output.

use draftlint_ast::Element;
use draftlint_cache::{DiagnosticRecord, ElementKey};
use serde::Serialize;

use crate::ReviewError;
use crate::config::ReviewerConfig;

/// Reviews one sentence at a time.
pub trait Reviewer: Send + Sync {
    /// Signature of the settings that shape the output. Cached results
    /// produced under another signature are discarded.
    fn signature(&self) -> String;

    /// Reviews a sentence. Returned records must be anchored to `key`.
    fn review(
        &self,
        key: &ElementKey,
        element: &Element,
    ) -> Result<Vec<DiagnosticRecord>, ReviewError>;
}

impl<R: Reviewer + ?Sized> Reviewer for Box<R> {
    fn signature(&self) -> String {
        (**self).signature()
    }

    fn review(
        &self,
        key: &ElementKey,
        element: &Element,
    ) -> Result<Vec<DiagnosticRecord>, ReviewError> {
        (**self).review(key, element)
    }
}

/// How the review queue ended.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum ReviewOutcome {
    /// Every target was visited.
    #[default]
    Completed,
    /// The run was cancelled between elements.
    Cancelled,
    /// The provider failed fatally; remaining targets were not reviewed.
    Halted(String),
}

impl ReviewOutcome {
    /// Returns true if every target was visited.
    pub fn is_completed(&self) -> bool {
        matches!(self, ReviewOutcome::Completed)
    }
}

impl ReviewerConfig {
    /// Builds a diagnostic for a reviewed sentence, attributed to this
    /// provider.
    pub fn finding(
        &self,
        key: &ElementKey,
        element: &Element,
        message: impl Into<String>,
    ) -> DiagnosticRecord {
        DiagnosticRecord::new(key, element, "review", message).with_source(&self.provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftlint_ast::{ElementKind, Range};
    use draftlint_cache::identify;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finding_is_attributed_to_provider() {
        let doc = identify(vec![Element::new(
            ElementKind::Sentence,
            "It was decided.",
            "main.tex",
            Range::from_coords(2, 0, 2, 15),
        )]);
        let (key, element) = doc.iter().next().unwrap();
        let config = ReviewerConfig {
            provider: "acme".to_string(),
            model: None,
            mode: None,
        };

        let record = config.finding(key, element, "Passive voice.");

        assert_eq!(record.source, "acme");
        assert_eq!(record.code, "review");
        assert_eq!(&record.element_key, key);
        assert_eq!(record.range, element.range);
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_value(ReviewOutcome::Completed).unwrap(),
            serde_json::json!({"status": "completed"})
        );
        assert_eq!(
            serde_json::to_value(ReviewOutcome::Halted("quota".to_string())).unwrap(),
            serde_json::json!({"status": "halted", "reason": "quota"})
        );
    }
}
