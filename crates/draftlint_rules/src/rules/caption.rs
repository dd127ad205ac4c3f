//! Caption rule.
//!
//! Flags figures and tables whose `caption` metadata is missing or blank.

use draftlint_ast::ElementKind;
use draftlint_cache::{DiagnosticRecord, IdentifiedDocument, RecheckPolicy, RecheckSet};

use crate::Rule;

const RULE_ID: &str = "caption";

/// Checks that figures and tables carry a caption.
#[derive(Debug, Clone, Copy, Default)]
pub struct Caption;

impl Rule for Caption {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn description(&self) -> &'static str {
        "Figures and tables must have a caption"
    }

    fn policy(&self) -> RecheckPolicy {
        RecheckPolicy::Local {
            kinds: &[ElementKind::Figure, ElementKind::Table],
        }
    }

    fn check(&self, doc: &IdentifiedDocument, targets: &RecheckSet) -> Vec<DiagnosticRecord> {
        super::targets(doc, targets)
            .filter_map(|(key, element)| {
                let label = match element.kind {
                    ElementKind::Figure => "Figure",
                    ElementKind::Table => "Table",
                    _ => return None,
                };
                let captioned = element
                    .metadata_str("caption")
                    .is_some_and(|caption| !caption.trim().is_empty());
                (!captioned).then(|| {
                    DiagnosticRecord::new(key, element, RULE_ID, format!("{label} has no caption."))
                })
            })
            .collect()
    }
}
