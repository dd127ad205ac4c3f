//! Terminal punctuation rule.
//!
//! Flags sentences that do not end with `.`, `!`, `?`, `:`, `;` or an
//! ellipsis. Closing quotes and brackets after the mark are allowed.
//!
//! # Example
//!
//! ```text
//! The results are shown below     <- flagged
//! The results are shown below.    <- ok
//! He said "stop."                 <- ok
//! ```

use draftlint_ast::ElementKind;
use draftlint_cache::{DiagnosticRecord, IdentifiedDocument, RecheckPolicy, RecheckSet};

use crate::Rule;

const RULE_ID: &str = "punctuation";

const TERMINALS: &[char] = &['.', '!', '?', ':', ';', '…'];
const CLOSERS: &[char] = &['"', '\'', '”', '’', ')', ']', '}', '»'];

/// Checks that sentences end with terminal punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Punctuation;

impl Rule for Punctuation {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn description(&self) -> &'static str {
        "Sentences must end with terminal punctuation"
    }

    fn policy(&self) -> RecheckPolicy {
        RecheckPolicy::Local {
            kinds: &[ElementKind::Sentence],
        }
    }

    fn check(&self, doc: &IdentifiedDocument, targets: &RecheckSet) -> Vec<DiagnosticRecord> {
        super::targets(doc, targets)
            .filter(|(_, element)| element.kind == ElementKind::Sentence)
            .filter(|(_, element)| !is_terminated(&element.content))
            .map(|(key, element)| {
                DiagnosticRecord::new(
                    key,
                    element,
                    RULE_ID,
                    "Sentence is missing terminal punctuation.",
                )
            })
            .collect()
    }
}

/// Returns true if `text` ends with terminal punctuation. Empty text has
/// nothing to terminate.
fn is_terminated(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    trimmed
        .trim_end_matches(CLOSERS)
        .ends_with(TERMINALS)
}
