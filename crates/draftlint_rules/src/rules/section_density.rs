//! Section density rule.
//!
//! A section heading covers the sentences that follow it in the same file,
//! up to the next heading of the same or a higher level. Nested headings
//! do not end a section, so a chapter counts the sentences of all its
//! sections.
//!
//! ## Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | `minSectionSentences` | number | 2 | Minimum sentences per section |

use draftlint_ast::{Element, ElementKind};
use draftlint_cache::{
    DiagnosticRecord, IdentifiedDocument, RecheckPolicy, RecheckSet, Severity,
};

use crate::Rule;

const RULE_ID: &str = "section-density";

/// Checks that every section has enough content.
#[derive(Debug, Clone, Copy)]
pub struct SectionDensity {
    min_sentences: usize,
}

impl SectionDensity {
    /// Creates the rule with a minimum sentence count.
    pub fn new(min_sentences: usize) -> Self {
        Self { min_sentences }
    }
}

impl Default for SectionDensity {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Rule for SectionDensity {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn description(&self) -> &'static str {
        "Sections must contain a minimum number of sentences"
    }

    fn policy(&self) -> RecheckPolicy {
        RecheckPolicy::FileAggregate
    }

    fn check(&self, doc: &IdentifiedDocument, targets: &RecheckSet) -> Vec<DiagnosticRecord> {
        let elements = doc.elements();
        let mut positions: Vec<usize> = targets
            .keys()
            .iter()
            .filter_map(|key| doc.position(key))
            .collect();
        positions.sort_unstable();

        positions
            .into_iter()
            .filter_map(|index| {
                let key = doc.key_at(index)?;
                let heading = &elements[index];
                let level = heading.kind.section_level()?;
                let count = sentences_under(elements, index, level);
                (count < self.min_sentences).then(|| {
                    DiagnosticRecord::new(
                        key,
                        heading,
                        RULE_ID,
                        format!(
                            "{} '{}' has {} sentence(s); at least {} expected.",
                            capitalize(heading.kind.as_str()),
                            heading.content.trim(),
                            count,
                            self.min_sentences
                        ),
                    )
                    .with_severity(Severity::Info)
                })
            })
            .collect()
    }
}

/// Counts sentences after the heading at `index` until the section ends.
fn sentences_under(elements: &[Element], index: usize, level: u8) -> usize {
    let file_path = &elements[index].file_path;

    elements[index + 1..]
        .iter()
        .take_while(|element| {
            &element.file_path == file_path
                && element.kind.section_level().is_none_or(|other| other > level)
        })
        .filter(|element| element.kind == ElementKind::Sentence)
        .count()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
