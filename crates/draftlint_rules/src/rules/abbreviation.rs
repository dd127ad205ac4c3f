//! Abbreviation rule.
//!
//! An acronym is a token of two or more uppercase letters, optionally
//! followed by a plural `s`. Its first occurrence in the whole document
//! must define it by putting the acronym in parentheses:
//!
//! ```text
//! We evaluate a Large Language Model (LLM).   <- defines LLM
//! The LLM is then fine-tuned.                 <- ok
//! Results on GPU clusters follow.             <- flagged: GPU undefined
//! ```
//!
//! The verdict for a sentence depends on every sentence before it, so the
//! rule walks the full sentence sequence. Sentences before the recheck
//! start are only read to seed the set of acronyms already seen.

use std::collections::HashSet;
use std::sync::LazyLock;

use draftlint_cache::{DiagnosticRecord, IdentifiedDocument, RecheckPolicy, RecheckSet};
use regex::Regex;

use crate::Rule;

const RULE_ID: &str = "abbreviation";

static ACRONYM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,})s?\b").expect("acronym pattern is valid"));

static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*([A-Z]{2,})s?\s*\)").expect("definition pattern is valid"));

/// Checks that acronyms are defined at their first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct Abbreviation;

impl Rule for Abbreviation {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn description(&self) -> &'static str {
        "Acronyms must be defined at their first occurrence"
    }

    fn policy(&self) -> RecheckPolicy {
        RecheckPolicy::OrderDependent
    }

    fn check(&self, doc: &IdentifiedDocument, targets: &RecheckSet) -> Vec<DiagnosticRecord> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut records = Vec::new();

        for (key, sentence) in doc.sentences() {
            let checked = targets.contains(key);
            let defined = definitions(&sentence.content);

            for acronym in acronyms(&sentence.content) {
                if !seen.insert(acronym) {
                    continue;
                }
                if checked && !defined.contains(acronym) {
                    records.push(DiagnosticRecord::new(
                        key,
                        sentence,
                        RULE_ID,
                        format!("Acronym '{acronym}' is used before it is defined."),
                    ));
                }
            }
        }

        records
    }
}

/// Acronyms in order of appearance, with plural `s` stripped.
fn acronyms(text: &str) -> impl Iterator<Item = &str> {
    ACRONYM
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Acronyms defined in `text`.
fn definitions(text: &str) -> HashSet<&str> {
    DEFINITION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
