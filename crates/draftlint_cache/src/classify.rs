//! Change classification.
//!
//! Edits are modeled as replace, not update: an element whose content
//! changed gets a new key, so it shows up as `added` while its old key shows
//! up as `removed`.

use std::collections::{BTreeMap, BTreeSet};

use draftlint_ast::ElementKind;
use tracing::debug;

use crate::{ElementKey, ElementRecord, ElementSnapshot, IdentifiedDocument};

/// Elements a cached result set was computed against.
pub type Baseline = BTreeMap<ElementKey, ElementRecord>;

/// Difference between the current document and a baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Keys present in both, with matching stored hash.
    pub unchanged: BTreeSet<ElementKey>,
    /// Keys only valid in the current document.
    pub added: BTreeSet<ElementKey>,
    /// Keys only present in the baseline.
    pub removed: BTreeSet<ElementKey>,
    /// Sentence keys of the baseline in document order.
    pub baseline_sentences: Vec<ElementKey>,
    /// Sentence and section-kind keys of the baseline in document order.
    pub baseline_outline: Vec<ElementKey>,
}

impl ChangeSet {
    /// Returns true if nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Returns true if any removed key has a kind matching `predicate`.
    pub fn removed_any(&self, predicate: impl Fn(ElementKind) -> bool) -> bool {
        self.removed.iter().any(|key| predicate(key.kind()))
    }

    /// Added keys whose kind matches `predicate`.
    pub fn added_where<'a>(
        &'a self,
        predicate: impl Fn(ElementKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a ElementKey> + 'a {
        self.added.iter().filter(move |key| predicate(key.kind()))
    }
}

/// Classifies every current key against a baseline.
///
/// A baseline record whose stored hash disagrees with its key is not
/// trusted: the matching current element counts as `added`.
pub fn classify(current: &IdentifiedDocument, baseline: &Baseline) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for key in current.keys() {
        match baseline.get(key) {
            Some(record) if record.hash == key.hash() => {
                changes.unchanged.insert(key.clone());
            }
            _ => {
                changes.added.insert(key.clone());
            }
        }
    }

    changes.removed = baseline
        .keys()
        .filter(|key| !current.contains(key))
        .cloned()
        .collect();

    let mut outline: Vec<(&ElementKey, &ElementRecord)> = baseline
        .iter()
        .filter(|(key, _)| is_outline(key.kind()))
        .collect();
    outline.sort_by(|(_, a), (_, b)| (&a.file_path, a.range).cmp(&(&b.file_path, b.range)));
    changes.baseline_outline = outline.into_iter().map(|(key, _)| key.clone()).collect();
    changes.baseline_sentences = changes
        .baseline_outline
        .iter()
        .filter(|key| key.kind() == ElementKind::Sentence)
        .cloned()
        .collect();

    debug!(
        "Classified {} elements: {} unchanged, {} added, {} removed",
        current.len(),
        changes.unchanged.len(),
        changes.added.len(),
        changes.removed.len()
    );

    changes
}

/// Kinds whose order shapes section contents.
pub(crate) fn is_outline(kind: ElementKind) -> bool {
    kind == ElementKind::Sentence || kind.is_section()
}

/// Restricts an element snapshot to the keys a family's diagnostics cover.
///
/// Returns `None` when a covered key is missing from the element snapshot:
/// the two files are out of sync, and the family must be recomputed from
/// scratch because removals can no longer be detected.
pub fn family_baseline(
    elements: &ElementSnapshot,
    baseline_keys: &BTreeSet<ElementKey>,
) -> Option<Baseline> {
    let mut baseline = Baseline::new();
    for key in baseline_keys {
        match elements.elements.get(key) {
            Some(record) => {
                baseline.insert(key.clone(), record.clone());
            }
            None => {
                debug!("Baseline key {} missing from element snapshot", key);
                return None;
            }
        }
    }
    Some(baseline)
}
