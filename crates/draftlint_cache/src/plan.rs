//! Recheck planning.
//!
//! Each check family declares how far an edit's blast radius reaches. The
//! planner turns a [`ChangeSet`] into the set of element keys the family
//! must recompute; everything else is replayed from cache. A `None` change
//! set means there is no usable baseline, and every family recomputes all
//! elements of the kinds it checks.
//!
//! Planning is pure and total: it never fails and never touches storage.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use draftlint_ast::ElementKind;
use tracing::debug;

use crate::classify::is_outline;
use crate::{ChangeSet, ElementKey, IdentifiedDocument};

/// Dependency shape of a deterministic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecheckPolicy {
    /// Verdict depends only on the element itself.
    Local {
        /// Kinds the check inspects.
        kinds: &'static [ElementKind],
    },
    /// Verdict of a section heading depends on the sentences under it in
    /// the same file.
    FileAggregate,
    /// Verdict of a sentence depends on every sentence before it in
    /// document order.
    OrderDependent,
}

/// Keys a family must recompute in this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecheckSet {
    keys: BTreeSet<ElementKey>,
    start_index: Option<usize>,
}

impl RecheckSet {
    /// Creates a set without an ordered start.
    pub fn new(keys: BTreeSet<ElementKey>) -> Self {
        Self {
            keys,
            start_index: None,
        }
    }

    /// Target keys.
    pub fn keys(&self) -> &BTreeSet<ElementKey> {
        &self.keys
    }

    /// Returns true if `key` must be recomputed.
    pub fn contains(&self, key: &ElementKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing must be recomputed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// For order-dependent plans, the index into the ordered sentence
    /// sequence from which every sentence is rechecked.
    pub fn start_index(&self) -> Option<usize> {
        self.start_index
    }
}

/// Plans a deterministic check according to its policy.
pub fn plan(
    policy: RecheckPolicy,
    doc: &IdentifiedDocument,
    changes: Option<&ChangeSet>,
) -> RecheckSet {
    match policy {
        RecheckPolicy::Local { kinds } => plan_local(doc, changes, kinds),
        RecheckPolicy::FileAggregate => plan_file_aggregate(doc, changes),
        RecheckPolicy::OrderDependent => plan_order_dependent(doc, changes),
    }
}

/// `added ∩ kinds`: an unrelated edit never invalidates a local check.
pub fn plan_local(
    doc: &IdentifiedDocument,
    changes: Option<&ChangeSet>,
    kinds: &[ElementKind],
) -> RecheckSet {
    let keys = match changes {
        None => doc.keys_where(|kind| kinds.contains(&kind)),
        Some(changes) => changes
            .added_where(|kind| kinds.contains(&kind))
            .cloned()
            .collect(),
    };
    RecheckSet::new(keys)
}

/// Section-kind elements whose sentence count may have changed.
///
/// Any removal is treated as a structural change of unknown shape: it can
/// shrink a section without that section's key changing, so every section
/// in the workspace is rechecked. Without removals, only sections in files
/// whose outline (headings and sentences in order) differs from the
/// baseline are rechecked. That covers added sentences, added headings and
/// sentences moved between sections.
pub fn plan_file_aggregate(doc: &IdentifiedDocument, changes: Option<&ChangeSet>) -> RecheckSet {
    let all_sections = || doc.keys_where(|kind| kind.is_section());

    let keys = match changes {
        None => all_sections(),
        Some(changes) if !changes.removed.is_empty() => all_sections(),
        Some(changes) => {
            let touched_files = reshaped_files(doc, changes);

            doc.keys()
                .iter()
                .filter(|key| key.kind().is_section())
                .filter(|key| touched_files.contains(key.file_path()) || changes.added.contains(*key))
                .cloned()
                .collect()
        }
    };
    RecheckSet::new(keys)
}

/// Files whose ordered outline differs between the baseline and now.
fn reshaped_files<'a>(doc: &'a IdentifiedDocument, changes: &'a ChangeSet) -> HashSet<&'a str> {
    let current = outline_by_file(doc.keys().iter().filter(|key| is_outline(key.kind())));
    let baseline = outline_by_file(changes.baseline_outline.iter());

    current
        .keys()
        .chain(baseline.keys())
        .filter(|file| current.get(**file) != baseline.get(**file))
        .copied()
        .collect()
}

fn outline_by_file<'a>(
    keys: impl Iterator<Item = &'a ElementKey>,
) -> BTreeMap<&'a str, Vec<&'a ElementKey>> {
    let mut files: BTreeMap<&'a str, Vec<&'a ElementKey>> = BTreeMap::new();
    for key in keys {
        files.entry(key.file_path()).or_default().push(key);
    }
    files
}

/// Every sentence from the first one whose verdict may differ.
///
/// The start is 0 when a sentence was deleted, because a deletion can move
/// the first occurrence of a term to a later sentence. An edited sentence
/// is a removal too, but it is replaced in place: when the first point
/// where the old and new sentence orders diverge holds a new sentence, the
/// start is that point, or the first sentence that is not unchanged if
/// that comes earlier. The result is always a suffix of the ordered
/// sentence sequence.
pub fn plan_order_dependent(doc: &IdentifiedDocument, changes: Option<&ChangeSet>) -> RecheckSet {
    let sentences: Vec<&ElementKey> = doc.sentences().map(|(key, _)| key).collect();

    let start_index = match changes {
        None => 0,
        Some(changes) if deletes_at_divergence(&sentences, doc, changes) => 0,
        Some(changes) => {
            let divergence = divergence(&sentences, &changes.baseline_sentences);
            sentences
                .iter()
                .position(|key| !changes.unchanged.contains(*key))
                .unwrap_or(sentences.len())
                .min(divergence)
        }
    };

    debug!(
        "Order-dependent recheck starts at sentence {} of {}",
        start_index,
        sentences.len()
    );

    RecheckSet {
        keys: sentences[start_index..].iter().map(|key| (*key).clone()).collect(),
        start_index: Some(start_index),
    }
}

/// Length of the common prefix of the new and old sentence orders.
fn divergence(current: &[&ElementKey], baseline: &[ElementKey]) -> usize {
    current
        .iter()
        .zip(baseline)
        .take_while(|(new, old)| **new == *old)
        .count()
}

/// Returns true if the old sentence at the divergence point was deleted
/// rather than replaced: it is gone, and its slot now holds a sentence that
/// already existed (or nothing).
fn deletes_at_divergence(
    current: &[&ElementKey],
    doc: &IdentifiedDocument,
    changes: &ChangeSet,
) -> bool {
    if !changes.removed_any(|kind| kind == ElementKind::Sentence) {
        return false;
    }

    let at = divergence(current, &changes.baseline_sentences);
    let Some(old) = changes.baseline_sentences.get(at) else {
        return false;
    };
    !doc.contains(old)
        && current
            .get(at)
            .is_none_or(|new| changes.unchanged.contains(*new))
}

/// Sentences not covered by a content-addressed family's baseline.
///
/// `baseline_keys` is `None` when the family snapshot is absent or was
/// produced under a different configuration signature; every sentence is
/// then a target.
pub fn plan_content_addressed(
    doc: &IdentifiedDocument,
    baseline_keys: Option<&BTreeSet<ElementKey>>,
) -> RecheckSet {
    let keys = doc
        .sentences()
        .map(|(key, _)| key)
        .filter(|key| baseline_keys.is_none_or(|baseline| !baseline.contains(*key)))
        .cloned()
        .collect();
    RecheckSet::new(keys)
}
