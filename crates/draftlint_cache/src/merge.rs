//! Combining cached and fresh diagnostics.

use std::collections::BTreeSet;

use crate::{DiagnosticRecord, ElementKey, IdentifiedDocument};

/// Cached records that are still valid, moved onto current locations.
///
/// A record is kept iff its element still exists and was not a recheck
/// target. A kept record takes the current range of its element: edits
/// elsewhere in the file may have shifted it, and the key proves it is the
/// same element.
pub fn replay<'a>(
    cached: impl IntoIterator<Item = &'a DiagnosticRecord>,
    recheck: &BTreeSet<ElementKey>,
    doc: &IdentifiedDocument,
) -> Vec<DiagnosticRecord> {
    cached
        .into_iter()
        .filter(|record| !recheck.contains(&record.element_key))
        .filter_map(|record| {
            let element = doc.get(&record.element_key)?;
            let mut replayed = record.clone();
            replayed.range = element.range;
            Some(replayed)
        })
        .collect()
}

/// Replayed cached records followed by fresh ones.
///
/// No deduplication is needed: fresh records only exist for recheck
/// targets, and cached records for targets are never replayed. Records for
/// targets whose issue was fixed simply disappear.
pub fn merge<'a>(
    fresh: Vec<DiagnosticRecord>,
    cached: impl IntoIterator<Item = &'a DiagnosticRecord>,
    recheck: &BTreeSet<ElementKey>,
    doc: &IdentifiedDocument,
) -> Vec<DiagnosticRecord> {
    let mut merged = replay(cached, recheck, doc);
    merged.extend(fresh);
    merged
}
