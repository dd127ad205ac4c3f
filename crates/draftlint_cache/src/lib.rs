//! # draftlint_cache
//!
//! Incremental analysis cache for draftlint.
//!
//! After an edit, this crate decides which previously computed diagnostics
//! can be reused verbatim and which must be recomputed.
//!
//! ## Cache Strategy
//!
//! 1. **Content-addressed identity**: every element gets an [`ElementKey`]
//!    built from its file, kind, content hash and occurrence index
//! 2. **Replace, not update**: [`classify`] diffs keys into unchanged,
//!    added and removed sets
//! 3. **Per-family blast radius**: the functions in [`mod@plan`] turn a change set
//!    into recheck targets for local, file-aggregate, order-dependent and
//!    content-addressed checks
//! 4. **Replay with drift repair**: [`merge`] keeps still-valid cached
//!    records and moves them onto their element's current range
//!
//! ## Storage
//!
//! Snapshots are versioned JSON files kept as `current`/`previous` pairs by
//! [`SnapshotStore`]. Loads fail soft: a missing, corrupt or stale snapshot
//! is simply absent, which makes the caller fall back to a full recompute.

mod classify;
pub mod entry;
mod error;
mod identity;
mod merge;
pub mod plan;
pub mod store;

pub use classify::{Baseline, ChangeSet, classify, family_baseline};
pub use entry::{
    DiagnosticRecord, DiagnosticSnapshot, ElementRecord, ElementSnapshot, Severity, Versioned,
};
pub use error::CacheError;
pub use identity::{ContentHash, ElementKey, IdentifiedDocument, identify};
pub use merge::{merge, replay};
pub use plan::{RecheckPolicy, RecheckSet, plan};
pub use store::{
    DiagnosticFamily, FsBackend, MemoryBackend, SnapshotBackend, SnapshotFamily, SnapshotStore,
    Slot,
};
