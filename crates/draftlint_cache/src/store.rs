//! Double-buffered snapshot persistence.
//!
//! Every snapshot family has a `current` slot (the latest completed run) and
//! a `previous` slot. A run that recomputes a family first calls
//! [`SnapshotStore::promote`], then diffs against `previous` while `current`
//! is overwritten as the run makes progress.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::entry::Versioned;
use crate::{CacheError, DiagnosticSnapshot, ElementSnapshot};

/// Independently cached diagnostic families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticFamily {
    /// Deterministic rules.
    Logic,
    /// Model-backed review.
    Review,
}

impl DiagnosticFamily {
    /// All families.
    pub const ALL: [DiagnosticFamily; 2] = [DiagnosticFamily::Logic, DiagnosticFamily::Review];

    /// Name used in file names and reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiagnosticFamily::Logic => "logic",
            DiagnosticFamily::Review => "llm",
        }
    }
}

impl fmt::Display for DiagnosticFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted snapshot family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotFamily {
    /// The element sequence.
    Elements,
    /// One diagnostic family.
    Diagnostics(DiagnosticFamily),
}

/// One of the two buffers of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Latest completed (or in-progress) run.
    Current,
    /// State immediately before the run now executing.
    Previous,
}

impl SnapshotFamily {
    /// File name backing a slot.
    pub fn file_name(&self, slot: Slot) -> String {
        let stem = match self {
            SnapshotFamily::Elements => "elements".to_string(),
            SnapshotFamily::Diagnostics(family) => format!("diagnostics-{}", family.as_str()),
        };
        match slot {
            Slot::Current => format!("{}.json", stem),
            Slot::Previous => format!("{}.prev.json", stem),
        }
    }
}

/// Raw storage for snapshot files.
pub trait SnapshotBackend: Send + Sync {
    /// Reads a file; `Ok(None)` if it does not exist.
    fn read(&self, name: &str) -> Result<Option<String>, CacheError>;

    /// Replaces a file. Readers must never observe partial content.
    fn write(&self, name: &str, contents: &str) -> Result<(), CacheError>;

    /// Removes every file.
    fn clear(&self) -> Result<(), CacheError>;

    /// Copies `from` over `to`; returns false if `from` does not exist.
    fn copy(&self, from: &str, to: &str) -> Result<bool, CacheError> {
        match self.read(from)? {
            Some(contents) => {
                self.write(to, &contents)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Snapshot files in a workspace-scoped directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    dir: PathBuf,
}

impl FsBackend {
    /// Creates a backend rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotBackend for FsBackend {
    fn read(&self, name: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.dir.join(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, contents: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;

        // Write next to the target so the final rename stays on one filesystem.
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)?;
        file.write_all(contents.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.dir.join(name))
            .map_err(|e| CacheError::write(name, e.error.to_string()))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                info!("Removed cache directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Snapshot files held in memory.
///
/// Writes can be made to fail on demand to exercise persist-failure paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Overwrites a file directly, bypassing failure injection.
    pub fn insert_raw(&self, name: impl Into<String>, contents: impl Into<String>) {
        self.files.lock().insert(name.into(), contents.into());
    }

    /// Reads a file directly.
    pub fn raw(&self, name: &str) -> Option<String> {
        self.files.lock().get(name).cloned()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self, name: &str) -> Result<Option<String>, CacheError> {
        Ok(self.files.lock().get(name).cloned())
    }

    fn write(&self, name: &str, contents: &str) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::write(name, "writes disabled"));
        }
        self.files.lock().insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.files.lock().clear();
        Ok(())
    }
}

impl<B: SnapshotBackend + ?Sized> SnapshotBackend for Box<B> {
    fn read(&self, name: &str) -> Result<Option<String>, CacheError> {
        (**self).read(name)
    }

    fn write(&self, name: &str, contents: &str) -> Result<(), CacheError> {
        (**self).write(name, contents)
    }

    fn clear(&self) -> Result<(), CacheError> {
        (**self).clear()
    }

    fn copy(&self, from: &str, to: &str) -> Result<bool, CacheError> {
        (**self).copy(from, to)
    }
}

impl<B: SnapshotBackend + ?Sized> SnapshotBackend for std::sync::Arc<B> {
    fn read(&self, name: &str) -> Result<Option<String>, CacheError> {
        (**self).read(name)
    }

    fn write(&self, name: &str, contents: &str) -> Result<(), CacheError> {
        (**self).write(name, contents)
    }

    fn clear(&self) -> Result<(), CacheError> {
        (**self).clear()
    }

    fn copy(&self, from: &str, to: &str) -> Result<bool, CacheError> {
        (**self).copy(from, to)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionHeader {
    format_version: Option<u32>,
}

/// Typed access to snapshot families.
///
/// The store is the only owner of persisted snapshots; loads hand out
/// copies. Loads never fail: anything unreadable, unparsable or written by
/// a different format version is reported as absent.
#[derive(Debug)]
pub struct SnapshotStore<B> {
    backend: B,
}

impl<B: SnapshotBackend> SnapshotStore<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the current element snapshot.
    pub fn load_elements(&self) -> Option<ElementSnapshot> {
        self.load_slot(SnapshotFamily::Elements, Slot::Current)
    }

    /// Loads the element snapshot from before the running analysis.
    pub fn load_previous_elements(&self) -> Option<ElementSnapshot> {
        self.load_slot(SnapshotFamily::Elements, Slot::Previous)
    }

    /// Saves the current element snapshot.
    pub fn save_elements(&self, snapshot: &ElementSnapshot) -> Result<(), CacheError> {
        self.save_slot(SnapshotFamily::Elements, snapshot)
    }

    /// Loads a family's current diagnostic snapshot.
    pub fn load_diagnostics(&self, family: DiagnosticFamily) -> Option<DiagnosticSnapshot> {
        self.load_slot(SnapshotFamily::Diagnostics(family), Slot::Current)
    }

    /// Loads a family's diagnostic snapshot from before the running analysis.
    pub fn load_previous_diagnostics(
        &self,
        family: DiagnosticFamily,
    ) -> Option<DiagnosticSnapshot> {
        self.load_slot(SnapshotFamily::Diagnostics(family), Slot::Previous)
    }

    /// Saves a family's current diagnostic snapshot.
    pub fn save_diagnostics(
        &self,
        family: DiagnosticFamily,
        snapshot: &DiagnosticSnapshot,
    ) -> Result<(), CacheError> {
        self.save_slot(SnapshotFamily::Diagnostics(family), snapshot)
    }

    /// Copies `current` to `previous`. A missing `current` is not an error
    /// and leaves `previous` untouched.
    pub fn promote(&self, family: SnapshotFamily) -> Result<(), CacheError> {
        let copied = self
            .backend
            .copy(&family.file_name(Slot::Current), &family.file_name(Slot::Previous))?;
        if !copied {
            debug!("Nothing to promote for {:?}", family);
        }
        Ok(())
    }

    /// Deletes every snapshot.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.backend.clear()
    }

    /// Loads one slot of a family, treating every failure as absence.
    pub fn load_slot<T: Versioned>(&self, family: SnapshotFamily, slot: Slot) -> Option<T> {
        let name = family.file_name(slot);

        let contents = match self.backend.read(&name) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("Snapshot {} is absent", name);
                return None;
            }
            Err(e) => {
                debug!("Snapshot {} is unreadable: {}", name, e);
                return None;
            }
        };

        match serde_json::from_str::<VersionHeader>(&contents) {
            Ok(VersionHeader {
                format_version: Some(version),
            }) if version == T::FORMAT_VERSION => {}
            Ok(header) => {
                debug!(
                    "Snapshot {} has format version {:?}, expected {}",
                    name,
                    header.format_version,
                    T::FORMAT_VERSION
                );
                return None;
            }
            Err(e) => {
                debug!("Snapshot {} is corrupted: {}", name, e);
                return None;
            }
        }

        match serde_json::from_str(&contents) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Snapshot {} is corrupted: {}", name, e);
                None
            }
        }
    }

    /// Saves the current slot of a family.
    pub fn save_slot<T: Versioned>(
        &self,
        family: SnapshotFamily,
        snapshot: &T,
    ) -> Result<(), CacheError> {
        let name = family.file_name(Slot::Current);
        let contents = serde_json::to_string(snapshot)?;
        self.backend.write(&name, &contents)?;
        debug!("Saved snapshot {} ({} bytes)", name, contents.len());
        Ok(())
    }
}
