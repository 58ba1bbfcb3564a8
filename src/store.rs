//! # Persisted record-set ("masterfile") adapter.
//!
//! Translates between durable storage and the in-memory [`RecordSet`] the
//! resolution service answers from. The supervisor calls [`load`] at most
//! once per process lifetime; persistence of updates belongs to whoever
//! writes the file, not to this crate.
//!
//! A missing file is a valid, expected state (fresh install) and is
//! reported as [`LoadOutcome::NotFound`], not as an error. A file that
//! exists but fails to deserialize yields [`StoreError::Parse`], which the
//! supervisor treats like a listen-time fault.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A single name-resolution record.
///
/// The shape is opaque to the supervision logic; it only needs the set to
/// round-trip through the on-disk document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Fully qualified owner name.
    pub name: String,
    /// Record type mnemonic ("A", "AAAA", "CNAME", ...).
    #[serde(rename = "type")]
    pub record_type: String,
    /// Textual record data.
    pub value: String,
    /// Time to live, in seconds.
    #[serde(default)]
    pub ttl: u32,
}

/// The authoritative set of records the service answers queries from.
///
/// Installed wholesale via
/// [`NameService::install_records`](crate::service::NameService::install_records);
/// never merged or patched incrementally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// The records, in file order.
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Number of records in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of a load attempt against an existing, readable path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file existed and deserialized cleanly.
    Loaded(RecordSet),
    /// No file at the path; the service starts with no installed set.
    NotFound,
}

/// Loads the record set from `path`.
///
/// Opens the file with shared read access so a concurrent writer outside
/// this process is not blocked. Distinguishes three outcomes:
///
/// - missing file → `Ok(LoadOutcome::NotFound)`
/// - readable, well-formed file → `Ok(LoadOutcome::Loaded(set))`
/// - anything else → `Err(StoreError)`, a fault for the supervisor
pub fn load(path: &Path) -> Result<LoadOutcome, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::NotFound),
        Err(e) => return Err(StoreError::Io(e)),
    };
    let set: RecordSet = serde_json::from_str(&raw)?;
    Ok(LoadOutcome::Loaded(set))
}
