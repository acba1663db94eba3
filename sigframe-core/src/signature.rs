//! Versioned signature record.
//!
//! Every edit replaces the record behind a fresh `Arc` and bumps the version, so renderers and
//! the export worker read a consistent [`Snapshot`] without locking.

use std::sync::Arc;

use log::trace;
use sigframe_utils::SignatureRecord;

use crate::geometry::CropParameters;

/// Immutable view of the record at one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: u64,
    pub record: Arc<SignatureRecord>,
}

impl Snapshot {
    pub fn crop_parameters(&self) -> CropParameters {
        CropParameters::from(&self.record.headshot)
    }
}

/// Owner of the editable record.
#[derive(Debug, Clone)]
pub struct SignatureStore {
    version: u64,
    record: Arc<SignatureRecord>,
}

impl SignatureStore {
    pub fn new(mut record: SignatureRecord) -> Self {
        record.sanitize();
        Self {
            version: 0,
            record: Arc::new(record),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn record(&self) -> &SignatureRecord {
        &self.record
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            record: Arc::clone(&self.record),
        }
    }

    /// Apply `edit` to a copy of the record and publish it as a new version.
    ///
    /// Snapshots taken earlier keep seeing the old record.
    pub fn update<F>(&mut self, edit: F) -> Snapshot
    where
        F: FnOnce(&mut SignatureRecord),
    {
        let mut next = (*self.record).clone();
        edit(&mut next);
        next.sanitize();
        self.record = Arc::new(next);
        self.version += 1;
        trace!("Signature record now at version {}", self.version);
        self.snapshot()
    }

    /// Replace the whole record.
    pub fn replace(&mut self, record: SignatureRecord) -> Snapshot {
        self.update(|current| *current = record)
    }
}

impl Default for SignatureStore {
    fn default() -> Self {
        Self::new(SignatureRecord::default())
    }
}
