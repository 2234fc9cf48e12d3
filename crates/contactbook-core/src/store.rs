//! The record store: in-memory contacts with write-through JSON persistence.
//!
//! The backing file is a snapshot, not a log. It is read once by
//! [`RecordStore::open`] and rewritten in full (atomically, see
//! [`safe_io`](crate::safe_io)) after every successful in-memory mutation.
//!
//! Reads share an `RwLock` read guard. Every mutation holds the write guard
//! across modify + persist, so "next id" and "check email, then write"
//! sequences cannot interleave with other callers.

use crate::error::{Result, StoreError};
use crate::form::ContactForm;
use crate::record::Record;
use crate::safe_io::atomic_write;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Email-collision query used by form validation.
pub trait EmailLookup {
    /// True iff no record other than `exclude_id` has exactly `email`.
    ///
    /// Comparison is case-sensitive. Pass `0` to check against every record.
    fn email_unique(&self, email: &str, exclude_id: i64) -> bool;
}

impl EmailLookup for [Record] {
    fn email_unique(&self, email: &str, exclude_id: i64) -> bool {
        !self.iter().any(|r| r.email == email && r.id != exclude_id)
    }
}

/// Outcome of a validated create/edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Stored; carries the record as persisted.
    Accepted(Record),
    /// Nothing written; the form carries its field errors.
    Rejected(ContactForm),
}

pub struct RecordStore {
    path: PathBuf,
    records: RwLock<Vec<Record>>,
}

impl RecordStore {
    /// Load every record from the backing file at `path`.
    ///
    /// There is no create-if-missing fallback: a missing file is an
    /// [`StoreError::Io`]. Content that is not a JSON array of complete
    /// records, or that repeats or uses a non-positive id, is a
    /// [`StoreError::Decode`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| StoreError::io(&path, e))?;
        let records: Vec<Record> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                StoreError::Decode {
                    path: path.clone(),
                    source,
                }
            })?;

        check_ids(&records).map_err(|msg| StoreError::Decode {
            path: path.clone(),
            source: serde::de::Error::custom(msg),
        })?;

        log::debug!("loaded {} contact(s) from {}", records.len(), path.display());

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// The backing file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All records in store order, or those matching `query`.
    ///
    /// A non-empty query keeps records where it is a case-insensitive
    /// substring of first name, last name, phone or email. Relative order is
    /// preserved.
    pub fn get_all(&self, query: Option<&str>) -> Vec<Record> {
        let records = self.read();
        match query {
            None | Some("") => records.clone(),
            Some(q) => {
                let folded = q.to_lowercase();
                records
                    .iter()
                    .filter(|r| r.matches(&folded))
                    .cloned()
                    .collect()
            }
        }
    }

    /// See [`EmailLookup::email_unique`].
    pub fn email_unique(&self, email: &str, exclude_id: i64) -> bool {
        EmailLookup::email_unique(self, email, exclude_id)
    }

    pub fn get(&self, id: i64) -> Result<Record> {
        self.read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Append `record` under a fresh id (`1 + max id`, or `1` when empty).
    ///
    /// Fails with [`StoreError::IdsExhausted`] when the max id is `i64::MAX`;
    /// nothing is appended in that case.
    ///
    /// Any id already on `record` is ignored. Email uniqueness is NOT checked
    /// here; use [`submit_new`](Self::submit_new) for that. If persisting
    /// fails the record stays in memory and the error is returned.
    pub fn insert(&self, record: Record) -> Result<Record> {
        let mut records = self.write();
        self.insert_locked(&mut records, record)
    }

    /// Replace the record carrying `record.id` wholesale.
    pub fn update(&self, record: Record) -> Result<()> {
        let mut records = self.write();
        self.update_locked(&mut records, record)
    }

    /// Remove the record with `id`, keeping the order of the rest.
    pub fn delete(&self, id: i64) -> Result<()> {
        let mut records = self.write();
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        records.remove(index);
        self.persist(&records)
    }

    /// Validate `form` as a new contact and insert it if valid.
    ///
    /// Validation and insert run under one write lock, so two concurrent
    /// submissions can't both claim the same email.
    pub fn submit_new(&self, mut form: ContactForm) -> Result<Submission> {
        let mut records = self.write();
        if !form.validate(records.as_slice(), 0) {
            return Ok(Submission::Rejected(form));
        }
        let record = self.insert_locked(&mut records, form.to_record(0))?;
        Ok(Submission::Accepted(record))
    }

    /// Validate `form` as an edit of `id` and store it if valid.
    ///
    /// The form replaces every field; merge with the stored record first
    /// (see [`ContactForm::from_record`]) to change only some of them.
    pub fn submit_edit(&self, id: i64, mut form: ContactForm) -> Result<Submission> {
        let mut records = self.write();
        if !records.iter().any(|r| r.id == id) {
            return Err(StoreError::NotFound(id));
        }
        if !form.validate(records.as_slice(), id) {
            return Ok(Submission::Rejected(form));
        }
        let record = form.to_record(id);
        self.update_locked(&mut records, record.clone())?;
        Ok(Submission::Accepted(record))
    }

    fn insert_locked(&self, records: &mut Vec<Record>, mut record: Record) -> Result<Record> {
        record.id = next_id(records)?;
        records.push(record.clone());
        self.persist(records)?;
        log::debug!("inserted contact {}", record.id);
        Ok(record)
    }

    fn update_locked(&self, records: &mut [Record], record: Record) -> Result<()> {
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        *slot = record;
        self.persist(records)
    }

    /// Rewrite the backing file with the full snapshot.
    fn persist(&self, records: &[Record]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records).map_err(StoreError::Encode)?;
        atomic_write(&self.path, &json).map_err(|e| {
            log::warn!("failed to persist {}: {}", self.path.display(), e);
            StoreError::io(&self.path, e)
        })?;
        log::debug!(
            "persisted {} contact(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    // Mutations leave the vector valid before persisting, so a poisoned
    // lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl EmailLookup for RecordStore {
    fn email_unique(&self, email: &str, exclude_id: i64) -> bool {
        self.read().as_slice().email_unique(email, exclude_id)
    }
}

fn next_id(records: &[Record]) -> Result<i64> {
    let max = records.iter().map(|r| r.id).max().unwrap_or(0);
    max.checked_add(1).ok_or(StoreError::IdsExhausted(max))
}

fn check_ids(records: &[Record]) -> std::result::Result<(), String> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.id < 1 {
            return Err(format!("contact id {} is not positive", record.id));
        }
        if !seen.insert(record.id) {
            return Err(format!("contact id {} appears more than once", record.id));
        }
    }
    Ok(())
}
