//! contactbook-core: file-backed contact record store.
//!
//! Holds the full contact collection in memory, searches it by substring,
//! and rewrites the backing JSON file after every mutation.
//!
//! # Quick Start
//!
//! ```no_run
//! use contactbook_core::{Record, RecordStore};
//!
//! fn main() -> contactbook_core::Result<()> {
//!     let store = RecordStore::open("data/contacts.json")?;
//!     let ada = store.insert(Record::new("Ada", "Lovelace", "555-0100", "ada@x.io"))?;
//!     assert!(!store.email_unique("ada@x.io", 0));
//!     println!("{} matches", store.get_all(Some("love")).len());
//!     store.delete(ada.id)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod form;
pub mod record;
pub mod safe_io;
pub mod store;
pub mod validator;

pub use config::{Config, ConfigError};
pub use error::{Result, StoreError};
pub use form::ContactForm;
pub use record::Record;
pub use store::{EmailLookup, RecordStore, Submission};
pub use validator::FieldErrors;

/// Shared test helpers for store-backed tests across modules.
#[cfg(test)]
pub(crate) mod test_support {
    use crate::record::Record;
    use crate::store::RecordStore;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write `records` as a backing file inside a fresh temp dir.
    ///
    /// Returns `(path, TempDir)`; the `TempDir` must outlive any store using the path.
    pub(crate) fn backing_file(records: &[Record]) -> (PathBuf, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.json");
        fs::write(&path, serde_json::to_vec(records).unwrap()).unwrap();
        (path, temp_dir)
    }

    /// Open a store over an empty backing file.
    pub(crate) fn empty_store() -> (RecordStore, TempDir) {
        let (path, temp_dir) = backing_file(&[]);
        (RecordStore::open(&path).unwrap(), temp_dir)
    }

    pub(crate) fn ada() -> Record {
        Record::new("Ada", "Lovelace", "555-0100", "ada@x.io")
    }

    pub(crate) fn alan() -> Record {
        Record::new("Alan", "Turing", "555-0200", "alan@x.io")
    }
}
