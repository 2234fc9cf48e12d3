//! Contact submissions: untyped key/value decoding and validation.
//!
//! Front ends hand over whatever field pairs they received (form posts,
//! `key=value` arguments). [`ContactForm::decode`] maps each known key
//! through [`FIELDS`]; unknown keys are dropped.

use crate::record::Record;
use crate::store::EmailLookup;
use crate::validator::{FieldErrors, not_blank};
use std::collections::HashSet;

type Setter = fn(&mut ContactForm, String);

/// External field name -> setter.
pub const FIELDS: &[(&str, Setter)] = &[
    ("first", set_first),
    ("last", set_last),
    ("phone", set_phone),
    ("email", set_email),
];

fn set_first(form: &mut ContactForm, value: String) {
    form.first = value;
}

fn set_last(form: &mut ContactForm, value: String) {
    form.last = value;
}

fn set_phone(form: &mut ContactForm, value: String) {
    form.phone = value;
}

fn set_email(form: &mut ContactForm, value: String) {
    form.email = value;
}

/// A submitted contact plus the validation errors found for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub first: String,
    pub last: String,
    pub phone: String,
    pub email: String,
    pub errors: FieldErrors,
}

impl ContactForm {
    /// Build a form from raw field pairs.
    pub fn decode<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        form.apply(pairs);
        form
    }

    /// Prefill from a stored record, as an edit view does.
    pub fn from_record(record: &Record) -> Self {
        Self {
            first: record.first.clone(),
            last: record.last.clone(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            errors: FieldErrors::new(),
        }
    }

    /// Overwrite fields named in `pairs`. The first occurrence of a key wins.
    pub fn apply<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut seen = HashSet::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let Some((name, setter)) = FIELDS.iter().find(|(name, _)| *name == key) else {
                log::debug!("ignoring unknown form field '{}'", key);
                continue;
            };
            if seen.insert(*name) {
                setter(self, value.into());
            }
        }
    }

    /// Run every rule, replacing any previous errors. Returns [`is_valid`](Self::is_valid).
    ///
    /// `exclude_id` is the record being edited, or `0` for a new contact.
    pub fn validate<L: EmailLookup + ?Sized>(&mut self, lookup: &L, exclude_id: i64) -> bool {
        self.errors.clear();
        self.errors
            .check(not_blank(&self.email), "email", "Email is required.");
        self.errors.check(
            lookup.email_unique(&self.email, exclude_id),
            "email",
            "Email is already in use.",
        );
        self.errors
            .check(not_blank(&self.first), "first", "First name is required.");
        self.errors
            .check(not_blank(&self.last), "last", "Last name is required.");
        self.errors
            .check(not_blank(&self.phone), "phone", "Phone is required.");
        self.is_valid()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The record this form describes, carrying `id`.
    pub fn to_record(&self, id: i64) -> Record {
        Record {
            id,
            first: self.first.clone(),
            last: self.last.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}
