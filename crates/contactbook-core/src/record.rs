//! The contact record and its search predicate.

use serde::{Deserialize, Serialize};

/// A single contact entry.
///
/// Identity is the `id`; two records are the same contact when their ids match.
/// The store assigns ids on insert, so a freshly built record carries `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub first: String,
    pub last: String,
    pub phone: String,
    pub email: String,
}

impl Record {
    /// Build an unsaved record (id `0`).
    pub fn new(
        first: impl Into<String>,
        last: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            first: first.into(),
            last: last.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// True if `folded_query` is a substring of any searchable field.
    ///
    /// The query must already be lowercased; fields are lowercased here.
    pub fn matches(&self, folded_query: &str) -> bool {
        [&self.first, &self.last, &self.phone, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(folded_query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grace() -> Record {
        Record {
            id: 7,
            first: "Grace".to_string(),
            last: "Hopper".to_string(),
            phone: "555-0199".to_string(),
            email: "Grace@Navy.mil".to_string(),
        }
    }

    #[test]
    fn test_new_record_is_unsaved() {
        let record = Record::new("a", "b", "c", "d");
        assert_eq!(record.id, 0);
        assert_eq!(record.email, "d");
    }

    #[test]
    fn test_matches_each_field() {
        let record = grace();
        assert!(record.matches("gra"));
        assert!(record.matches("hop"));
        assert!(record.matches("0199"));
        assert!(record.matches("navy.mil"));
    }

    #[test]
    fn test_matches_is_case_insensitive_on_fields() {
        assert!(grace().matches("grace@navy"));
    }

    #[test]
    fn test_matches_substring_only() {
        let record = grace();
        assert!(!record.matches("grace hopper"));
        assert!(!record.matches("turing"));
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(grace()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "first": "Grace",
                "last": "Hopper",
                "phone": "555-0199",
                "email": "Grace@Navy.mil",
            })
        );
    }

    #[test]
    fn test_deserialize_requires_all_fields() {
        let result: Result<Record, _> = serde_json::from_str(r#"{"id": 1, "first": "A"}"#);
        assert!(result.is_err());
    }
}
