//! The Person record and request-body decoding.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A person record. `id` is `None` until the store first persists it.
/// `name` and `email` carry no constraints and may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Person {
    /// Transient record with no id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Person {
            id: None,
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }

    /// Decode a request body. A non-object body, or a field of the wrong type (non-integer
    /// `id`, non-string `name`/`email`), is a bad request. Missing fields are null.
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        if !body.is_object() {
            return Err(AppError::BadRequest("body must be a JSON object".into()));
        }
        serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("invalid person: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transient_until_id_assigned() {
        let p = Person::new("Bob", "bob@example.com");
        assert!(p.is_transient());
        assert!(!p.with_id(3).is_transient());
    }

    #[test]
    fn serializes_unset_id_as_null() {
        let v = serde_json::to_value(Person::new("Bob", "bob@example.com")).unwrap();
        assert_eq!(v, json!({"id": null, "name": "Bob", "email": "bob@example.com"}));
    }

    #[test]
    fn body_without_id_is_transient() {
        let p = Person::from_body(json!({"name": "Alice", "email": "alice@example.com"})).unwrap();
        assert_eq!(p, Person::new("Alice", "alice@example.com"));
    }

    #[test]
    fn body_id_is_kept_as_upsert_key() {
        let p = Person::from_body(json!({"id": 7, "name": "Alice", "email": "a@x"})).unwrap();
        assert_eq!(p.id, Some(7));
        let p = Person::from_body(json!({"id": null, "name": "Alice", "email": "a@x"})).unwrap();
        assert_eq!(p.id, None);
    }

    #[test]
    fn missing_or_null_fields_are_accepted() {
        let p = Person::from_body(json!({"name": "Alice"})).unwrap();
        assert_eq!(p.name.as_deref(), Some("Alice"));
        assert_eq!(p.email, None);

        let p = Person::from_body(json!({"name": null, "email": null})).unwrap();
        assert_eq!(p, Person::default());

        assert_eq!(Person::from_body(json!({})).unwrap(), Person::default());
    }

    #[test]
    fn malformed_bodies_are_bad_requests() {
        for body in [
            json!([1, 2]),
            json!("Alice"),
            json!({"name": 1, "email": "a@x"}),
            json!({"id": "seven", "name": "Alice", "email": "a@x"}),
            json!({"id": 1.5, "name": "Alice", "email": "a@x"}),
        ] {
            assert!(matches!(Person::from_body(body), Err(AppError::BadRequest(_))));
        }
    }
}
