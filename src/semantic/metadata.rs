//! Structured metadata stored next to every document.
//!
//! Metadata is a JSON object so both corpus variants can carry their own
//! keys while sharing one persistence format. `full_data` always holds a copy
//! of the complete source record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the full source record is stored.
pub const FULL_DATA_KEY: &str = "full_data";

/// Metadata for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, keeping insertion order for serialization.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Inserts any serializable value; unserializable values become `null`.
    pub fn insert_serialized<T: Serialize>(&mut self, key: &str, value: &T) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value at `key` when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn full_data(&self) -> Option<&Value> {
        self.0.get(FULL_DATA_KEY)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_read_back() {
        let mut metadata = Metadata::new();
        metadata
            .insert("district", "Kadıköy")
            .insert("id", 3)
            .insert_serialized(FULL_DATA_KEY, &json!({"name": "Park"}));

        assert_eq!(metadata.get_str("district"), Some("Kadıköy"));
        assert_eq!(metadata.get_str("id"), None);
        assert_eq!(metadata.get("id"), Some(&json!(3)));
        assert_eq!(metadata.full_data(), Some(&json!({"name": "Park"})));
    }

    #[test]
    fn test_serializes_as_plain_object_in_insertion_order() {
        let mut metadata = Metadata::new();
        metadata.insert("title", "Kanama").insert("category", "bleeding");

        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"title":"Kanama","category":"bleeding"}"#);

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["title", "category"]);
    }
}
