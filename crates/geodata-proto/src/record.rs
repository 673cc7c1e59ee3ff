//! Field-map record type.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::value::Value;

/// Surrogate identifier field, assigned by the store.
pub const FIELD_ID: &str = "id";

/// Soft-delete flag.
pub const FIELD_IS_ACTIVE: &str = "isActive";

/// Creation timestamp, maintained by the store.
pub const FIELD_CREATE_DATE: &str = "createDate";

/// Modification timestamp, maintained by the store.
pub const FIELD_MODIFY_DATE: &str = "modifyDate";

/// A mapping from field name to scalar value.
///
/// Field order carries no meaning. A field set to [`Value::Null`] is treated
/// the same as a missing field by [`Record::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Get a field value; null values read as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// Iterate over field names, including fields set to null.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Surrogate identifier, if the record carries one.
    pub fn id(&self) -> Option<i64> {
        self.get(FIELD_ID).and_then(Value::as_i64)
    }

    /// Set the surrogate identifier.
    pub fn set_id(&mut self, id: i64) {
        self.set(FIELD_ID, id);
    }

    /// Whether the active flag is set. Missing means inactive.
    pub fn is_active(&self) -> bool {
        self.get(FIELD_IS_ACTIVE)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Set the active flag.
    pub fn set_active(&mut self, active: bool) {
        self.set(FIELD_IS_ACTIVE, active);
    }

    /// Build a record from a JSON object. Null members are dropped.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::Deserialization(format!("expected a JSON object, got {json}")))?;

        let mut record = Record::new();
        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            let value = Value::from_json(value)
                .map_err(|e| Error::Deserialization(format!("field '{name}': {e}")))?;
            record.set(name.clone(), value);
        }
        Ok(record)
    }

    /// Convert into a JSON object, keeping null fields as JSON null.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        let mut object = serde_json::Map::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            object.insert(name.clone(), value.to_json()?);
        }
        Ok(serde_json::Value::Object(object))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_reads_as_absent() {
        let record = Record::new().with("stateCode", Value::Null).with("name", "Paris");
        assert!(record.get("stateCode").is_none());
        assert!(record.get("missing").is_none());
        assert_eq!(record.get("name"), Some(&Value::from("Paris")));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_reserved_fields() {
        let mut record = Record::new();
        assert_eq!(record.id(), None);
        assert!(!record.is_active());

        record.set_id(7);
        record.set_active(true);
        assert_eq!(record.id(), Some(7));
        assert!(record.is_active());
    }

    #[test]
    fn test_from_json_drops_nulls() {
        let json = serde_json::json!({
            "countryAlpha2": "US",
            "stateCode": null,
            "name": "Austin",
            "population": 961855,
            "latitude": 30.26715
        });
        let record = Record::from_json(&json).unwrap();

        let expected = Record::new()
            .with("countryAlpha2", "US")
            .with("name", "Austin")
            .with("population", 961855i64)
            .with("latitude", Value::Decimal(3026715, 5));
        assert_eq!(record, expected);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Record::from_json(&serde_json::json!([1, 2])).is_err());
        assert!(Record::from_json(&serde_json::json!({"tags": ["a"]})).is_err());
    }
}
