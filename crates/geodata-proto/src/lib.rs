//! Geodata record model.
//!
//! This crate defines the types every other geodata crate exchanges: scalar
//! [`Value`]s and field-map [`Record`]s, plus the reserved field names the
//! store maintains.
//!
//! # Modules
//!
//! - [`value`] - Scalar values (string, integer, decimal, boolean, timestamp, null)
//! - [`record`] - Field-map records and reserved field names
//! - [`error`] - Conversion error types

pub mod error;
pub mod record;
pub mod value;

pub use error::Error;
pub use record::{Record, FIELD_CREATE_DATE, FIELD_ID, FIELD_IS_ACTIVE, FIELD_MODIFY_DATE};
pub use value::Value;

/// Load a JSON array of objects into records.
pub fn records_from_json(json: &serde_json::Value) -> Result<Vec<Record>, Error> {
    let array = json
        .as_array()
        .ok_or_else(|| Error::Deserialization("expected a JSON array of records".into()))?;
    array.iter().map(Record::from_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_from_json() {
        let json = serde_json::json!([
            {"alpha2Code": "US", "name": "United States"},
            {"alpha2Code": "CA", "name": "Canada"}
        ]);
        let records = records_from_json(&json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("name"), Some(&Value::from("Canada")));
    }

    #[test]
    fn test_records_from_json_requires_array() {
        assert!(records_from_json(&serde_json::json!({"alpha2Code": "US"})).is_err());
    }
}
