//! Transformers from the dr5hn schema into the internal record schema.

mod city;
mod country;
mod state;

pub use city::CityTransformer;
pub use country::CountryTransformer;
pub use state::StateTransformer;

use std::collections::BTreeSet;

use geodata_proto::Record;
use serde_json::{Map, Value as Json};

use crate::error::Error;

/// Converts a raw dr5hn array into internal records.
pub trait Transformer {
    /// Transform every usable entry of `raw`, dropping the rest.
    fn transform(&self, raw: &Json) -> Result<Vec<Record>, Error>;
}

/// Optional set of ISO alpha-2 country codes to keep.
pub type CountryFilter = Option<BTreeSet<String>>;

/// Iterate the objects of a raw array.
pub(crate) fn entries(raw: &Json) -> Result<impl Iterator<Item = Result<&Map<String, Json>, Error>>, Error> {
    let array = raw
        .as_array()
        .ok_or_else(|| Error::InvalidData("expected a JSON array".into()))?;
    Ok(array.iter().enumerate().map(|(i, entry)| {
        entry
            .as_object()
            .ok_or_else(|| Error::InvalidData(format!("entry {i} is not an object")))
    }))
}

/// A non-empty string member. Numbers are rendered as text.
pub(crate) fn text<'a>(entry: &'a Map<String, Json>, field: &str) -> Option<std::borrow::Cow<'a, str>> {
    match entry.get(field)? {
        Json::String(s) if !s.is_empty() => Some(std::borrow::Cow::Borrowed(s)),
        Json::Number(n) => Some(std::borrow::Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// An integer member given as a number or a numeric string.
pub(crate) fn integer(entry: &Map<String, Json>, field: &str) -> Option<i64> {
    match entry.get(field)? {
        Json::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_integer() {
        let raw = serde_json::json!({"a": "x", "b": "", "c": 12, "d": "34", "e": "n/a", "f": null});
        let entry = raw.as_object().unwrap();

        assert_eq!(text(entry, "a").as_deref(), Some("x"));
        assert_eq!(text(entry, "b"), None);
        assert_eq!(text(entry, "c").as_deref(), Some("12"));
        assert_eq!(text(entry, "f"), None);

        assert_eq!(integer(entry, "c"), Some(12));
        assert_eq!(integer(entry, "d"), Some(34));
        assert_eq!(integer(entry, "e"), None);
        assert_eq!(integer(entry, "missing"), None);
    }

    #[test]
    fn test_entries_reject_non_arrays() {
        assert!(entries(&serde_json::json!({"a": 1})).is_err());
        let raw = serde_json::json!([1]);
        let mut iter = entries(&raw).unwrap();
        assert!(iter.next().unwrap().is_err());
    }
}
