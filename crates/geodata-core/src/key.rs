//! Natural key construction.

use std::fmt;

use geodata_proto::Record;

/// Separator between key parts (ASCII unit separator).
///
/// Source values are printable text, so this never occurs inside a part.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// A composite natural key.
///
/// Key format: `part[0] SEP part[1] SEP ... part[n-1]`, one part per key
/// field in descriptor order. Absent and null values contribute an empty
/// part, so `["US", null]` and `["US", ""]` build the same key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey(String);

impl NaturalKey {
    /// Build the key of `record` from the ordered `fields`.
    pub fn build<S: AsRef<str>>(record: &Record, fields: &[S]) -> Self {
        let mut key = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            if let Some(value) = record.get(field.as_ref()) {
                key.push_str(&value.key_text());
            }
        }
        NaturalKey(key)
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the key parts.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }
}

impl fmt::Debug for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NaturalKey")
            .field(&self.parts().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}
