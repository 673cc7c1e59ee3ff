//! Scalar value types carried by records.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::Error;

/// A scalar field value.
///
/// Records coming from a source snapshot and records read back from the
/// store are both made of these. Equality is structural: decimals compare by
/// mantissa and scale, so `1.0` and `1.00` are different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// Exact decimal as `(mantissa, scale)`.
    ///
    /// Example: `Decimal(4071427, 5)` represents `40.71427`.
    Decimal(i128, u8),
    /// UTF-8 string.
    String(String),
    /// Timestamp as microseconds since Unix epoch.
    Timestamp(i64),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a `(mantissa, scale)` pair.
    pub fn as_decimal(&self) -> Option<(i128, u8)> {
        match self {
            Value::Decimal(m, s) => Some((*m, *s)),
            _ => None,
        }
    }

    /// Try to get as timestamp.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Parse a decimal literal such as `"-73.98"`.
    pub fn parse_decimal(text: &str) -> Result<Self, Error> {
        let text = text.trim();
        let decimal = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|e| Error::InvalidValue(format!("invalid decimal '{text}': {e}")))?;
        let scale = u8::try_from(decimal.scale())
            .map_err(|_| Error::InvalidValue(format!("decimal scale too large: {text}")))?;
        Ok(Value::Decimal(decimal.mantissa(), scale))
    }

    /// Text form used when the value takes part in a natural key.
    ///
    /// Null renders as the empty string.
    pub fn key_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Convert into a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) | Value::Timestamp(i) => serde_json::Value::from(*i),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Decimal(m, s) => {
                let text = format_decimal(*m, *s);
                let number = serde_json::Number::from_str(&text).map_err(|e| {
                    Error::Serialization(format!("decimal {text} is not a JSON number: {e}"))
                })?;
                serde_json::Value::Number(number)
            }
        })
    }

    /// Convert a JSON scalar into a value.
    ///
    /// Integral numbers become [`Value::Int`], any other number becomes a
    /// [`Value::Decimal`] parsed from its literal text, so trailing zeros
    /// keep their scale. Arrays and objects are rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => Value::parse_decimal(&n.to_string()),
            },
            other => Err(Error::Deserialization(format!(
                "expected a scalar, got {other}"
            ))),
        }
    }
}

fn format_decimal(mantissa: i128, scale: u8) -> String {
    match Decimal::try_from_i128_with_scale(mantissa, u32::from(scale)) {
        Ok(decimal) => decimal.to_string(),
        Err(_) => format!("{mantissa}e-{scale}"),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Decimal(m, s) => write!(f, "{}", format_decimal(*m, *s)),
            Value::String(s) => write!(f, "{s}"),
            Value::Timestamp(t) => write!(f, "{t}"),
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_keeps_scale() {
        assert_eq!(
            Value::parse_decimal("40.71427").unwrap(),
            Value::Decimal(4071427, 5)
        );
        assert_eq!(Value::parse_decimal("-73.9").unwrap(), Value::Decimal(-739, 1));
        assert_ne!(
            Value::parse_decimal("1.0").unwrap(),
            Value::parse_decimal("1.00").unwrap()
        );
        assert!(Value::parse_decimal("north").is_err());
    }

    #[test]
    fn test_key_text() {
        assert_eq!(Value::Null.key_text(), "");
        assert_eq!(Value::from("US").key_text(), "US");
        assert_eq!(Value::Int(840).key_text(), "840");
        assert_eq!(Value::Decimal(-739, 1).key_text(), "-73.9");
        assert_eq!(Value::Bool(true).key_text(), "true");
    }

    #[test]
    fn test_from_json_numbers() {
        let json: serde_json::Value = serde_json::from_str(r#"[840, 40.71427, null, "x"]"#).unwrap();
        let values: Vec<Value> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|v| Value::from_json(v).unwrap())
            .collect();

        assert_eq!(
            values,
            vec![
                Value::Int(840),
                Value::Decimal(4071427, 5),
                Value::Null,
                Value::from("x"),
            ]
        );
    }

    #[test]
    fn test_from_json_rejects_nested() {
        let json = serde_json::json!({"a": 1});
        assert!(Value::from_json(&json).is_err());
    }

    #[test]
    fn test_decimal_to_json() {
        let json = Value::Decimal(4071427, 5).to_json().unwrap();
        assert_eq!(json.to_string(), "40.71427");
        assert_eq!(Value::from_json(&json).unwrap(), Value::Decimal(4071427, 5));
    }

    #[test]
    fn test_decimal_json_keeps_literal() {
        for text in ["40.71427000", "12.345678901234567891", "-0.50"] {
            let value = Value::parse_decimal(text).unwrap();
            let json = value.to_json().unwrap();
            assert_eq!(json.to_string(), text);
            assert_eq!(Value::from_json(&json).unwrap(), value);
        }
    }

    #[test]
    fn test_from_json_scientific_literal() {
        let json: serde_json::Value = serde_json::from_str("1.5e2").unwrap();
        let (mantissa, scale) = Value::from_json(&json).unwrap().as_decimal().unwrap();
        assert_eq!(
            Decimal::try_from_i128_with_scale(mantissa, u32::from(scale)).unwrap(),
            Decimal::from(150)
        );
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("CA")), Value::from("CA"));
    }
}
