//! Field codec for encoding records to and from bytes.
//!
//! Format:
//! - Field count (4 bytes, little-endian)
//! - For each field:
//!   - Field name length (2 bytes, little-endian)
//!   - Field name (UTF-8 bytes)
//!   - Value tag (1 byte)
//!   - Value data (variable length, depends on type)

use geodata_proto::{Record, Value};

use crate::error::Error;

/// Type tag for encoded values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueTag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Decimal = 3,
    String = 4,
    Timestamp = 5,
}

impl TryFrom<u8> for ValueTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ValueTag::Null),
            1 => Ok(ValueTag::Bool),
            2 => Ok(ValueTag::Int),
            3 => Ok(ValueTag::Decimal),
            4 => Ok(ValueTag::String),
            5 => Ok(ValueTag::Timestamp),
            _ => Err(Error::InvalidData(format!("Unknown value tag: {}", value))),
        }
    }
}

/// Encode the fields of a record, skipping the ones listed in `skip`.
pub fn encode_fields(record: &Record, skip: &[&str]) -> Result<Vec<u8>, Error> {
    let fields: Vec<(&str, &Value)> = record
        .iter()
        .filter(|(name, _)| !skip.contains(name))
        .collect();

    let mut buf = Vec::new();
    buf.extend_from_slice(&(fields.len() as u32).to_le_bytes());

    for (name, value) in fields {
        let name_bytes = name.as_bytes();
        if name_bytes.len() > u16::MAX as usize {
            return Err(Error::InvalidData("Field name too long".into()));
        }
        buf.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        buf.extend_from_slice(name_bytes);

        encode_value(&mut buf, value)?;
    }

    Ok(buf)
}

/// Decode bytes back into a record.
pub fn decode_fields(data: &[u8]) -> Result<Record, Error> {
    let mut cursor = 0;

    let count = u32::from_le_bytes(read_array(data, &mut cursor, "field count")?) as usize;
    let mut record = Record::new();

    for _ in 0..count {
        let name_len = u16::from_le_bytes(read_array(data, &mut cursor, "field name length")?) as usize;
        let name_bytes = read_slice(data, &mut cursor, name_len, "field name")?;
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|_| Error::InvalidData("Invalid UTF-8 in field name".into()))?;

        let value = decode_value(data, &mut cursor)?;
        record.set(name, value);
    }

    if cursor != data.len() {
        return Err(Error::InvalidData(format!(
            "{} trailing bytes after record",
            data.len() - cursor
        )));
    }

    Ok(record)
}

/// Encode a single value to the buffer.
fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), Error> {
    match value {
        Value::Null => {
            buf.push(ValueTag::Null as u8);
        }
        Value::Bool(b) => {
            buf.push(ValueTag::Bool as u8);
            buf.push(u8::from(*b));
        }
        Value::Int(n) => {
            buf.push(ValueTag::Int as u8);
            buf.extend_from_slice(&n.to_le_bytes());
        }
        Value::Decimal(mantissa, scale) => {
            buf.push(ValueTag::Decimal as u8);
            buf.extend_from_slice(&mantissa.to_le_bytes());
            buf.push(*scale);
        }
        Value::String(s) => {
            buf.push(ValueTag::String as u8);
            let bytes = s.as_bytes();
            if bytes.len() > u32::MAX as usize {
                return Err(Error::InvalidData("String too long".into()));
            }
            buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(bytes);
        }
        Value::Timestamp(ts) => {
            buf.push(ValueTag::Timestamp as u8);
            buf.extend_from_slice(&ts.to_le_bytes());
        }
    }
    Ok(())
}

/// Decode a single value starting at `cursor`, advancing it.
fn decode_value(data: &[u8], cursor: &mut usize) -> Result<Value, Error> {
    let [tag] = read_array::<1>(data, cursor, "value tag")?;

    let value = match ValueTag::try_from(tag)? {
        ValueTag::Null => Value::Null,
        ValueTag::Bool => {
            let [b] = read_array::<1>(data, cursor, "bool")?;
            Value::Bool(b != 0)
        }
        ValueTag::Int => Value::Int(i64::from_le_bytes(read_array(data, cursor, "i64")?)),
        ValueTag::Decimal => {
            let mantissa = i128::from_le_bytes(read_array(data, cursor, "decimal mantissa")?);
            let [scale] = read_array::<1>(data, cursor, "decimal scale")?;
            Value::Decimal(mantissa, scale)
        }
        ValueTag::String => {
            let len = u32::from_le_bytes(read_array(data, cursor, "string length")?) as usize;
            let bytes = read_slice(data, cursor, len, "string")?;
            let s = String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::InvalidData("Invalid UTF-8 in string".into()))?;
            Value::String(s)
        }
        ValueTag::Timestamp => {
            Value::Timestamp(i64::from_le_bytes(read_array(data, cursor, "timestamp")?))
        }
    };

    Ok(value)
}

fn read_slice<'a>(
    data: &'a [u8],
    cursor: &mut usize,
    len: usize,
    what: &str,
) -> Result<&'a [u8], Error> {
    let end = cursor
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| Error::InvalidData(format!("Data too short for {}", what)))?;
    let slice = &data[*cursor..end];
    *cursor = end;
    Ok(slice)
}

fn read_array<const N: usize>(data: &[u8], cursor: &mut usize, what: &str) -> Result<[u8; N], Error> {
    let mut out = [0u8; N];
    out.copy_from_slice(read_slice(data, cursor, N, what)?);
    Ok(out)
}
