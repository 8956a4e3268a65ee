//! Typed column statistic ("extreme value") codec.
//!
//! The variant of a [`StatisticValue`] is always chosen from the column's
//! declared [`PrimitiveType`], never from the shape of the raw value. The
//! wire payload carries no per-value tag; a decoder recovers the variant
//! from the dictionary entry the record points at.
//!
//! | Primitive type                        | Variant   | Wire payload       |
//! |---------------------------------------|-----------|--------------------|
//! | INT32                                 | `Int32`   | zigzag varint      |
//! | INT64                                 | `Int64`   | zigzag varint      |
//! | BOOLEAN                               | `Bool`    | u8 (0 / 1)         |
//! | FLOAT                                 | `Float`   | f32 little-endian  |
//! | DOUBLE                                | `Double`  | f64 little-endian  |
//! | BINARY, INT96, FIXED_LEN_BYTE_ARRAY   | `Binary`  | varint len + bytes |

use crate::error::{MetaCacheError, Result};
use crate::types::{ColumnTypeInfo, PrimitiveType};
use crate::varint::{decode_i64, decode_len_bytes, decode_u8, encode_i64, encode_len_bytes, take};
use serde_json::Value as JsonValue;

/// A single min/max value recorded for one column of one row group.
#[derive(Debug, Clone)]
pub enum StatisticValue {
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Binary(Vec<u8>),
}

impl PartialEq for StatisticValue {
    /// Floats compare by bit pattern so that a decoded cache always equals
    /// the model it was written from (NaN included).
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StatisticValue::Int32(a), StatisticValue::Int32(b)) => a == b,
            (StatisticValue::Int64(a), StatisticValue::Int64(b)) => a == b,
            (StatisticValue::Bool(a), StatisticValue::Bool(b)) => a == b,
            (StatisticValue::Float(a), StatisticValue::Float(b)) => a.to_bits() == b.to_bits(),
            (StatisticValue::Double(a), StatisticValue::Double(b)) => a.to_bits() == b.to_bits(),
            (StatisticValue::Binary(a), StatisticValue::Binary(b)) => a == b,
            _ => false,
        }
    }
}

impl StatisticValue {
    /// Variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            StatisticValue::Int32(_) => "Int32",
            StatisticValue::Int64(_) => "Int64",
            StatisticValue::Bool(_) => "Bool",
            StatisticValue::Float(_) => "Float",
            StatisticValue::Double(_) => "Double",
            StatisticValue::Binary(_) => "Binary",
        }
    }

    /// Whether this variant is the one `primitive` maps to.
    pub fn matches(&self, primitive: PrimitiveType) -> bool {
        matches!(
            (self, primitive),
            (StatisticValue::Int32(_), PrimitiveType::Int32)
                | (StatisticValue::Int64(_), PrimitiveType::Int64)
                | (StatisticValue::Bool(_), PrimitiveType::Boolean)
                | (StatisticValue::Float(_), PrimitiveType::Float)
                | (StatisticValue::Double(_), PrimitiveType::Double)
                | (
                    StatisticValue::Binary(_),
                    PrimitiveType::Binary | PrimitiveType::Int96 | PrimitiveType::FixedLenByteArray
                )
        )
    }

    /// Convert a raw JSON scalar into the variant `primitive` dictates.
    ///
    /// Binary-like types accept a string (its UTF-8 bytes) or an array of
    /// byte numbers.
    pub fn from_json(primitive: PrimitiveType, raw: &JsonValue) -> Result<Self> {
        let wrong = |expected: &str| {
            MetaCacheError::invalid_json(format!(
                "{primitive} statistic must be {expected}, got {raw}"
            ))
        };
        match primitive {
            PrimitiveType::Int32 => {
                let v = raw.as_i64().ok_or_else(|| wrong("an integer"))?;
                i32::try_from(v)
                    .map(StatisticValue::Int32)
                    .map_err(|_| wrong("a 32-bit integer"))
            }
            PrimitiveType::Int64 => raw
                .as_i64()
                .map(StatisticValue::Int64)
                .ok_or_else(|| wrong("a 64-bit integer")),
            PrimitiveType::Boolean => raw
                .as_bool()
                .map(StatisticValue::Bool)
                .ok_or_else(|| wrong("a boolean")),
            PrimitiveType::Float => {
                let v = raw.as_f64().ok_or_else(|| wrong("a number"))?;
                if v.abs() > f32::MAX as f64 {
                    return Err(wrong("a number within FLOAT range"));
                }
                Ok(StatisticValue::Float(v as f32))
            }
            PrimitiveType::Double => raw
                .as_f64()
                .map(StatisticValue::Double)
                .ok_or_else(|| wrong("a number")),
            PrimitiveType::Binary | PrimitiveType::Int96 | PrimitiveType::FixedLenByteArray => {
                match raw {
                    JsonValue::String(s) => Ok(StatisticValue::Binary(s.as_bytes().to_vec())),
                    JsonValue::Array(items) => items
                        .iter()
                        .map(|b| {
                            b.as_u64()
                                .and_then(|b| u8::try_from(b).ok())
                                .ok_or_else(|| wrong("a string or an array of bytes"))
                        })
                        .collect::<Result<Vec<u8>>>()
                        .map(StatisticValue::Binary),
                    _ => Err(wrong("a string or an array of bytes")),
                }
            }
        }
    }

    /// Convert back to a JSON scalar. Total: every variant has a form.
    ///
    /// Non-finite floats have no JSON number form and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            StatisticValue::Int32(v) => JsonValue::from(*v),
            StatisticValue::Int64(v) => JsonValue::from(*v),
            StatisticValue::Bool(v) => JsonValue::from(*v),
            StatisticValue::Float(v) => JsonValue::from(*v as f64),
            StatisticValue::Double(v) => JsonValue::from(*v),
            StatisticValue::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => JsonValue::from(s),
                Err(_) => JsonValue::from(bytes.clone()),
            },
        }
    }
}

/// Append the untagged wire payload of `value` to `buf`, checking it is
/// the variant `column`'s primitive type maps to.
pub fn write_statistic(
    column: &ColumnTypeInfo,
    value: &StatisticValue,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let primitive = column.primitive_type.ok_or_else(|| {
        MetaCacheError::unsupported_type(format!(
            "column '{}' has no primitive type, cannot encode its statistic",
            column.dotted_name()
        ))
    })?;
    if !value.matches(primitive) {
        return Err(MetaCacheError::TypeMismatch {
            column: column.dotted_name(),
            declared: primitive.to_string(),
            actual: value.kind(),
        });
    }
    match value {
        StatisticValue::Int32(v) => encode_i64(*v as i64, buf),
        StatisticValue::Int64(v) => encode_i64(*v, buf),
        StatisticValue::Bool(v) => buf.push(u8::from(*v)),
        StatisticValue::Float(v) => buf.extend_from_slice(&v.to_le_bytes()),
        StatisticValue::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
        StatisticValue::Binary(bytes) => encode_len_bytes(bytes, buf),
    }
    Ok(())
}

/// Read a statistic payload whose variant is dictated by `column`'s
/// primitive type.
pub fn read_statistic(column: &ColumnTypeInfo, data: &[u8], pos: &mut usize) -> Result<StatisticValue> {
    let primitive = column.primitive_type.ok_or_else(|| {
        MetaCacheError::unsupported_type(format!(
            "column '{}' has no primitive type, cannot decode its statistic",
            column.dotted_name()
        ))
    })?;
    Ok(match primitive {
        PrimitiveType::Int32 => {
            let v = decode_i64(data, pos)?;
            let v = i32::try_from(v).map_err(|_| {
                MetaCacheError::framing(format!(
                    "INT32 statistic {v} out of range for '{}'",
                    column.dotted_name()
                ))
            })?;
            StatisticValue::Int32(v)
        }
        PrimitiveType::Int64 => StatisticValue::Int64(decode_i64(data, pos)?),
        PrimitiveType::Boolean => match decode_u8(data, pos, "boolean statistic")? {
            0 => StatisticValue::Bool(false),
            1 => StatisticValue::Bool(true),
            b => {
                return Err(MetaCacheError::framing(format!(
                    "invalid boolean byte {b} for '{}'",
                    column.dotted_name()
                )))
            }
        },
        PrimitiveType::Float => {
            let arr: [u8; 4] = take(data, pos, 4, "float statistic")?
                .try_into()
                .map_err(|_| MetaCacheError::framing("float statistic width"))?;
            StatisticValue::Float(f32::from_le_bytes(arr))
        }
        PrimitiveType::Double => {
            let arr: [u8; 8] = take(data, pos, 8, "double statistic")?
                .try_into()
                .map_err(|_| MetaCacheError::framing("double statistic width"))?;
            StatisticValue::Double(f64::from_le_bytes(arr))
        }
        PrimitiveType::Binary | PrimitiveType::Int96 | PrimitiveType::FixedLenByteArray => {
            StatisticValue::Binary(decode_len_bytes(data, pos, "binary statistic")?.to_vec())
        }
    })
}
