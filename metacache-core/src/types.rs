//! Column type descriptors: Parquet primitive and logical (original) types.

use crate::error::{MetaCacheError, Result};
use std::fmt;

/// Separator used to join a column's path segments into its dictionary key.
pub const COLUMN_NAME_SEPARATOR: char = '.';

/// Parquet physical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    Boolean,
    Binary,
    FixedLenByteArray,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::Int96,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Boolean,
        PrimitiveType::Binary,
        PrimitiveType::FixedLenByteArray,
    ];

    /// Name as written in JSON caches.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Int32 => "INT32",
            PrimitiveType::Int64 => "INT64",
            PrimitiveType::Int96 => "INT96",
            PrimitiveType::Float => "FLOAT",
            PrimitiveType::Double => "DOUBLE",
            PrimitiveType::Boolean => "BOOLEAN",
            PrimitiveType::Binary => "BINARY",
            PrimitiveType::FixedLenByteArray => "FIXED_LEN_BYTE_ARRAY",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| MetaCacheError::unsupported_type(format!("unknown primitive type {name}")))
    }

    /// Wire tag (0 is reserved for "absent").
    pub fn tag(&self) -> u8 {
        match self {
            PrimitiveType::Int32 => 1,
            PrimitiveType::Int64 => 2,
            PrimitiveType::Int96 => 3,
            PrimitiveType::Float => 4,
            PrimitiveType::Double => 5,
            PrimitiveType::Boolean => 6,
            PrimitiveType::Binary => 7,
            PrimitiveType::FixedLenByteArray => 8,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Option<Self>> {
        match tag {
            0 => Ok(None),
            1..=8 => Ok(Some(Self::ALL[(tag - 1) as usize])),
            _ => Err(MetaCacheError::framing(format!("invalid primitive type tag {tag}"))),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parquet logical type annotation ("original type").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OriginalType {
    Map,
    List,
    Utf8,
    MapKeyValue,
    Enum,
    Decimal,
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Json,
    Bson,
    Interval,
}

impl OriginalType {
    pub const ALL: [OriginalType; 22] = [
        OriginalType::Map,
        OriginalType::List,
        OriginalType::Utf8,
        OriginalType::MapKeyValue,
        OriginalType::Enum,
        OriginalType::Decimal,
        OriginalType::Date,
        OriginalType::TimeMillis,
        OriginalType::TimeMicros,
        OriginalType::TimestampMillis,
        OriginalType::TimestampMicros,
        OriginalType::Uint8,
        OriginalType::Uint16,
        OriginalType::Uint32,
        OriginalType::Uint64,
        OriginalType::Int8,
        OriginalType::Int16,
        OriginalType::Int32,
        OriginalType::Int64,
        OriginalType::Json,
        OriginalType::Bson,
        OriginalType::Interval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OriginalType::Map => "MAP",
            OriginalType::List => "LIST",
            OriginalType::Utf8 => "UTF8",
            OriginalType::MapKeyValue => "MAP_KEY_VALUE",
            OriginalType::Enum => "ENUM",
            OriginalType::Decimal => "DECIMAL",
            OriginalType::Date => "DATE",
            OriginalType::TimeMillis => "TIME_MILLIS",
            OriginalType::TimeMicros => "TIME_MICROS",
            OriginalType::TimestampMillis => "TIMESTAMP_MILLIS",
            OriginalType::TimestampMicros => "TIMESTAMP_MICROS",
            OriginalType::Uint8 => "UINT_8",
            OriginalType::Uint16 => "UINT_16",
            OriginalType::Uint32 => "UINT_32",
            OriginalType::Uint64 => "UINT_64",
            OriginalType::Int8 => "INT_8",
            OriginalType::Int16 => "INT_16",
            OriginalType::Int32 => "INT_32",
            OriginalType::Int64 => "INT_64",
            OriginalType::Json => "JSON",
            OriginalType::Bson => "BSON",
            OriginalType::Interval => "INTERVAL",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| MetaCacheError::unsupported_type(format!("unknown original type {name}")))
    }

    /// Wire tag (0 is reserved for "absent").
    pub fn tag(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|t| t == self)
            .map(|i| i as u8 + 1)
            .unwrap_or(0)
    }

    pub fn from_tag(tag: u8) -> Result<Option<Self>> {
        match tag {
            0 => Ok(None),
            t if (t as usize) <= Self::ALL.len() => Ok(Some(Self::ALL[(t - 1) as usize])),
            _ => Err(MetaCacheError::framing(format!("invalid original type tag {tag}"))),
        }
    }
}

impl fmt::Display for OriginalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema entry for one column of the table, merged across all files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnTypeInfo {
    /// Path segments from the schema root, e.g. `["address", "zip"]`.
    pub name: Vec<String>,
    /// `None` when the scanner could not determine a physical type.
    pub primitive_type: Option<PrimitiveType>,
    pub original_type: Option<OriginalType>,
}

impl ColumnTypeInfo {
    pub fn new(
        name: Vec<String>,
        primitive_type: Option<PrimitiveType>,
        original_type: Option<OriginalType>,
    ) -> Self {
        Self {
            name,
            primitive_type,
            original_type,
        }
    }

    /// Path segments joined with `.`; the dictionary key.
    pub fn dotted_name(&self) -> String {
        dotted_name(&self.name)
    }
}

/// Join path segments with `.`.
pub fn dotted_name<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push(COLUMN_NAME_SEPARATOR);
        }
        out.push_str(seg.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names_and_tags() {
        for t in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_name(t.as_str()).unwrap(), t);
            assert_eq!(PrimitiveType::from_tag(t.tag()).unwrap(), Some(t));
        }
        assert_eq!(PrimitiveType::from_tag(0).unwrap(), None);
        assert!(PrimitiveType::from_tag(9).is_err());
        assert!(matches!(
            PrimitiveType::from_name("INT128"),
            Err(MetaCacheError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_original_names_and_tags() {
        for t in OriginalType::ALL {
            assert_eq!(OriginalType::from_name(t.as_str()).unwrap(), t);
            assert_eq!(OriginalType::from_tag(t.tag()).unwrap(), Some(t));
        }
        assert_eq!(OriginalType::Map.tag(), 1);
        assert_eq!(OriginalType::Interval.tag(), 22);
        assert!(OriginalType::from_tag(23).is_err());
    }

    #[test]
    fn test_dotted_name() {
        let col = ColumnTypeInfo::new(
            vec!["address".into(), "zip".into()],
            Some(PrimitiveType::Int32),
            None,
        );
        assert_eq!(col.dotted_name(), "address.zip");
        assert_eq!(dotted_name::<&str>(&[]), "");
        assert_eq!(dotted_name(&["a"]), "a");
    }
}
