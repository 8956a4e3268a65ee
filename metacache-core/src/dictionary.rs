//! Column dictionary: sorted column descriptors addressed by integer id.
//!
//! Row-group column records carry only a dictionary id, never the column
//! name, so a cache cannot be decoded without its dictionary section.
//!
//! Ids are assigned by lexicographic (byte) rank of the dotted name. The
//! assignment therefore depends only on the set of columns, never on the
//! order they were collected in, which keeps re-encoded caches byte-stable.
//!
//! Wire format: `[count: varint]([segCount: varint][len: varint, utf8]* [primitive: u8][original: u8])*`

use crate::error::{MetaCacheError, Result};
use crate::types::{dotted_name, ColumnTypeInfo, OriginalType, PrimitiveType};
use crate::varint::{decode_count, decode_str, decode_u8, encode_str, encode_varint};
use rustc_hash::FxHashMap;

/// Sorted, deduplicated column descriptors plus a name -> id index.
#[derive(Debug, Clone, Default)]
pub struct ColumnDictionary {
    /// Entries in id order (ascending dotted name).
    columns: Vec<ColumnTypeInfo>,
    /// dotted name -> id, built once alongside `columns`.
    ids: FxHashMap<String, u32>,
}

impl PartialEq for ColumnDictionary {
    fn eq(&self, other: &Self) -> bool {
        // `ids` is derived from `columns`
        self.columns == other.columns
    }
}

impl ColumnDictionary {
    /// Build a dictionary from every column descriptor of a table.
    ///
    /// Identical duplicates collapse into one entry. Two different
    /// descriptors with the same dotted name are rejected with
    /// [`MetaCacheError::DuplicateColumn`].
    pub fn build<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = ColumnTypeInfo>,
    {
        let mut keyed: Vec<(String, ColumnTypeInfo)> = columns
            .into_iter()
            .map(|c| (c.dotted_name(), c))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut sorted: Vec<ColumnTypeInfo> = Vec::with_capacity(keyed.len());
        let mut ids = FxHashMap::default();
        for (name, column) in keyed {
            if let Some(&id) = ids.get(&name) {
                if sorted[id as usize] != column {
                    return Err(MetaCacheError::DuplicateColumn(name));
                }
                continue;
            }
            ids.insert(name, sorted.len() as u32);
            sorted.push(column);
        }

        Ok(Self {
            columns: sorted,
            ids,
        })
    }

    /// Adopt columns that are already in dictionary order (decode path).
    ///
    /// Names must be strictly ascending; anything else cannot have been
    /// produced by [`ColumnDictionary::build`] and is treated as corruption.
    pub fn from_sorted(columns: Vec<ColumnTypeInfo>) -> Result<Self> {
        let mut ids = FxHashMap::default();
        ids.reserve(columns.len());
        let mut prev: Option<String> = None;
        for (id, column) in columns.iter().enumerate() {
            let name = column.dotted_name();
            if let Some(prev) = &prev {
                if *prev >= name {
                    return Err(MetaCacheError::framing(format!(
                        "column dictionary out of order at id {id}: '{prev}' precedes '{name}'"
                    )));
                }
            }
            ids.insert(name.clone(), id as u32);
            prev = Some(name);
        }
        Ok(Self { columns, ids })
    }

    /// Resolve a dotted column name to its id.
    pub fn lookup(&self, dotted: &str) -> Result<u32> {
        self.ids.get(dotted).copied().ok_or_else(|| {
            MetaCacheError::column_not_found(format!("'{dotted}' is not in the column dictionary"))
        })
    }

    /// Resolve a column path (segments) to its id.
    pub fn lookup_path<S: AsRef<str>>(&self, segments: &[S]) -> Result<u32> {
        self.lookup(&dotted_name(segments))
    }

    /// Descriptor for `id`.
    pub fn get(&self, id: u32) -> Result<&ColumnTypeInfo> {
        self.columns.get(id as usize).ok_or_else(|| {
            MetaCacheError::column_not_found(format!(
                "id {id} out of range (dictionary has {} entries)",
                self.columns.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Descriptors in id order.
    pub fn columns(&self) -> &[ColumnTypeInfo] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &ColumnTypeInfo)> {
        self.columns.iter().enumerate().map(|(i, c)| (i as u32, c))
    }

    /// Serialize the dictionary section.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_varint(self.columns.len() as u64, &mut buf);
        for column in &self.columns {
            encode_varint(column.name.len() as u64, &mut buf);
            for seg in &column.name {
                encode_str(seg, &mut buf);
            }
            buf.push(column.primitive_type.map_or(0, |t| t.tag()));
            buf.push(column.original_type.map_or(0, |t| t.tag()));
        }
        buf
    }

    /// Deserialize bytes produced by [`ColumnDictionary::serialize`].
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let count = decode_count(data, &mut pos, "dictionary")?;
        let mut columns = Vec::with_capacity(count);
        for _ in 0..count {
            let seg_count = decode_count(data, &mut pos, "column name")?;
            let mut name = Vec::with_capacity(seg_count);
            for _ in 0..seg_count {
                name.push(decode_str(data, &mut pos, "column name segment")?);
            }
            let primitive_type = PrimitiveType::from_tag(decode_u8(data, &mut pos, "primitive type")?)?;
            let original_type = OriginalType::from_tag(decode_u8(data, &mut pos, "original type")?)?;
            columns.push(ColumnTypeInfo {
                name,
                primitive_type,
                original_type,
            });
        }
        if pos != data.len() {
            return Err(MetaCacheError::framing(format!(
                "{} trailing bytes in dictionary section",
                data.len() - pos
            )));
        }
        Self::from_sorted(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, t: PrimitiveType) -> ColumnTypeInfo {
        ColumnTypeInfo::new(
            name.split('.').map(str::to_string).collect(),
            Some(t),
            None,
        )
    }

    #[test]
    fn test_ids_follow_lexicographic_rank() {
        let dict = ColumnDictionary::build(vec![
            col("zeta", PrimitiveType::Int64),
            col("alpha", PrimitiveType::Binary),
            col("Beta", PrimitiveType::Double),
            col("alpha.inner", PrimitiveType::Int32),
        ])
        .unwrap();

        // byte order: uppercase before lowercase, prefix before extension
        assert_eq!(dict.lookup("Beta").unwrap(), 0);
        assert_eq!(dict.lookup("alpha").unwrap(), 1);
        assert_eq!(dict.lookup("alpha.inner").unwrap(), 2);
        assert_eq!(dict.lookup("zeta").unwrap(), 3);
        assert_eq!(dict.lookup_path(&["alpha", "inner"]).unwrap(), 2);
        assert_eq!(dict.get(3).unwrap().primitive_type, Some(PrimitiveType::Int64));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let cols = vec![
            col("c", PrimitiveType::Int32),
            col("a", PrimitiveType::Int64),
            col("b", PrimitiveType::Boolean),
        ];
        let mut reversed = cols.clone();
        reversed.reverse();

        let d1 = ColumnDictionary::build(cols).unwrap();
        let d2 = ColumnDictionary::build(reversed).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1.serialize(), d2.serialize());
    }

    #[test]
    fn test_identical_duplicates_collapse() {
        let dict = ColumnDictionary::build(vec![
            col("a", PrimitiveType::Int32),
            col("a", PrimitiveType::Int32),
        ])
        .unwrap();
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_conflicting_duplicates_rejected() {
        let err = ColumnDictionary::build(vec![
            col("a", PrimitiveType::Int32),
            col("a", PrimitiveType::Int64),
        ])
        .unwrap_err();
        assert!(matches!(err, MetaCacheError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_missing_column() {
        let dict = ColumnDictionary::build(vec![col("a", PrimitiveType::Int32)]).unwrap();
        assert!(matches!(
            dict.lookup("b"),
            Err(MetaCacheError::ColumnNotFound(_))
        ));
        assert!(matches!(dict.get(1), Err(MetaCacheError::ColumnNotFound(_))));
    }

    #[test]
    fn test_serialize_round_trip() {
        let dict = ColumnDictionary::build(vec![
            ColumnTypeInfo::new(
                vec!["ts".into()],
                Some(PrimitiveType::Int64),
                Some(OriginalType::TimestampMillis),
            ),
            ColumnTypeInfo::new(vec!["untyped".into()], None, None),
            col("\u{540d}.\u{524d}", PrimitiveType::Binary),
        ])
        .unwrap();

        let decoded = ColumnDictionary::deserialize(&dict.serialize()).unwrap();
        assert_eq!(decoded, dict);
        assert_eq!(decoded.lookup("untyped").unwrap(), dict.lookup("untyped").unwrap());
    }

    #[test]
    fn test_empty_round_trip() {
        let dict = ColumnDictionary::build(Vec::new()).unwrap();
        let decoded = ColumnDictionary::deserialize(&dict.serialize()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_unsorted_section_rejected() {
        let mut buf = Vec::new();
        encode_varint(2, &mut buf);
        for name in ["b", "a"] {
            encode_varint(1, &mut buf);
            encode_str(name, &mut buf);
            buf.push(PrimitiveType::Int32.tag());
            buf.push(0);
        }
        assert!(matches!(
            ColumnDictionary::deserialize(&buf),
            Err(MetaCacheError::Framing(_))
        ));
    }
}
