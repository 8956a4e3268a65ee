//! In-memory table metadata model.
//!
//! A [`TableMetadata`] is built once, either by the JSON importer or by the
//! binary decoder, and is read-only afterwards. All fields are public so
//! callers can inspect the tree directly; the encoder re-validates every
//! column reference rather than trusting the values it is handed.

use crate::config::METADATA_VERSION;
use crate::dictionary::ColumnDictionary;
use crate::error::Result;
use crate::statistics::StatisticValue;
use crate::types::ColumnTypeInfo;
use std::collections::BTreeMap;

/// Cache header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Always `"v2"` for caches this crate produces or accepts.
    pub version: String,
    /// Directories covered by the cache, in scan order.
    pub directories: Vec<String>,
}

impl Header {
    /// Header for the current cache version.
    pub fn new(directories: Vec<String>) -> Self {
        Self {
            version: METADATA_VERSION.to_string(),
            directories,
        }
    }
}

/// Statistics for one column of one row group.
///
/// A record with zero nulls and no statistic carries no information and is
/// never materialized; use [`ColumnStatistics::new`] to get that rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    /// Dictionary id of the column.
    pub column_ref: u32,
    /// Null count; 0 when not recorded.
    pub nulls: i64,
    pub statistic: Option<StatisticValue>,
}

impl ColumnStatistics {
    /// Returns `None` for an all-default record.
    pub fn new(column_ref: u32, nulls: i64, statistic: Option<StatisticValue>) -> Option<Self> {
        let stats = Self {
            column_ref,
            nulls,
            statistic,
        };
        (!stats.is_empty()).then_some(stats)
    }

    pub fn is_empty(&self) -> bool {
        self.nulls == 0 && self.statistic.is_none()
    }
}

/// One row group of a Parquet file.
#[derive(Debug, Clone)]
pub struct RowGroupMetadata {
    pub start: i64,
    pub length: i64,
    pub row_count: i64,
    /// host name -> fraction of the row group's bytes stored on that host.
    /// Ordered by host name so encoding is deterministic.
    pub host_affinity: BTreeMap<String, f32>,
    pub columns: Vec<ColumnStatistics>,
}

impl PartialEq for RowGroupMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.length == other.length
            && self.row_count == other.row_count
            && same_host_affinity(&self.host_affinity, &other.host_affinity)
            && self.columns == other.columns
    }
}

/// Host maps are equal when they hold the same hosts with bit-identical
/// fractions, so a NaN fraction still equals itself.
pub fn same_host_affinity(a: &BTreeMap<String, f32>, b: &BTreeMap<String, f32>) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|((ha, fa), (hb, fb))| ha == hb && fa.to_bits() == fb.to_bits())
}

/// One physical Parquet file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParquetFileMetadata {
    pub path: String,
    pub length: i64,
    pub row_groups: Vec<RowGroupMetadata>,
}

impl ParquetFileMetadata {
    /// Total rows across all row groups, saturating at the i64 bounds.
    pub fn row_count(&self) -> i64 {
        self.row_groups
            .iter()
            .fold(0i64, |acc, rg| acc.saturating_add(rg.row_count))
    }
}

/// Root aggregate: everything a metadata cache holds for one directory tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    pub header: Header,
    pub dictionary: ColumnDictionary,
    pub files: Vec<ParquetFileMetadata>,
}

impl TableMetadata {
    pub fn new(header: Header, dictionary: ColumnDictionary, files: Vec<ParquetFileMetadata>) -> Self {
        Self {
            header,
            dictionary,
            files,
        }
    }

    /// Resolve the type descriptor a row-group column record points at.
    pub fn column_type(&self, stats: &ColumnStatistics) -> Result<&ColumnTypeInfo> {
        self.dictionary.get(stats.column_ref)
    }

    pub fn row_group_count(&self) -> usize {
        self.files.iter().map(|f| f.row_groups.len()).sum()
    }

    /// Number of materialized row-group column records.
    pub fn column_record_count(&self) -> usize {
        self.files
            .iter()
            .flat_map(|f| &f.row_groups)
            .map(|rg| rg.columns.len())
            .sum()
    }
}
