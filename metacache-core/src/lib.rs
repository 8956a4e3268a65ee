//! Directory-wide Parquet metadata cache codec.
//!
//! A metadata cache holds per-file, per-row-group, per-column statistics for
//! every Parquet file under a directory tree, so scans can be pruned without
//! re-reading file footers. This crate converts between three forms of it:
//! the JSON tree a scanner writes, the in-memory [`TableMetadata`] model and
//! a compact binary encoding.
//!
//! # Architecture
//!
//! - [`varint`] / [`framing`] - LEB128 varints and length-prefixed blocks
//!   read under a cumulative size limit
//! - [`dictionary`] - sorted column dictionary; row groups refer to columns
//!   by id only
//! - [`statistics`] - statistic values, typed by the column's declared
//!   primitive type
//! - [`metadata`] - the table model
//! - [`codec`] - binary encoder/decoder
//! - [`import`] / [`export`] - JSON tree <-> model
//! - [`compare`] - structural diff of two models
//!
//! # Example
//!
//! ```ignore
//! use metacache_core::{decode_from_slice, encode_to_vec, import_json, CodecConfig};
//!
//! let table = import_json(&serde_json::from_str(&text)?)?;
//! let bytes = encode_to_vec(&table)?;
//! let decoded = decode_from_slice(&bytes, &CodecConfig::default())?;
//! assert_eq!(decoded, table);
//! ```

pub mod codec;
pub mod compare;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod export;
pub mod framing;
pub mod import;
pub mod metadata;
pub mod statistics;
pub mod types;
pub mod varint;

pub use codec::{
    decode_from_slice, decode_table, encode_table, encode_to_vec, read_cache_file,
    write_cache_file,
};
pub use compare::{diff, identical, Difference};
pub use config::{CodecConfig, DEFAULT_PROGRESS_INTERVAL, DEFAULT_SIZE_LIMIT, METADATA_VERSION};
pub use dictionary::ColumnDictionary;
pub use error::{MetaCacheError, Result};
pub use export::export_json;
pub use import::{import_json, import_json_with_progress, ImportProgress};
pub use metadata::{ColumnStatistics, Header, ParquetFileMetadata, RowGroupMetadata, TableMetadata};
pub use statistics::{read_statistic, write_statistic, StatisticValue};
pub use types::{ColumnTypeInfo, OriginalType, PrimitiveType};
