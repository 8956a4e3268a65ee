//! JSON importer: generic `serde_json::Value` tree -> [`TableMetadata`].
//!
//! Expected shape:
//!
//! ```json
//! { "metadata_version": "v2",
//!   "columnTypeInfo": { "<key>": {"name": [..], "primitiveType": "INT64", "originalType": null} },
//!   "files": [ {"path": "..", "length": 1,
//!               "rowGroups": [ {"start": 4, "length": 10, "rowCount": 3,
//!                               "hostAffinity": {"host": 1.0},
//!                               "columns": [ {"name": [..], "nulls": 0, "mxValue": 7} ] } ] } ],
//!   "directories": [ ".." ] }
//! ```
//!
//! The column dictionary is finished before the first file is read, so
//! every row-group column resolves against the complete, sorted set of
//! columns. Keys of `columnTypeInfo` are ignored; only `name` matters.

use crate::config::{CodecConfig, METADATA_VERSION};
use crate::dictionary::ColumnDictionary;
use crate::error::{MetaCacheError, Result};
use crate::metadata::{ColumnStatistics, Header, ParquetFileMetadata, RowGroupMetadata, TableMetadata};
use crate::statistics::StatisticValue;
use crate::types::{dotted_name, ColumnTypeInfo, OriginalType, PrimitiveType};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Progress checkpoint reported while importing files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportProgress {
    /// Index of the file about to be imported.
    pub processed: usize,
    /// Number of files in the input.
    pub total: usize,
}

/// Import a JSON metadata tree with default settings and no progress reporting.
pub fn import_json(root: &JsonValue) -> Result<TableMetadata> {
    import_json_with_progress(root, &CodecConfig::default(), |_| {})
}

/// Import a JSON metadata tree, calling `on_progress` before file 0 and then
/// every `config.progress_interval` files.
pub fn import_json_with_progress<F>(
    root: &JsonValue,
    config: &CodecConfig,
    mut on_progress: F,
) -> Result<TableMetadata>
where
    F: FnMut(ImportProgress),
{
    let root = as_object(root, "document")?;

    let version = get_str(root, "metadata_version", "document")?;
    if version != METADATA_VERSION {
        return Err(MetaCacheError::InvalidVersion(version.to_string()));
    }

    let column_infos = as_object(require(root, "columnTypeInfo", "document")?, "columnTypeInfo")?;
    let dictionary = ColumnDictionary::build(
        column_infos
            .iter()
            .map(|(key, info)| parse_column_type(key, info))
            .collect::<Result<Vec<_>>>()?,
    )?;

    let files_json = as_array(require(root, "files", "document")?, "files")?;
    let total = files_json.len();

    let _span = tracing::debug_span!("metacache_import", files = total, columns = dictionary.len())
        .entered();

    let mut files = Vec::with_capacity(total);
    for (index, file) in files_json.iter().enumerate() {
        if config.progress_interval > 0 && index % config.progress_interval == 0 {
            on_progress(ImportProgress {
                processed: index,
                total,
            });
        }
        files.push(parse_file(file, &dictionary).map_err(|e| in_file(e, index))?);
    }

    let directories = as_array(require(root, "directories", "document")?, "directories")?
        .iter()
        .map(|d| {
            d.as_str()
                .map(str::to_string)
                .ok_or_else(|| MetaCacheError::invalid_json(format!("directory entry must be a string, got {d}")))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(files = files.len(), columns = dictionary.len(), "JSON imported");

    Ok(TableMetadata::new(Header::new(directories), dictionary, files))
}

fn in_file(err: MetaCacheError, index: usize) -> MetaCacheError {
    match err {
        MetaCacheError::InvalidJson(msg) => MetaCacheError::invalid_json(format!("files[{index}]: {msg}")),
        other => other,
    }
}

fn parse_column_type(key: &str, info: &JsonValue) -> Result<ColumnTypeInfo> {
    let ctx = format!("columnTypeInfo[{key}]");
    let info = as_object(info, &ctx)?;
    let name = parse_name(require(info, "name", &ctx)?, &ctx)?;

    let primitive_type = match info.get("primitiveType") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(PrimitiveType::from_name(s)?),
        Some(other) => {
            return Err(MetaCacheError::invalid_json(format!(
                "{ctx}.primitiveType must be a string or null, got {other}"
            )))
        }
    };
    let original_type = match info.get("originalType") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(OriginalType::from_name(s)?),
        Some(other) => {
            return Err(MetaCacheError::invalid_json(format!(
                "{ctx}.originalType must be a string or null, got {other}"
            )))
        }
    };

    Ok(ColumnTypeInfo::new(name, primitive_type, original_type))
}

fn parse_file(file: &JsonValue, dictionary: &ColumnDictionary) -> Result<ParquetFileMetadata> {
    let file = as_object(file, "file")?;
    let path = match file.get("path") {
        None => String::new(),
        Some(p) => p
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MetaCacheError::invalid_json(format!("path must be a string, got {p}")))?,
    };
    let length = get_i64_or(file, "length", -1, "file")?;

    let row_groups = as_array(require(file, "rowGroups", "file")?, "rowGroups")?
        .iter()
        .enumerate()
        .map(|(i, rg)| {
            parse_row_group(rg, dictionary).map_err(|e| match e {
                MetaCacheError::InvalidJson(msg) => {
                    MetaCacheError::invalid_json(format!("rowGroups[{i}]: {msg}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParquetFileMetadata {
        path,
        length,
        row_groups,
    })
}

fn parse_row_group(rg: &JsonValue, dictionary: &ColumnDictionary) -> Result<RowGroupMetadata> {
    let rg = as_object(rg, "row group")?;
    let start = get_i64_or(rg, "start", -1, "row group")?;
    let length = get_i64_or(rg, "length", -1, "row group")?;
    let row_count = get_i64_or(rg, "rowCount", -1, "row group")?;

    let mut host_affinity = BTreeMap::new();
    if let Some(hosts) = rg.get("hostAffinity") {
        for (host, fraction) in as_object(hosts, "hostAffinity")? {
            let fraction = fraction.as_f64().ok_or_else(|| {
                MetaCacheError::invalid_json(format!(
                    "hostAffinity[{host}] must be a number, got {fraction}"
                ))
            })?;
            host_affinity.insert(host.clone(), fraction as f32);
        }
    }

    let mut columns = Vec::new();
    for column in as_array(require(rg, "columns", "row group")?, "columns")? {
        if let Some(stats) = parse_column_statistics(column, dictionary)? {
            columns.push(stats);
        }
    }

    Ok(RowGroupMetadata {
        start,
        length,
        row_count,
        host_affinity,
        columns,
    })
}

/// `None` when the record carries no information (zero nulls, no value).
fn parse_column_statistics(
    column: &JsonValue,
    dictionary: &ColumnDictionary,
) -> Result<Option<ColumnStatistics>> {
    let column = as_object(column, "column")?;
    let nulls = get_i64_or(column, "nulls", 0, "column")?;
    let mx_value = column.get("mxValue").filter(|v| !v.is_null());

    if nulls == 0 && mx_value.is_none() {
        return Ok(None);
    }

    let name = parse_name(require(column, "name", "column")?, "column")?;
    let column_ref = dictionary.lookup(&dotted_name(&name))?;
    let column_type = dictionary.get(column_ref)?;

    let statistic = match mx_value {
        None => None,
        Some(raw) => {
            let primitive = column_type.primitive_type.ok_or_else(|| {
                MetaCacheError::unsupported_type(format!(
                    "column '{}' has a statistic but no primitive type",
                    column_type.dotted_name()
                ))
            })?;
            Some(StatisticValue::from_json(primitive, raw)?)
        }
    };

    Ok(ColumnStatistics::new(column_ref, nulls, statistic))
}

// --- JSON accessors ---

fn require<'a>(obj: &'a Map<String, JsonValue>, field: &str, ctx: &str) -> Result<&'a JsonValue> {
    obj.get(field)
        .ok_or_else(|| MetaCacheError::invalid_json(format!("{ctx} is missing '{field}'")))
}

fn as_object<'a>(value: &'a JsonValue, ctx: &str) -> Result<&'a Map<String, JsonValue>> {
    value
        .as_object()
        .ok_or_else(|| MetaCacheError::invalid_json(format!("{ctx} must be an object")))
}

fn as_array<'a>(value: &'a JsonValue, ctx: &str) -> Result<&'a Vec<JsonValue>> {
    value
        .as_array()
        .ok_or_else(|| MetaCacheError::invalid_json(format!("{ctx} must be an array")))
}

fn get_str<'a>(obj: &'a Map<String, JsonValue>, field: &str, ctx: &str) -> Result<&'a str> {
    let value = require(obj, field, ctx)?;
    value
        .as_str()
        .ok_or_else(|| MetaCacheError::invalid_json(format!("{field} must be a string, got {value}")))
}

fn get_i64_or(obj: &Map<String, JsonValue>, field: &str, default: i64, ctx: &str) -> Result<i64> {
    match obj.get(field) {
        None => Ok(default),
        Some(value) => value.as_i64().ok_or_else(|| {
            MetaCacheError::invalid_json(format!("{ctx}.{field} must be an integer, got {value}"))
        }),
    }
}

fn parse_name(value: &JsonValue, ctx: &str) -> Result<Vec<String>> {
    as_array(value, ctx)?
        .iter()
        .map(|seg| {
            seg.as_str().map(str::to_string).ok_or_else(|| {
                MetaCacheError::invalid_json(format!("{ctx}: name segment must be a string, got {seg}"))
            })
        })
        .collect()
}
