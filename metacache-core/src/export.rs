//! JSON exporter: [`TableMetadata`] -> generic JSON tree.
//!
//! Produces the same shape [`crate::import`] consumes, so
//! `import_json(&export_json(&m))` reproduces `m`.

use crate::error::Result;
use crate::metadata::{ColumnStatistics, ParquetFileMetadata, RowGroupMetadata, TableMetadata};
use serde_json::{json, Map, Value as JsonValue};

/// Render `table` as a JSON tree.
///
/// Fails only if a row-group column references an id outside the
/// dictionary.
pub fn export_json(table: &TableMetadata) -> Result<JsonValue> {
    let mut column_types = Map::new();
    for (_, column) in table.dictionary.iter() {
        column_types.insert(
            column.dotted_name(),
            json!({
                "name": column.name,
                "primitiveType": column.primitive_type.map(|t| t.as_str()),
                "originalType": column.original_type.map(|t| t.as_str()),
            }),
        );
    }

    let files = table
        .files
        .iter()
        .map(|file| export_file(table, file))
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "metadata_version": table.header.version,
        "columnTypeInfo": column_types,
        "files": files,
        "directories": table.header.directories,
    }))
}

fn export_file(table: &TableMetadata, file: &ParquetFileMetadata) -> Result<JsonValue> {
    let row_groups = file
        .row_groups
        .iter()
        .map(|rg| export_row_group(table, rg))
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({
        "path": file.path,
        "length": file.length,
        "rowGroups": row_groups,
    }))
}

fn export_row_group(table: &TableMetadata, rg: &RowGroupMetadata) -> Result<JsonValue> {
    let hosts: Map<String, JsonValue> = rg
        .host_affinity
        .iter()
        .map(|(host, fraction)| (host.clone(), JsonValue::from(*fraction as f64)))
        .collect();
    let columns = rg
        .columns
        .iter()
        .map(|stats| export_column(table, stats))
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({
        "start": rg.start,
        "length": rg.length,
        "rowCount": rg.row_count,
        "hostAffinity": hosts,
        "columns": columns,
    }))
}

fn export_column(table: &TableMetadata, stats: &ColumnStatistics) -> Result<JsonValue> {
    let column = table.column_type(stats)?;
    let mut out = Map::new();
    out.insert("name".into(), json!(column.name));
    out.insert("nulls".into(), json!(stats.nulls));
    if let Some(value) = &stats.statistic {
        out.insert("mxValue".into(), value.to_json());
    }
    Ok(JsonValue::Object(out))
}
