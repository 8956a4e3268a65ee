//! Structural comparison of two decoded caches.
//!
//! [`diff`] never mutates its inputs. It reports header and dictionary
//! differences independently of the file list, and inside the file list
//! only the first differing location: once two files diverge, everything
//! after that point is usually noise.

use crate::metadata::{
    same_host_affinity, ColumnStatistics, ParquetFileMetadata, RowGroupMetadata, TableMetadata,
};
use crate::types::ColumnTypeInfo;
use std::fmt;

/// One reported difference: a dotted location plus an optional
/// `left vs right` detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub location: String,
    pub detail: Option<String>,
}

impl Difference {
    fn at(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            detail: None,
        }
    }

    fn values(location: impl Into<String>, left: impl fmt::Display, right: impl fmt::Display) -> Self {
        Self {
            location: location.into(),
            detail: Some(format!("{left} vs {right}")),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.location, detail),
            None => f.write_str(&self.location),
        }
    }
}

/// Whether `a` and `b` are structurally identical.
pub fn identical(a: &TableMetadata, b: &TableMetadata) -> bool {
    a == b
}

/// List the differences between `a` and `b`. Empty iff they are identical.
pub fn diff(a: &TableMetadata, b: &TableMetadata) -> Vec<Difference> {
    let mut out = Vec::new();
    if a == b {
        return out;
    }

    if a.header.version != b.header.version {
        out.push(Difference::values(
            "header.metadata_version",
            &a.header.version,
            &b.header.version,
        ));
    }
    if a.header.directories != b.header.directories {
        out.push(Difference::at("header.directories"));
    }

    let (left, right) = (a.dictionary.columns(), b.dictionary.columns());
    if left.len() != right.len() {
        out.push(Difference::values("files.columnsCount", left.len(), right.len()));
    } else if let Some((id, (l, r))) = left.iter().zip(right).enumerate().find(|(_, (l, r))| l != r) {
        out.push(Difference::values(
            format!("files.columns[{id}]"),
            describe_column(l),
            describe_column(r),
        ));
    }

    if a.files.len() != b.files.len() {
        out.push(Difference::values("files.filesCount", a.files.len(), b.files.len()));
    } else if let Some(d) = a
        .files
        .iter()
        .zip(&b.files)
        .enumerate()
        .find_map(|(i, (fa, fb))| diff_file(a, b, i, fa, fb))
    {
        out.push(d);
    }

    out
}

fn describe_column(c: &ColumnTypeInfo) -> String {
    format!(
        "{} {}{}",
        c.dotted_name(),
        c.primitive_type.map_or("null", |t| t.as_str()),
        c.original_type.map(|t| format!("/{t}")).unwrap_or_default()
    )
}

fn diff_file(
    a: &TableMetadata,
    b: &TableMetadata,
    index: usize,
    fa: &ParquetFileMetadata,
    fb: &ParquetFileMetadata,
) -> Option<Difference> {
    let loc = format!("files[{index}]");
    if fa.path != fb.path {
        return Some(Difference::values(format!("{loc}.path"), &fa.path, &fb.path));
    }
    if fa.length != fb.length {
        return Some(Difference::values(format!("{loc}.length"), fa.length, fb.length));
    }
    if fa.row_groups.len() != fb.row_groups.len() {
        return Some(Difference::values(
            format!("{loc}.rowGroupsCount"),
            fa.row_groups.len(),
            fb.row_groups.len(),
        ));
    }
    fa.row_groups
        .iter()
        .zip(&fb.row_groups)
        .enumerate()
        .find_map(|(j, (ra, rb))| diff_row_group(a, b, &format!("{loc}.rowGroups[{j}]"), ra, rb))
}

fn diff_row_group(
    a: &TableMetadata,
    b: &TableMetadata,
    loc: &str,
    ra: &RowGroupMetadata,
    rb: &RowGroupMetadata,
) -> Option<Difference> {
    if ra.start != rb.start {
        return Some(Difference::values(format!("{loc}.start"), ra.start, rb.start));
    }
    if ra.length != rb.length {
        return Some(Difference::values(format!("{loc}.length"), ra.length, rb.length));
    }
    if ra.row_count != rb.row_count {
        return Some(Difference::values(format!("{loc}.rowCount"), ra.row_count, rb.row_count));
    }
    if !same_host_affinity(&ra.host_affinity, &rb.host_affinity) {
        return Some(Difference::at(format!("{loc}.hostAffinity")));
    }
    if ra.columns.len() != rb.columns.len() {
        return Some(Difference::values(
            format!("{loc}.columnsCount"),
            ra.columns.len(),
            rb.columns.len(),
        ));
    }
    ra.columns
        .iter()
        .zip(&rb.columns)
        .enumerate()
        .find(|(_, (ca, cb))| ca != cb)
        .map(|(k, (ca, cb))| {
            Difference::values(
                format!("{loc}.columns[{k}]"),
                describe_stats(a, ca),
                describe_stats(b, cb),
            )
        })
}

fn describe_stats(table: &TableMetadata, stats: &ColumnStatistics) -> String {
    let name = table
        .column_type(stats)
        .map(|c| c.dotted_name())
        .unwrap_or_else(|_| format!("#{}", stats.column_ref));
    match &stats.statistic {
        Some(value) => format!("{name} nulls={} {}({})", stats.nulls, value.kind(), value.to_json()),
        None => format!("{name} nulls={}", stats.nulls),
    }
}
