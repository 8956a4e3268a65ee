//! Binary cache encoder/decoder.
//!
//! # Layout
//!
//! ```text
//! block1 := varint(len) Header
//! block2 := varint(len) Dictionary
//! block3 := varint(fileCount) { varint(len) File }*fileCount
//! ```
//!
//! Sub-message layouts:
//!
//! ```text
//! Header     := str(version) varint(dirCount) str(dir)*
//! File       := str(path) zigzag(length) varint(rgCount) RowGroup*
//! RowGroup   := zigzag(start) zigzag(length) zigzag(rowCount)
//!               varint(hostCount) { str(host) f32le(fraction) }*
//!               varint(colCount) ColumnStats*
//! ColumnStats:= varint(columnRef) u8(flags) [zigzag(nulls)] [statistic]
//! ```
//!
//! The dictionary section is described in [`crate::dictionary`], statistic
//! payloads in [`crate::statistics`]. Each file is framed separately so a
//! reader never has to hold more than one file's bytes at a time.

use crate::config::{CodecConfig, METADATA_VERSION};
use crate::dictionary::ColumnDictionary;
use crate::error::{MetaCacheError, Result};
use crate::framing::{BlockReader, BlockWriter};
use crate::metadata::{ColumnStatistics, Header, ParquetFileMetadata, RowGroupMetadata, TableMetadata};
use crate::statistics::{read_statistic, write_statistic};
use crate::varint::{
    decode_count, decode_i64, decode_str, decode_u8, decode_varint, encode_i64, encode_str,
    encode_varint, take,
};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

// --- Column record flag bits ---
const FLAG_NULLS: u8 = 0x01;
const FLAG_STATISTIC: u8 = 0x02;
const KNOWN_FLAGS: u8 = FLAG_NULLS | FLAG_STATISTIC;

// =============================================================================
// Encode
// =============================================================================

/// Encode `table` into `writer`. Returns the number of bytes written.
///
/// Fails without writing anything further on the first invalid record; the
/// caller must discard whatever was already written.
pub fn encode_table<W: Write>(table: &TableMetadata, writer: W) -> Result<u64> {
    let _span = tracing::debug_span!(
        "metacache_encode",
        files = table.files.len(),
        columns = table.dictionary.len()
    )
    .entered();

    let mut out = BlockWriter::new(writer);

    let mut buf = Vec::new();
    encode_header(&table.header, &mut buf)?;
    out.write_block(&buf)?;

    out.write_block(&table.dictionary.serialize())?;

    out.write_varint(table.files.len() as u64)?;
    for file in &table.files {
        buf.clear();
        encode_file(file, &table.dictionary, &mut buf)?;
        out.write_block(&buf)?;
    }

    let written = out.bytes_written();
    out.finish()?;
    tracing::debug!(bytes = written, files = table.files.len(), "cache encoded");
    Ok(written)
}

/// Encode `table` into a fresh buffer.
pub fn encode_to_vec(table: &TableMetadata) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_table(table, &mut out)?;
    Ok(out)
}

/// Encode `table` into the file at `path`, removing the file again if
/// encoding fails part way.
pub fn write_cache_file(path: &Path, table: &TableMetadata) -> Result<u64> {
    let file = File::create(path)?;
    match encode_table(table, BufWriter::new(file)) {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(rm) = std::fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %rm, "could not remove partial cache file");
            }
            Err(e)
        }
    }
}

fn encode_header(header: &Header, buf: &mut Vec<u8>) -> Result<()> {
    if header.version != METADATA_VERSION {
        return Err(MetaCacheError::InvalidVersion(header.version.clone()));
    }
    encode_str(&header.version, buf);
    encode_varint(header.directories.len() as u64, buf);
    for dir in &header.directories {
        encode_str(dir, buf);
    }
    Ok(())
}

fn encode_file(file: &ParquetFileMetadata, dict: &ColumnDictionary, buf: &mut Vec<u8>) -> Result<()> {
    encode_str(&file.path, buf);
    encode_i64(file.length, buf);
    encode_varint(file.row_groups.len() as u64, buf);
    for rg in &file.row_groups {
        encode_row_group(rg, dict, buf)?;
    }
    Ok(())
}

fn encode_row_group(rg: &RowGroupMetadata, dict: &ColumnDictionary, buf: &mut Vec<u8>) -> Result<()> {
    encode_i64(rg.start, buf);
    encode_i64(rg.length, buf);
    encode_i64(rg.row_count, buf);

    encode_varint(rg.host_affinity.len() as u64, buf);
    for (host, fraction) in &rg.host_affinity {
        encode_str(host, buf);
        buf.extend_from_slice(&fraction.to_le_bytes());
    }

    let present = rg.columns.iter().filter(|c| !c.is_empty()).count();
    encode_varint(present as u64, buf);
    for column in rg.columns.iter().filter(|c| !c.is_empty()) {
        encode_column(column, dict, buf)?;
    }
    Ok(())
}

fn encode_column(stats: &ColumnStatistics, dict: &ColumnDictionary, buf: &mut Vec<u8>) -> Result<()> {
    let column = dict.get(stats.column_ref)?;

    encode_varint(stats.column_ref as u64, buf);
    let mut flags = 0u8;
    if stats.nulls != 0 {
        flags |= FLAG_NULLS;
    }
    if stats.statistic.is_some() {
        flags |= FLAG_STATISTIC;
    }
    buf.push(flags);

    if stats.nulls != 0 {
        encode_i64(stats.nulls, buf);
    }
    if let Some(value) = &stats.statistic {
        write_statistic(column, value, buf)?;
    }
    Ok(())
}

// =============================================================================
// Decode
// =============================================================================

/// Decode a cache from `reader`, consuming at most `config.size_limit` bytes.
///
/// Sections are read strictly in order; the dictionary is fully decoded
/// before any row-group column record is touched.
pub fn decode_table<R: Read>(reader: R, config: &CodecConfig) -> Result<TableMetadata> {
    let _span = tracing::debug_span!("metacache_decode", size_limit = config.size_limit).entered();

    let mut input = BlockReader::new(reader, config.size_limit);

    let header = decode_header(&input.read_block()?)?;
    let dictionary = ColumnDictionary::deserialize(&input.read_block()?)?;

    let file_count = input.read_varint()?;
    let mut files = Vec::with_capacity(file_count.min(4096) as usize);
    for index in 0..file_count {
        let block = input.read_block()?;
        let file = decode_file(&block, &dictionary).map_err(|e| match e {
            MetaCacheError::Framing(msg) => MetaCacheError::framing(format!("file #{index}: {msg}")),
            other => other,
        })?;
        files.push(file);
    }
    input.expect_eof()?;

    tracing::debug!(
        bytes = input.consumed(),
        files = files.len(),
        columns = dictionary.len(),
        "cache decoded"
    );

    Ok(TableMetadata {
        header,
        dictionary,
        files,
    })
}

/// Decode a cache held in memory.
pub fn decode_from_slice(bytes: &[u8], config: &CodecConfig) -> Result<TableMetadata> {
    decode_table(bytes, config)
}

/// Decode the cache file at `path`.
pub fn read_cache_file(path: &Path, config: &CodecConfig) -> Result<TableMetadata> {
    let file = File::open(path)?;
    decode_table(BufReader::new(file), config)
}

fn decode_header(data: &[u8]) -> Result<Header> {
    let mut pos = 0;
    let version = decode_str(data, &mut pos, "metadata version")?;
    if version != METADATA_VERSION {
        return Err(MetaCacheError::InvalidVersion(version));
    }
    let count = decode_count(data, &mut pos, "directories")?;
    let mut directories = Vec::with_capacity(count);
    for _ in 0..count {
        directories.push(decode_str(data, &mut pos, "directory")?);
    }
    expect_consumed(data, pos, "header")?;
    Ok(Header {
        version,
        directories,
    })
}

fn decode_file(data: &[u8], dict: &ColumnDictionary) -> Result<ParquetFileMetadata> {
    let mut pos = 0;
    let path = decode_str(data, &mut pos, "file path")?;
    let length = decode_i64(data, &mut pos)?;
    let rg_count = decode_count(data, &mut pos, "row groups")?;
    let mut row_groups = Vec::with_capacity(rg_count);
    for _ in 0..rg_count {
        row_groups.push(decode_row_group(data, &mut pos, dict)?);
    }
    expect_consumed(data, pos, "file")?;
    Ok(ParquetFileMetadata {
        path,
        length,
        row_groups,
    })
}

fn decode_row_group(data: &[u8], pos: &mut usize, dict: &ColumnDictionary) -> Result<RowGroupMetadata> {
    let start = decode_i64(data, pos)?;
    let length = decode_i64(data, pos)?;
    let row_count = decode_i64(data, pos)?;

    let host_count = decode_count(data, pos, "host affinity")?;
    let mut host_affinity = BTreeMap::new();
    for _ in 0..host_count {
        let host = decode_str(data, pos, "host name")?;
        let arr: [u8; 4] = take(data, pos, 4, "host fraction")?
            .try_into()
            .map_err(|_| MetaCacheError::framing("host fraction width"))?;
        if host_affinity.insert(host, f32::from_le_bytes(arr)).is_some() {
            return Err(MetaCacheError::framing("duplicate host in affinity map"));
        }
    }

    let col_count = decode_count(data, pos, "row group columns")?;
    let mut columns = Vec::with_capacity(col_count);
    for _ in 0..col_count {
        columns.push(decode_column(data, pos, dict)?);
    }

    Ok(RowGroupMetadata {
        start,
        length,
        row_count,
        host_affinity,
        columns,
    })
}

fn decode_column(data: &[u8], pos: &mut usize, dict: &ColumnDictionary) -> Result<ColumnStatistics> {
    let raw_ref = decode_varint(data, pos)?;
    let column_ref = u32::try_from(raw_ref)
        .map_err(|_| MetaCacheError::column_not_found(format!("id {raw_ref} out of range")))?;
    let column = dict.get(column_ref)?;

    let flags = decode_u8(data, pos, "column flags")?;
    if flags & !KNOWN_FLAGS != 0 {
        return Err(MetaCacheError::framing(format!("unknown column flags {flags:#04x}")));
    }
    if flags == 0 {
        return Err(MetaCacheError::framing(format!(
            "empty record for column '{}'",
            column.dotted_name()
        )));
    }

    let nulls = if flags & FLAG_NULLS != 0 {
        let nulls = decode_i64(data, pos)?;
        if nulls == 0 {
            return Err(MetaCacheError::framing("null count flagged but zero"));
        }
        nulls
    } else {
        0
    };
    let statistic = if flags & FLAG_STATISTIC != 0 {
        Some(read_statistic(column, data, pos)?)
    } else {
        None
    };

    Ok(ColumnStatistics {
        column_ref,
        nulls,
        statistic,
    })
}

fn expect_consumed(data: &[u8], pos: usize, section: &str) -> Result<()> {
    if pos != data.len() {
        return Err(MetaCacheError::framing(format!(
            "{} trailing bytes in {section} section",
            data.len() - pos
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
