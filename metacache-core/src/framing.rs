//! Length-prefixed block framing over byte streams.
//!
//! A block is `varint(len) bytes(len)`. A cache file is three top-level
//! sections written back to back; see [`crate::codec`] for the layout.
//!
//! The reader charges every byte it consumes (prefixes included) against a
//! size limit, and checks a declared block length against that limit before
//! allocating anything for it.

use crate::error::{MetaCacheError, Result};
use crate::varint::{accumulate, encode_varint, MAX_VARINT_LEN};
use std::io::{self, Read, Write};

/// Write `varint(bytes.len())` followed by `bytes`.
pub fn write_block<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    BlockWriter::new(writer).write_block(bytes)
}

/// Read one block from an unbounded stream.
///
/// Prefer [`BlockReader`] when reading untrusted input so the size limit
/// applies across every block of the stream.
pub fn read_block<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    BlockReader::new(reader, u64::MAX).read_block()
}

/// Writes varints and blocks, counting bytes written.
#[derive(Debug)]
pub struct BlockWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> BlockWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Write a bare varint (used for the file count of the files section).
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
        encode_varint(value, &mut buf);
        self.inner.write_all(&buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    /// Write a length-prefixed block.
    pub fn write_block(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_varint(bytes.len() as u64)?;
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads varints and blocks under a cumulative size limit.
#[derive(Debug)]
pub struct BlockReader<R> {
    inner: R,
    consumed: u64,
    limit: u64,
}

impl<R: Read> BlockReader<R> {
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            consumed: 0,
            limit,
        }
    }

    /// Bytes consumed from the stream so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    fn charge(&mut self, n: u64) -> Result<()> {
        let requested = self.consumed.saturating_add(n);
        if requested > self.limit {
            return Err(MetaCacheError::SizeLimitExceeded {
                requested,
                limit: self.limit,
            });
        }
        self.consumed = requested;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read one LEB128 varint from the stream.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self
                .read_byte()?
                .ok_or_else(|| MetaCacheError::framing("stream ended inside a length prefix"))?;
            self.charge(1)?;
            result = accumulate(result, shift, byte)?;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Read a length prefix and exactly that many bytes.
    pub fn read_block(&mut self) -> Result<Vec<u8>> {
        let len = self.read_varint()?;
        self.charge(len)?;

        let mut buf = Vec::new();
        let got = (&mut self.inner).take(len).read_to_end(&mut buf)? as u64;
        if got != len {
            return Err(MetaCacheError::framing(format!(
                "stream ended early: block declares {len} bytes, only {got} available"
            )));
        }
        Ok(buf)
    }

    /// Fail if any byte remains in the stream.
    pub fn expect_eof(&mut self) -> Result<()> {
        match self.read_byte()? {
            None => Ok(()),
            Some(_) => Err(MetaCacheError::framing(format!(
                "trailing data after offset {}",
                self.consumed
            ))),
        }
    }
}
