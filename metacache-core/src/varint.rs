//! LEB128 varints, zigzag signed encoding, and the small cursor helpers
//! every sub-message codec is built from.

use crate::error::{MetaCacheError, Result};

/// Longest LEB128 encoding of a u64.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` to `buf` as LEB128, low 7-bit group first.
pub fn encode_varint(value: u64, buf: &mut Vec<u8>) {
    let mut rest = value;
    while rest >= 0x80 {
        buf.push((rest as u8 & 0x7F) | 0x80);
        rest >>= 7;
    }
    buf.push(rest as u8);
}

/// Read one LEB128 value at `*pos` and move `*pos` past it.
pub fn decode_varint(buf: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some(&byte) = buf.get(*pos) else {
            return Err(MetaCacheError::framing("unexpected end of data in varint"));
        };
        *pos += 1;
        value = accumulate(value, shift, byte)?;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

/// OR the 7-bit group of `byte` into `value` at bit `shift`.
///
/// At most ten groups fit a u64, and the tenth may only carry bit 63.
/// Anything past that is a malformed prefix.
#[inline]
pub(crate) fn accumulate(value: u64, shift: u32, byte: u8) -> Result<u64> {
    let group = u64::from(byte & 0x7F);
    let fits = match shift {
        0..=56 => true,
        63 => group <= 1,
        _ => false,
    };
    if !fits {
        return Err(MetaCacheError::framing(format!(
            "varint overflow: more than {MAX_VARINT_LEN} bytes or value exceeds u64"
        )));
    }
    Ok(value | (group << shift))
}

/// Signed -> unsigned so small magnitudes stay short: 0, -1, 1, -2 -> 0, 1, 2, 3.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}

// ---- Field helpers shared by the sub-message codecs ----

pub(crate) fn encode_i64(value: i64, buf: &mut Vec<u8>) {
    encode_varint(zigzag_encode(value), buf);
}

pub(crate) fn decode_i64(buf: &[u8], pos: &mut usize) -> Result<i64> {
    Ok(zigzag_decode(decode_varint(buf, pos)?))
}

pub(crate) fn encode_len_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    encode_varint(bytes.len() as u64, buf);
    buf.extend_from_slice(bytes);
}

pub(crate) fn encode_str(s: &str, buf: &mut Vec<u8>) {
    encode_len_bytes(s.as_bytes(), buf);
}

pub(crate) fn take<'a>(buf: &'a [u8], pos: &mut usize, len: usize, ctx: &str) -> Result<&'a [u8]> {
    let end = pos
        .checked_add(len)
        .filter(|end| *end <= buf.len())
        .ok_or_else(|| {
            MetaCacheError::framing(format!(
                "truncated at {ctx} (need {len} bytes at offset {}, have {})",
                *pos,
                buf.len()
            ))
        })?;
    let slice = &buf[*pos..end];
    *pos = end;
    Ok(slice)
}

pub(crate) fn decode_len_bytes<'a>(buf: &'a [u8], pos: &mut usize, ctx: &str) -> Result<&'a [u8]> {
    let len = decode_varint(buf, pos)?;
    let len = usize::try_from(len)
        .map_err(|_| MetaCacheError::framing(format!("{ctx} length {len} does not fit in memory")))?;
    take(buf, pos, len, ctx)
}

pub(crate) fn decode_str(buf: &[u8], pos: &mut usize, ctx: &str) -> Result<String> {
    let bytes = decode_len_bytes(buf, pos, ctx)?;
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| MetaCacheError::framing(format!("invalid UTF-8 in {ctx}: {e}")))
}

pub(crate) fn decode_u8(buf: &[u8], pos: &mut usize, ctx: &str) -> Result<u8> {
    Ok(take(buf, pos, 1, ctx)?[0])
}

/// Decode an element count, refusing counts that cannot possibly fit in the
/// remaining bytes (every element occupies at least one byte).
pub(crate) fn decode_count(buf: &[u8], pos: &mut usize, ctx: &str) -> Result<usize> {
    let count = decode_varint(buf, pos)?;
    let remaining = (buf.len() - *pos) as u64;
    if count > remaining {
        return Err(MetaCacheError::framing(format!(
            "{ctx} count {count} exceeds remaining {remaining} bytes"
        )));
    }
    Ok(count as usize)
}
