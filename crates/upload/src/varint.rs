//! Unsigned LEB128 varints, the length prefix of an envelope.
//!
//! Seven bits per byte, least-significant group first; the high bit marks
//! that another byte follows.

/// Longest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `value` encodes to.
pub const fn uvarint_len(value: u64) -> usize {
    let mut len = 1;
    let mut rest = value >> 7;
    while rest != 0 {
        len += 1;
        rest >>= 7;
    }
    len
}

/// Appends the encoding of `value` to `buf`, returning the bytes written.
#[allow(clippy::cast_possible_truncation)]
pub fn put_uvarint(buf: &mut Vec<u8>, value: u64) -> usize {
    let start = buf.len();
    let mut rest = value;
    while rest >= 0x80 {
        buf.push((rest as u8) | 0x80);
        rest >>= 7;
    }
    buf.push(rest as u8);
    buf.len() - start
}

/// Reads a varint from the start of `buf`, returning `(value, bytes_consumed)`.
///
/// Returns `None` if `buf` ends mid-varint or the value overflows 64 bits.
pub fn read_uvarint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate().take(MAX_VARINT_LEN) {
        // The tenth byte may only carry the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return None;
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
