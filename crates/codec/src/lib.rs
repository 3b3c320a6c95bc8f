//! # Codec - length-prefixed value framing
//!
//! Small helpers for reading and writing values to a byte stream. There are
//! exactly two framings:
//!
//! ```text
//! scalar:      [value: u32 LE]
//! byte string: [len: u32 LE][bytes ...]
//! ```
//!
//! The codec does no semantic validation. The only check it performs is the
//! [`MAX_VALUE_BYTES`] cap in [`read_bytes`], which keeps a corrupt length
//! field from turning into a multi-gigabyte allocation.
//!
//! Every failure, including a short read or short write, surfaces as a
//! [`std::io::Error`].

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Largest byte string [`read_bytes`] will allocate for (16 MiB).
pub const MAX_VALUE_BYTES: usize = 16 * 1024 * 1024;

/// Writes a fixed-size `u32` scalar.
pub fn write_u32<W: Write>(w: &mut W, value: u32) -> io::Result<()> {
    w.write_u32::<LittleEndian>(value)
}

/// Reads a fixed-size `u32` scalar.
pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    r.read_u32::<LittleEndian>()
}

/// Writes a byte string as `[len: u32][bytes]`.
///
/// # Errors
///
/// Fails with `InvalidInput` if `value` is longer than `u32::MAX`, or with
/// the underlying error if the write is short.
pub fn write_bytes<W: Write>(w: &mut W, value: &[u8]) -> io::Result<()> {
    let len = u32::try_from(value.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("value of {} bytes does not fit a u32 length", value.len()),
        )
    })?;
    write_u32(w, len)?;
    w.write_all(value)
}

/// Reads a byte string written by [`write_bytes`].
///
/// # Errors
///
/// `UnexpectedEof` if the stream ends before the length field or the
/// payload is complete; `InvalidData` if the length exceeds
/// [`MAX_VALUE_BYTES`].
pub fn read_bytes<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let len = read_u32(r)? as usize;
    if len > MAX_VALUE_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("value length {} exceeds maximum {}", len, MAX_VALUE_BYTES),
        ));
    }
    let mut value = vec![0u8; len];
    r.read_exact(&mut value)?;
    Ok(value)
}
