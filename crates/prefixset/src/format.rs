//! On-disk layout of a [`FilePrefixStore`](crate::FilePrefixStore) file.
//!
//! ```text
//! [magic: u32 LE = "VLP1"][group_count: u32 LE]
//! repeated group_count times:
//!     [prefix_len: u32 LE][blob_len: u32 LE][blob]
//! [crc32: u32 LE]   covers every byte before it
//! ```

use std::io::{self, Read, Write};

use crate::PrefixMap;

/// Magic number identifying a prefix store file (ASCII "VLP1").
pub const STORE_MAGIC: u32 = 0x564C_5031;

/// Smallest valid file: magic + group count + crc.
pub const STORE_MIN_BYTES: usize = 4 + 4 + 4;

/// Serializes the header and groups of `map` (everything except the CRC).
pub fn write_body<W: Write>(w: &mut W, map: &PrefixMap) -> io::Result<()> {
    codec::write_u32(w, STORE_MAGIC)?;
    codec::write_u32(w, map.group_count() as u32)?;
    for (length, blob) in map.iter() {
        codec::write_u32(w, length)?;
        codec::write_bytes(w, blob)?;
    }
    Ok(())
}

/// Parses a body written by [`write_body`] into raw `(length, blob)` groups.
///
/// Group invariants are left to the caller.
pub fn read_body<R: Read>(r: &mut R) -> io::Result<Vec<(u32, Vec<u8>)>> {
    let magic = codec::read_u32(r)?;
    if magic != STORE_MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unknown prefix store magic: {:#x}", magic),
        ));
    }

    let group_count = codec::read_u32(r)?;
    let mut groups = Vec::new();
    for _ in 0..group_count {
        let length = codec::read_u32(r)?;
        let blob = codec::read_bytes(r)?;
        groups.push((length, blob));
    }
    Ok(groups)
}
