//! # Metadata - per-table list state and checksum
//!
//! Stored next to the prefix file as `<table>.metadata`:
//!
//! ```text
//! [state_len: u32 LE][state bytes][checksum_len: u32 LE][checksum bytes]
//! ```
//!
//! The record is rewritten wholesale after every applied update. Writes go
//! to a `.tmp` sibling first, are fsynced, then renamed over the old file.

use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Opaque protocol state persisted alongside a table's prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub state: Vec<u8>,
    pub checksum: Vec<u8>,
}

/// Writes `record` to `path`, replacing any previous record.
///
/// # Errors
///
/// Any I/O failure. The previous file, if any, is left untouched on error.
pub fn write_metadata(path: &Path, record: &MetadataRecord) -> io::Result<()> {
    let tmp_path = path.with_extension("metadata.tmp");

    let result = (|| -> io::Result<()> {
        let f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        let mut w = BufWriter::new(f);
        codec::write_bytes(&mut w, &record.state)?;
        codec::write_bytes(&mut w, &record.checksum)?;
        w.flush()?;
        w.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    debug!(
        "wrote metadata to {} (state {} bytes, checksum {} bytes)",
        path.display(),
        record.state.len(),
        record.checksum.len()
    );
    Ok(())
}

/// Reads the record stored at `path`.
///
/// # Errors
///
/// `NotFound` if the file does not exist, `UnexpectedEof` if it is truncated.
pub fn load_metadata(path: &Path) -> io::Result<MetadataRecord> {
    let mut r = BufReader::new(File::open(path)?);
    let state = codec::read_bytes(&mut r)?;
    let checksum = codec::read_bytes(&mut r)?;
    Ok(MetadataRecord { state, checksum })
}
