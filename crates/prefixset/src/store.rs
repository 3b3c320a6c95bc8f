use anyhow::{bail, Context, Result};
use crc32fast::Hasher as Crc32;
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::format::{read_body, write_body, STORE_MIN_BYTES};
use crate::PrefixMap;

/// Contract of the storage engine that holds a table's prefixes.
///
/// The lookup cache only ever replaces the contents wholesale
/// ([`set_prefixes`](Self::set_prefixes)) or reads them back in full.
pub trait PrefixStore {
    /// Replaces the stored prefixes with `map`.
    fn set_prefixes(&mut self, map: PrefixMap) -> Result<()>;

    /// Returns a copy of the stored prefixes.
    fn get_prefixes(&self) -> Result<PrefixMap>;

    /// Persists the stored prefixes to `path`.
    fn store_to_file(&self, path: &Path) -> Result<()>;

    /// Replaces the stored prefixes with the contents of `path`.
    fn load_from_file(&mut self, path: &Path) -> Result<()>;

    /// Approximate memory footprint in bytes.
    fn size_of(&self) -> usize;
}

/// A [`PrefixStore`] that keeps the map in memory and persists it as a
/// single CRC32-protected file.
///
/// Files are written to `<path>.tmp`, fsynced and renamed into place, so a
/// crash mid-write never leaves a torn store behind.
#[derive(Debug, Default)]
pub struct FilePrefixStore {
    map: PrefixMap,
}

impl FilePrefixStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the stored prefixes without copying.
    pub fn prefixes(&self) -> &PrefixMap {
        &self.map
    }
}

impl PrefixStore for FilePrefixStore {
    fn set_prefixes(&mut self, map: PrefixMap) -> Result<()> {
        self.map = map;
        Ok(())
    }

    fn get_prefixes(&self) -> Result<PrefixMap> {
        Ok(self.map.clone())
    }

    fn store_to_file(&self, path: &Path) -> Result<()> {
        let mut body = Vec::with_capacity(STORE_MIN_BYTES + self.map.heap_size());
        write_body(&mut body, &self.map)?;

        let mut hasher = Crc32::new();
        hasher.update(&body);
        let crc = hasher.finalize();

        let tmp_path = path.with_extension("tmp");
        let result = (|| -> Result<()> {
            let mut f = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)
                .with_context(|| format!("failed to create {}", tmp_path.display()))?;
            f.write_all(&body)?;
            codec::write_u32(&mut f, crc)?;
            f.flush()?;
            f.sync_all()?;
            drop(f);
            fs::rename(&tmp_path, path)
                .with_context(|| format!("failed to rename into {}", path.display()))
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result?;

        if let Some(parent) = path.parent() {
            if let Ok(dir) = fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        info!(
            "stored {} prefixes in {} groups to {}",
            self.map.count(),
            self.map.group_count(),
            path.display()
        );
        Ok(())
    }

    fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        if data.len() < STORE_MIN_BYTES {
            bail!("prefix store file too small ({} bytes)", data.len());
        }

        let (body, crc_bytes) = data.split_at(data.len() - 4);
        let expected_crc = codec::read_u32(&mut &crc_bytes[..])?;
        let mut hasher = Crc32::new();
        hasher.update(body);
        let actual_crc = hasher.finalize();
        if actual_crc != expected_crc {
            bail!(
                "CRC32 mismatch in {}: expected {:#010x}, got {:#010x} (data corruption)",
                path.display(),
                expected_crc,
                actual_crc
            );
        }

        let mut reader = body;
        let groups = read_body(&mut reader)?;
        if !reader.is_empty() {
            bail!("{} trailing bytes after prefix groups", reader.len());
        }

        let mut map = PrefixMap::new();
        for (length, blob) in groups {
            if map.get(length).is_some() {
                bail!("prefix length {} appears twice", length);
            }
            map.insert(length, blob)?;
        }
        map.validate()?;

        debug!("loaded {} prefixes from {}", map.count(), path.display());
        self.map = map;
        Ok(())
    }

    fn size_of(&self) -> usize {
        std::mem::size_of::<Self>() + self.map.heap_size()
    }
}
