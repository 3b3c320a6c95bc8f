use log::debug;
use std::path::Path;

use crate::{
    load_metadata, write_metadata, LookupCache, MetadataRecord, PrefixStore, TableUpdate,
    UpdateError,
};

impl<S: PrefixStore> LookupCache<S> {
    /// Persists the stored prefixes to `path`.
    pub fn store_to_file(&self, path: &Path) -> Result<(), UpdateError> {
        self.store.store_to_file(path)?;
        Ok(())
    }

    /// Replaces the stored prefixes with the contents of `path`.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), UpdateError> {
        self.store.load_from_file(path)?;
        Ok(())
    }

    /// Persists the stored prefixes to `<store_dir>/<table>.vlpset`.
    pub fn save(&self) -> Result<(), UpdateError> {
        self.store_to_file(&self.config.prefix_file_path())
    }

    /// Loads `<store_dir>/<table>.vlpset` if it exists.
    ///
    /// Returns `false` and leaves the store untouched when there is no file.
    pub fn load(&mut self) -> Result<bool, UpdateError> {
        let path = self.config.prefix_file_path();
        if !path.exists() {
            debug!("no prefix file at {}", path.display());
            return Ok(false);
        }
        self.load_from_file(&path)?;
        Ok(true)
    }

    /// Writes the update's client state and checksum to `<table>.metadata`.
    pub fn write_metadata(&self, update: &TableUpdate) -> Result<(), UpdateError> {
        let record = MetadataRecord {
            state: update.client_state.clone(),
            checksum: update.checksum.clone(),
        };
        write_metadata(&self.config.metadata_path(), &record)?;
        Ok(())
    }

    /// Reads the state and checksum stored by the last applied update.
    pub fn load_metadata(&self) -> Result<MetadataRecord, UpdateError> {
        Ok(load_metadata(&self.config.metadata_path())?)
    }
}
