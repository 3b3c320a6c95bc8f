/// Write path: build(), clear_prefixes(), apply_update().
///
/// Every successful update ends by rewriting the metadata file. A failed
/// update leaves both the stored prefixes and the metadata untouched.
use log::{info, warn};

use crate::{merge_partial_update, LookupCache, PrefixMap, PrefixStore, TableUpdate, UpdateError};

impl<S: PrefixStore> LookupCache<S> {
    /// Replaces the stored prefixes with `map`.
    pub fn build(&mut self, map: PrefixMap) -> Result<(), UpdateError> {
        self.store.set_prefixes(map)?;
        Ok(())
    }

    /// Returns a copy of the stored prefixes.
    pub fn get_prefixes(&self) -> Result<PrefixMap, UpdateError> {
        Ok(self.store.get_prefixes()?)
    }

    /// Empties the stored prefix set.
    pub fn clear_prefixes(&mut self) -> Result<(), UpdateError> {
        self.build(PrefixMap::new())
    }

    /// Merges a partial update into the stored prefixes.
    ///
    /// Only the prefixes are touched; see [`apply_update`](Self::apply_update)
    /// for the variant that also persists metadata.
    ///
    /// # Errors
    ///
    /// [`UpdateError::MalformedPrefixes`] if the update's own groups are not
    /// strictly sorted. Merge errors are reported to the anomaly sink and
    /// returned. Either way the store keeps its previous contents.
    pub fn apply_partial_update(&mut self, update: &TableUpdate) -> Result<(), UpdateError> {
        let old = self.store.get_prefixes()?;
        let merged = self.merged_prefixes(&old, update)?;
        self.build(merged)
    }

    /// Applies a full or partial update and persists its state and checksum.
    ///
    /// A full update replaces the prefixes outright and must not carry
    /// removal indices. If the metadata cannot be written, the previous
    /// prefixes are put back before the error is returned.
    pub fn apply_update(&mut self, update: &TableUpdate) -> Result<(), UpdateError> {
        let previous = self.store.get_prefixes()?;
        let next = self.merged_prefixes(&previous, update)?;
        self.build(next)?;

        if let Err(e) = self.write_metadata(update) {
            warn!(
                "metadata write for {} failed, restoring previous prefixes: {}",
                self.config.table_name, e
            );
            self.build(previous)?;
            return Err(e);
        }

        info!(
            "applied {} update to {}: +{} -{} prefixes",
            if update.full_update { "full" } else { "partial" },
            self.config.table_name,
            update.prefixes.count(),
            update.removal_indices.len()
        );
        Ok(())
    }

    /// Computes the prefix set `update` produces on top of `old`.
    fn merged_prefixes(
        &self,
        old: &PrefixMap,
        update: &TableUpdate,
    ) -> Result<PrefixMap, UpdateError> {
        update
            .prefixes
            .validate()
            .map_err(UpdateError::MalformedPrefixes)?;

        if update.full_update {
            if !update.removal_indices.is_empty() {
                return Err(self.report(UpdateError::RemovalIndexOutOfRange {
                    remaining: update.removal_indices.len(),
                }));
            }
            return Ok(update.prefixes.clone());
        }

        merge_partial_update(old, &update.prefixes, &update.removal_indices)
            .map_err(|e| self.report(e))
    }

    /// Hands a malformed-update error to the anomaly sink and passes it on.
    fn report(&self, err: UpdateError) -> UpdateError {
        if let Some(kind) = err.error_type() {
            self.sink.report(kind);
        }
        err
    }
}
