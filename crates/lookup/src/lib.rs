//! # Lookup - per-table prefix cache
//!
//! Ties a [`PrefixStore`] to the update protocol: full and partial updates
//! are applied to the stored prefixes, and the list state and checksum that
//! came with each update are persisted next to them.
//!
//! ## Update path
//!
//! ```text
//! TableUpdate
//!   |
//!   |  prefixes.validate() fails -> MalformedPrefixes, Err
//!   |
//!   |  full_update?
//!   |------ yes ----> build(prefixes)
//!   |
//!   no
//!   v
//! store.get_prefixes() --+
//!                        |--> merge_partial_update() --> build(merged)
//! update.prefixes -------+         |
//!                                  | DuplicatePrefix / WrongRemovalIndices /
//!                                  | InfiniteLoop -> AnomalySink, Err
//!                                  v
//!                         write_metadata(<table>.metadata)
//!                                  |
//!                                  | Err -> set_prefixes(previous), Err
//!                                  v
//!                                  Ok
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                                  |
//! |--------------|----------------------------------------------------------|
//! | [`update`]   | `TableUpdate`, the partial-update merge                  |
//! | [`apply`]    | `build()`, `clear_prefixes()`, `apply_update()`          |
//! | [`persist`]  | Prefix file and metadata file load/store                 |
//! | [`metadata`] | `MetadataRecord` binary format                           |
//! | [`error`]    | `UpdateError`, telemetry tags, anomaly sinks             |
//!
//! Mutating operations take `&mut self`; a cache never has two updates in
//! flight. Wrap it in a `Mutex` to share it between threads.
//!
//! Completion matching is not implemented yet: [`LookupCache::has`] always
//! reports "not found".

mod apply;
mod error;
mod metadata;
mod persist;
mod update;

pub use config::CacheConfig;
pub use error::{AnomalySink, LogSink, UpdateError, UpdateErrorType};
pub use metadata::{load_metadata, write_metadata, MetadataRecord};
pub use prefixset::{CursorSet, FilePrefixStore, PrefixMap, PrefixMapError, PrefixStore};
pub use update::{merge_partial_update, TableUpdate};

use log::debug;
use std::path::Path;

/// Outcome of a completion lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupResult {
    /// A stored prefix matched the completion.
    pub has: bool,
    /// The full hash is confirmed, no completion request needed.
    pub complete: bool,
}

/// A single table's prefix cache on top of a [`PrefixStore`].
pub struct LookupCache<S: PrefixStore> {
    pub(crate) config: CacheConfig,
    pub(crate) store: S,
    pub(crate) sink: Box<dyn AnomalySink>,
}

impl<S: PrefixStore> std::fmt::Debug for LookupCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupCache")
            .field("version", &Self::VERSION)
            .field("table_name", &self.config.table_name)
            .field("store_dir", &self.config.store_dir)
            .field("prefix_set_size", &self.store.size_of())
            .finish()
    }
}

impl<S: PrefixStore> LookupCache<S> {
    /// Protocol version of the lists this cache holds.
    pub const VERSION: u32 = 4;

    /// Creates a cache for `config.table_name` backed by `store`.
    ///
    /// Malformed updates are reported through [`LogSink`]; use
    /// [`with_sink`](Self::with_sink) to route them elsewhere.
    pub fn new(config: CacheConfig, store: S) -> Self {
        Self {
            config,
            store,
            sink: Box::new(LogSink),
        }
    }

    /// Replaces the anomaly sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn AnomalySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Creates the cache directory if it does not exist.
    pub fn init(&mut self) -> Result<(), UpdateError> {
        std::fs::create_dir_all(&self.config.store_dir)?;
        debug!(
            "initialized lookup cache for {} in {}",
            self.config.table_name,
            self.config.store_dir.display()
        );
        Ok(())
    }

    /// Completion lookup. Not supported yet: always "not found".
    pub fn has(&self, _completion: &[u8]) -> LookupResult {
        LookupResult::default()
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn store_dir(&self) -> &Path {
        &self.config.store_dir
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Memory used by the stored prefix set, as reported by the store.
    pub fn size_of_prefix_set(&self) -> usize {
        self.store.size_of()
    }
}

#[cfg(test)]
mod tests;
