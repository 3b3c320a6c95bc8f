//! # Config - lookup cache settings
//!
//! Settings come from environment variables with defaults:
//!
//! ```text
//! PREFIXCACHE_DIR     cache directory   (default: "data/safebrowsing")
//! PREFIXCACHE_TABLE   table name        (default: "goog-malware-proto")
//! ```
//!
//! A table owns two files inside the cache directory:
//!
//! ```text
//! <table>.vlpset      prefix store
//! <table>.metadata    list state + checksum
//! ```

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const ENV_STORE_DIR: &str = "PREFIXCACHE_DIR";
pub const ENV_TABLE: &str = "PREFIXCACHE_TABLE";

pub const DEFAULT_STORE_DIR: &str = "data/safebrowsing";
pub const DEFAULT_TABLE: &str = "goog-malware-proto";

/// Suffix of the prefix store file.
pub const PREFIX_FILE_SUFFIX: &str = ".vlpset";
/// Suffix of the metadata file.
pub const METADATA_FILE_SUFFIX: &str = ".metadata";

/// Where a lookup cache lives and which table it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub store_dir: PathBuf,
    pub table_name: String,
}

impl CacheConfig {
    /// # Errors
    ///
    /// Returns an error if `table_name` is not a valid table name
    /// (see [`validate_table_name`]).
    pub fn new<P: AsRef<Path>>(store_dir: P, table_name: &str) -> Result<Self> {
        validate_table_name(table_name)?;
        Ok(Self {
            store_dir: store_dir.as_ref().to_path_buf(),
            table_name: table_name.to_string(),
        })
    }

    /// Builds the config from `PREFIXCACHE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_dir = lookup(ENV_STORE_DIR).unwrap_or_else(|| DEFAULT_STORE_DIR.to_string());
        let table_name = lookup(ENV_TABLE).unwrap_or_else(|| DEFAULT_TABLE.to_string());
        Self::new(store_dir, &table_name)
    }

    /// `<store_dir>/<table>.vlpset`
    pub fn prefix_file_path(&self) -> PathBuf {
        self.store_dir.join(format!("{}{}", self.table_name, PREFIX_FILE_SUFFIX))
    }

    /// `<store_dir>/<table>.metadata`
    pub fn metadata_path(&self) -> PathBuf {
        self.store_dir.join(format!("{}{}", self.table_name, METADATA_FILE_SUFFIX))
    }
}

/// Table names become file names, so they must be a single plain path
/// component.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("table name must not be empty");
    }
    if name.starts_with('.') {
        bail!("table name '{}' must not start with '.'", name);
    }
    if name.contains(['/', '\\', '\0']) {
        bail!("table name '{}' contains a path separator", name);
    }
    Ok(())
}
