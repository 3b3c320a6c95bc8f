use std::collections::BTreeMap;

use thiserror::Error;

/// Violations of the [`PrefixMap`] invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixMapError {
    /// Prefix length 0 cannot be stepped through.
    #[error("prefix length must be non-zero")]
    ZeroLength,

    /// The blob does not split evenly into prefixes of the declared length.
    #[error("blob of {blob_len} bytes is not a multiple of prefix length {length}")]
    MisalignedBlob { length: u32, blob_len: usize },

    /// Two neighbouring prefixes are out of order, or equal.
    #[error("prefix #{index} of length {length} is not strictly greater than its predecessor")]
    Unsorted { length: u32, index: usize },
}

/// Mapping from prefix byte-length to the sorted concatenation of all
/// prefixes of that length.
///
/// Groups are never empty: inserting or appending zero bytes leaves the map
/// unchanged, so two maps holding the same prefixes always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    groups: BTreeMap<u32, Vec<u8>>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from individual prefixes in any order.
    ///
    /// Prefixes are grouped by length, sorted and deduplicated. Empty
    /// prefixes are ignored.
    pub fn from_prefixes<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut grouped: BTreeMap<u32, Vec<Vec<u8>>> = BTreeMap::new();
        for p in prefixes {
            let p = p.as_ref();
            if p.is_empty() {
                continue;
            }
            grouped.entry(p.len() as u32).or_default().push(p.to_vec());
        }

        let mut map = Self::new();
        for (length, mut items) in grouped {
            items.sort();
            items.dedup();
            map.groups.insert(length, items.concat());
        }
        map
    }

    /// Replaces the group for `length` with `blob`.
    ///
    /// Only the alignment is checked here; call [`validate`](Self::validate)
    /// for the ordering invariant.
    pub fn insert(&mut self, length: u32, blob: Vec<u8>) -> Result<(), PrefixMapError> {
        if length == 0 {
            return Err(PrefixMapError::ZeroLength);
        }
        if blob.len() % length as usize != 0 {
            return Err(PrefixMapError::MisalignedBlob {
                length,
                blob_len: blob.len(),
            });
        }
        if blob.is_empty() {
            self.groups.remove(&length);
        } else {
            self.groups.insert(length, blob);
        }
        Ok(())
    }

    /// Appends one prefix to the group matching its length.
    ///
    /// The caller is responsible for appending in sorted order.
    pub fn append_prefix(&mut self, prefix: &[u8]) {
        if prefix.is_empty() {
            return;
        }
        self.groups
            .entry(prefix.len() as u32)
            .or_default()
            .extend_from_slice(prefix);
    }

    /// Appends a run of whole prefixes to the group for `length`.
    pub(crate) fn extend_group(&mut self, length: u32, bytes: &[u8]) {
        debug_assert_eq!(bytes.len() % length as usize, 0);
        if bytes.is_empty() {
            return;
        }
        self.groups.entry(length).or_default().extend_from_slice(bytes);
    }

    /// Returns the blob for `length`, if any prefixes of that length exist.
    pub fn get(&self, length: u32) -> Option<&[u8]> {
        self.groups.get(&length).map(|b| b.as_slice())
    }

    /// Iterates `(length, blob)` pairs in ascending length order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.groups.iter().map(|(&len, blob)| (len, blob.as_slice()))
    }

    /// Number of distinct prefix lengths present.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of prefixes across all lengths.
    pub fn count(&self) -> usize {
        self.groups
            .iter()
            .map(|(&len, blob)| blob.len() / len as usize)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Bytes held by the group blobs (capacity, not length).
    pub fn heap_size(&self) -> usize {
        self.groups.values().map(|b| b.capacity()).sum()
    }

    /// Checks that every group is strictly increasing.
    pub fn validate(&self) -> Result<(), PrefixMapError> {
        for (&length, blob) in &self.groups {
            let mut prev: Option<&[u8]> = None;
            for (index, item) in blob.chunks_exact(length as usize).enumerate() {
                if let Some(p) = prev {
                    if item <= p {
                        return Err(PrefixMapError::Unsorted { length, index });
                    }
                }
                prev = Some(item);
            }
        }
        Ok(())
    }

    /// Returns `true` if [`validate`](Self::validate) would succeed.
    #[must_use]
    pub fn is_strictly_sorted(&self) -> bool {
        self.validate().is_ok()
    }
}
