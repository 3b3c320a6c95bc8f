//! # PrefixSet - length-keyed sorted prefix storage
//!
//! Hash prefixes are kept grouped by byte length. Every group is a single
//! blob: the concatenation of all prefixes of that length, sorted
//! lexicographically, with no duplicates.
//!
//! ```text
//! 4 -> [aaaa][abcd][bbbb]...
//! 5 -> [aaaaa][zzzzz]...
//! 32 -> [<32 bytes>]...
//! ```
//!
//! This crate provides:
//!
//! | Item            | Purpose                                                  |
//! |-----------------|----------------------------------------------------------|
//! | [`PrefixMap`]   | The length -> blob mapping with its invariants            |
//! | [`CursorSet`]   | Walks every group at once in global byte order            |
//! | [`PrefixStore`] | The storage engine contract used by the lookup cache      |
//! | [`FilePrefixStore`] | In-memory store with CRC-protected file persistence   |
//!
//! Global order is plain byte-string order across all lengths, so `aaaaa`
//! (5 bytes) sorts before `bbbb` (4 bytes), and `aaaa` sorts before `aaaaa`.

mod cursor;
mod format;
mod map;
mod store;

pub use cursor::CursorSet;
pub use format::{STORE_MAGIC, STORE_MIN_BYTES};
pub use map::{PrefixMap, PrefixMapError};
pub use store::{FilePrefixStore, PrefixStore};

#[cfg(test)]
mod tests;
