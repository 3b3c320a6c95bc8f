//! Ordered walk over every length group of a [`PrefixMap`].
//!
//! Each group gets a forward-only [`PrefixCursor`]. The current item of every
//! non-exhausted cursor sits in a min-heap, so [`CursorSet::get_smallest`]
//! pops the globally smallest prefix and refills from the same cursor.
//!
//! Nothing is copied: cursors hold slices borrowed from the map, and a
//! `CursorSet<'a>` cannot outlive the map it was built from.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::PrefixMap;

/// Read position inside one length group.
#[derive(Debug, Clone)]
pub(crate) struct PrefixCursor<'a> {
    data: &'a [u8],
    pos: usize,
    size: usize,
}

impl<'a> PrefixCursor<'a> {
    fn new(data: &'a [u8], size: usize) -> Self {
        Self { data, pos: 0, size }
    }

    /// The prefix under the cursor, or `None` once the group is exhausted.
    pub fn current(&self) -> Option<&'a [u8]> {
        let data = self.data;
        data.get(self.pos..self.pos + self.size)
    }

    /// Steps past the current prefix.
    pub fn advance(&mut self) {
        self.pos = (self.pos + self.size).min(self.data.len());
    }

    /// Unconsumed bytes, starting with the current prefix.
    pub fn remaining_bytes(&self) -> &'a [u8] {
        let data = self.data;
        &data[self.pos..]
    }

    /// Number of unconsumed prefixes.
    pub fn remaining(&self) -> usize {
        (self.data.len() - self.pos) / self.size
    }

    /// Byte length of every prefix in this group.
    pub fn prefix_len(&self) -> usize {
        self.size
    }
}

/// The current prefix of one cursor, ordered for a min-heap.
struct HeapEntry<'a> {
    prefix: &'a [u8],
    /// Index into `CursorSet::cursors`.
    source: usize,
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.source == other.source
    }
}

impl Eq for HeapEntry<'_> {}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest prefix is on top.
        // Two cursors never hold equal prefixes (different lengths), the
        // source tie-break only keeps the ordering total.
        other
            .prefix
            .cmp(self.prefix)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Cursors over all length groups of a [`PrefixMap`], yielding prefixes in
/// global byte-string order.
pub struct CursorSet<'a> {
    cursors: Vec<PrefixCursor<'a>>,
    heap: BinaryHeap<HeapEntry<'a>>,
    count: usize,
}

impl<'a> CursorSet<'a> {
    /// Places a cursor at the start of every group in `map`.
    pub fn new(map: &'a PrefixMap) -> Self {
        let mut cursors = Vec::with_capacity(map.group_count());
        let mut heap = BinaryHeap::with_capacity(map.group_count());
        let mut count = 0;

        for (length, blob) in map.iter() {
            let cursor = PrefixCursor::new(blob, length as usize);
            count += cursor.remaining();
            if let Some(prefix) = cursor.current() {
                heap.push(HeapEntry {
                    prefix,
                    source: cursors.len(),
                });
            }
            cursors.push(cursor);
        }

        Self {
            cursors,
            heap,
            count,
        }
    }

    /// Returns the smallest prefix not yet taken from any group and advances
    /// that group's cursor. `None` once every group is exhausted.
    pub fn get_smallest(&mut self) -> Option<&'a [u8]> {
        let top = self.heap.pop()?;
        let cursor = &mut self.cursors[top.source];
        cursor.advance();
        if let Some(next) = cursor.current() {
            self.heap.push(HeapEntry {
                prefix: next,
                source: top.source,
            });
        }
        Some(top.prefix)
    }

    /// Appends every group's unconsumed prefixes to the matching group of
    /// `into`, creating groups as needed.
    pub fn merge_remainder(&self, into: &mut PrefixMap) {
        for cursor in &self.cursors {
            into.extend_group(cursor.prefix_len() as u32, cursor.remaining_bytes());
        }
    }

    /// Total number of prefixes the set started with.
    pub fn count(&self) -> usize {
        self.count
    }
}
