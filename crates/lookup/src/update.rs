//! Partial-update merge.
//!
//! A partial update carries new prefixes (grouped by length, sorted) and a
//! sorted list of removal indices. A removal index is a position in the *old*
//! prefix set taken in global byte order, so it is matched against a counter
//! of old-side picks only, never against positions in the merged output.
//!
//! ```text
//! old:     aaaa  bbbb  cccc          removal_indices: [1]
//! add:        abcd         dddd
//! picks:   0     1     2
//! output:  aaaa abcd cccc dddd       (old pick #1, "bbbb", dropped)
//! ```
//!
//! Both sides are walked with a [`CursorSet`], one prefix at a time, and the
//! smaller of the two pending prefixes is emitted. Once one side runs out the
//! other is flushed group-by-group without comparing further.

use log::debug;
use prefixset::{CursorSet, PrefixMap};
use std::cmp::Ordering;

use crate::UpdateError;

/// One update payload for a single table, as handed over by the update parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableUpdate {
    /// Prefixes to add (partial) or the whole list (full).
    pub prefixes: PrefixMap,
    /// Strictly increasing positions into the current prefix set to drop.
    pub removal_indices: Vec<u32>,
    /// Opaque list state to send with the next update request.
    pub client_state: Vec<u8>,
    /// Checksum of the list after this update is applied.
    pub checksum: Vec<u8>,
    /// `true` when `prefixes` replaces the table instead of patching it.
    pub full_update: bool,
}

impl TableUpdate {
    pub fn partial(prefixes: PrefixMap, removal_indices: Vec<u32>) -> Self {
        Self {
            prefixes,
            removal_indices,
            ..Self::default()
        }
    }

    pub fn full(prefixes: PrefixMap) -> Self {
        Self {
            prefixes,
            full_update: true,
            ..Self::default()
        }
    }

    /// Sets the list state and checksum to persist once the update applies.
    pub fn with_metadata(mut self, client_state: &[u8], checksum: &[u8]) -> Self {
        self.client_state = client_state.to_vec();
        self.checksum = checksum.to_vec();
        self
    }
}

/// Merges `add` into `old`, dropping the old prefixes at `removal_indices`.
///
/// Neither input is modified; the result is a fresh map that is sorted and
/// duplicate-free per length, holding
/// `old.count() - removal_indices.len() + add.count()` prefixes.
///
/// # Errors
///
/// - [`UpdateError::DuplicatePrefix`] if a prefix of `add` is already in `old`.
/// - [`UpdateError::RemovalIndexOutOfRange`] if indices remain after the old
///   set is exhausted.
/// - [`UpdateError::InfiniteLoopGuardTripped`] if the merge fails to finish
///   within `old.count() + add.count() + 1` steps.
pub fn merge_partial_update(
    old: &PrefixMap,
    add: &PrefixMap,
    removal_indices: &[u32],
) -> Result<PrefixMap, UpdateError> {
    // Every pass consumes one prefix, plus one pass to notice both ends.
    let bound = old.count() + add.count() + 1;
    merge_bounded(old, add, removal_indices, bound)
}

/// [`merge_partial_update`] with an explicit iteration budget.
pub(crate) fn merge_bounded(
    old: &PrefixMap,
    add: &PrefixMap,
    removal_indices: &[u32],
    bound: usize,
) -> Result<PrefixMap, UpdateError> {
    let mut old_set = CursorSet::new(old);
    let mut add_set = CursorSet::new(add);
    let mut output = PrefixMap::new();

    let mut old_pending: Option<&[u8]> = None;
    let mut add_pending: Option<&[u8]> = None;

    let mut removal_cursor = 0usize;
    // Position of the next old pick in the full old sequence.
    let mut old_picked: u64 = 0;

    let mut finished = false;

    for _ in 0..bound {
        if old_pending.is_none() {
            old_pending = old_set.get_smallest();
            if old_pending.is_none() {
                if let Some(p) = add_pending.take() {
                    output.append_prefix(p);
                }
                add_set.merge_remainder(&mut output);
                finished = true;
                break;
            }
        }

        if add_pending.is_none() {
            add_pending = add_set.get_smallest();
            // With removals outstanding the old side must still be walked
            // one by one to count positions.
            if add_pending.is_none() && removal_cursor >= removal_indices.len() {
                if let Some(p) = old_pending.take() {
                    output.append_prefix(p);
                }
                old_set.merge_remainder(&mut output);
                finished = true;
                break;
            }
        }

        // The refill above either filled the old slot or ended the merge.
        let Some(o) = old_pending else { break };

        match add_pending.map_or(Ordering::Less, |a| o.cmp(a)) {
            Ordering::Less => {
                let position = old_picked;
                old_picked += 1;
                if removal_indices
                    .get(removal_cursor)
                    .is_some_and(|&idx| u64::from(idx) == position)
                {
                    removal_cursor += 1;
                } else {
                    output.append_prefix(o);
                }
                old_pending = None;
            }
            Ordering::Greater => {
                if let Some(a) = add_pending.take() {
                    output.append_prefix(a);
                }
            }
            Ordering::Equal => return Err(UpdateError::DuplicatePrefix),
        }
    }

    if !finished {
        return Err(UpdateError::InfiniteLoopGuardTripped { bound });
    }

    if removal_cursor < removal_indices.len() {
        return Err(UpdateError::RemovalIndexOutOfRange {
            remaining: removal_indices.len() - removal_cursor,
        });
    }

    debug!(
        "merged {} old + {} added - {} removed = {} prefixes",
        old_set.count(),
        add_set.count(),
        removal_indices.len(),
        output.count()
    );
    Ok(output)
}
