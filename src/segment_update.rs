//! The pending segment-update ledger.
//!
//! Inference itself never mutates a segment; it only decides, per active
//! cell, what reinforcement *would* apply if learning were running and
//! queues that decision here keyed by `(col, cell)`. A full learning
//! path (out of scope for this core) would later apply and clear these
//! records. The two mutating operations below are carried over from the
//! original design verbatim, including a quirk worth calling out:
//! `remove_segment_update` drops the entire bucket for a `(col, cell)`
//! key, not just the one record that matched — so does
//! `clean_updates_list`, which finds matching records by segment id but
//! removes via `remove_segment_update` and so takes the whole bucket
//! with it. See DESIGN.md for why this core keeps that behavior as-is.

use std::collections::HashMap;

/// A single queued reinforcement decision for one segment.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateState {
    /// The segment this update would apply to, or `None` for a
    /// not-yet-created segment.
    pub segment: Option<u64>,
    /// Cell indices eligible as new synapse sources if this update is
    /// applied and needs to grow new synapses.
    pub active_cells: Vec<(usize, usize)>,
    /// Tick this update was queued on; stale updates are dropped after
    /// `seg_update_valid_duration` ticks.
    pub timestamp: usize,
}

impl UpdateState {
    pub fn new(segment: Option<u64>, active_cells: Vec<(usize, usize)>, timestamp: usize) -> Self {
        Self {
            segment,
            active_cells,
            timestamp,
        }
    }
}

/// Ledger of queued segment updates, keyed by the `(col, cell)` that
/// will receive them.
#[derive(Clone, Debug, Default)]
pub struct SegmentUpdateList {
    updates: HashMap<(usize, usize), Vec<UpdateState>>,
}

impl SegmentUpdateList {
    pub fn new() -> Self {
        Self {
            updates: HashMap::new(),
        }
    }

    /// Queue an update for `(col, cell)`.
    pub fn push(&mut self, col: usize, cell: usize, update: UpdateState) {
        self.updates.entry((col, cell)).or_default().push(update);
    }

    /// All updates queued for `(col, cell)`, oldest first.
    pub fn get(&self, col: usize, cell: usize) -> &[UpdateState] {
        self.updates
            .get(&(col, cell))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove every update queued for `(col, cell)` — the whole bucket,
    /// not a single record.
    pub fn remove_segment_update(&mut self, col: usize, cell: usize) {
        self.updates.remove(&(col, cell));
    }

    /// Drop every update bucket referencing `segment` on `(col, cell)`.
    /// Because this is implemented via `remove_segment_update`, finding
    /// one matching record on the bucket removes the entire bucket, not
    /// just the matching record.
    pub fn clean_updates_list(&mut self, col: usize, cell: usize, segment: u64) {
        let matches = self
            .get(col, cell)
            .iter()
            .any(|u| u.segment == Some(segment));
        if matches {
            self.remove_segment_update(col, cell);
        }
    }

    /// Number of `(col, cell)` keys with at least one pending update.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Drop all pending updates.
    pub fn clear(&mut self) {
        self.updates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut list = SegmentUpdateList::new();
        list.push(0, 1, UpdateState::new(Some(5), vec![], 10));
        assert_eq!(list.get(0, 1).len(), 1);
        assert_eq!(list.get(0, 1)[0].segment, Some(5));
    }

    #[test]
    fn test_get_missing_key_is_empty() {
        let list = SegmentUpdateList::new();
        assert!(list.get(9, 9).is_empty());
    }

    #[test]
    fn test_remove_segment_update_drops_whole_bucket() {
        let mut list = SegmentUpdateList::new();
        list.push(0, 1, UpdateState::new(Some(5), vec![], 10));
        list.push(0, 1, UpdateState::new(Some(6), vec![], 11));
        assert_eq!(list.get(0, 1).len(), 2);

        list.remove_segment_update(0, 1);
        assert!(list.get(0, 1).is_empty());
    }

    #[test]
    fn test_clean_updates_list_removes_whole_bucket_on_match() {
        let mut list = SegmentUpdateList::new();
        list.push(0, 1, UpdateState::new(Some(5), vec![], 10));
        list.push(0, 1, UpdateState::new(Some(6), vec![], 11));

        list.clean_updates_list(0, 1, 5);

        assert!(list.get(0, 1).is_empty());
    }

    #[test]
    fn test_clean_updates_list_no_match_is_noop() {
        let mut list = SegmentUpdateList::new();
        list.push(0, 1, UpdateState::new(Some(5), vec![], 10));

        list.clean_updates_list(0, 1, 99);

        assert_eq!(list.get(0, 1).len(), 1);
    }

    #[test]
    fn test_len_and_clear() {
        let mut list = SegmentUpdateList::new();
        list.push(0, 1, UpdateState::new(None, vec![], 0));
        list.push(1, 2, UpdateState::new(None, vec![], 0));
        assert_eq!(list.len(), 2);
        list.clear();
        assert!(list.is_empty());
    }
}
