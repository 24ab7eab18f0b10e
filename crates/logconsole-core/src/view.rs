use std::collections::{HashMap, HashSet};

use logconsole_types::IdentityKey;

use crate::counters::SeverityCounts;
use crate::filter::FilterConfig;
use crate::store::EntryStore;

/// The filtered, optionally collapsed view over an [`EntryStore`]
///
/// Holds store indices rather than entries. The collapse index and the
/// counted set are only meaningful for the current epoch and are cleared
/// together with the shown sequence.
#[derive(Debug, Default)]
pub struct CollapseView {
    /// Store indices of the shown entries, in arrival order
    shown: Vec<usize>,

    /// Identity key -> position of its representative in `shown`
    collapse_index: HashMap<IdentityKey, usize>,

    /// Keys already tallied in the counters this epoch
    counted: HashSet<IdentityKey>,
}

impl CollapseView {
    /// Store indices of the shown entries
    pub fn indices(&self) -> &[usize] {
        &self.shown
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// Start a new epoch
    pub(crate) fn reset(&mut self) {
        self.shown.clear();
        self.collapse_index.clear();
        self.counted.clear();
    }

    /// Fold the store entry at `index` into the view and the counters
    pub(crate) fn ingest(
        &mut self,
        store: &mut EntryStore,
        index: usize,
        filter: &FilterConfig,
        collapsed: bool,
        counts: &mut SeverityCounts,
    ) {
        if collapsed {
            self.ingest_collapsed(store, index, filter, counts);
        } else {
            self.ingest_expanded(store, index, filter, counts);
        }
    }

    fn ingest_expanded(
        &mut self,
        store: &EntryStore,
        index: usize,
        filter: &FilterConfig,
        counts: &mut SeverityCounts,
    ) {
        let Some(entry) = store.get(index) else {
            return;
        };

        if filter.passes(entry) {
            self.shown.push(index);
        }
        counts.record(entry.severity());
    }

    fn ingest_collapsed(
        &mut self,
        store: &mut EntryStore,
        index: usize,
        filter: &FilterConfig,
        counts: &mut SeverityCounts,
    ) {
        let Some(entry) = store.get(index) else {
            return;
        };
        let key = entry.key();
        let severity = entry.severity();

        if let Some(&position) = self.collapse_index.get(&key) {
            let representative = self.shown.get(position).copied();
            if let Some(rep) = representative.and_then(|i| store.get_mut(i)) {
                rep.increment_repeat();
            }
        } else if store.get(index).is_some_and(|e| filter.passes(e)) {
            self.collapse_index.insert(key.clone(), self.shown.len());
            self.shown.push(index);
        }

        // Counted once per key per epoch, whether or not it is shown
        if self.counted.insert(key) {
            counts.record(severity);
        }
    }
}
