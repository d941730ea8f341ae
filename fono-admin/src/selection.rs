//! Row selection across a paginated table
//!
//! Membership is the single source of truth: checkbox state for a row is
//! always `is_selected(id)` and the header checkbox is derived from the rows
//! currently visible. Every mutation takes `&mut self` and completes before
//! returning, so no await point can observe a half-applied select-all.

use std::collections::BTreeSet;

use fono_common::RecordId;

/// Which bulk actions are available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkAffordances {
    pub edit: bool,
    pub delete: bool,
    pub generate: bool,
}

/// Set of chosen row identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<K = RecordId> {
    ids: BTreeSet<K>,
    revision: u64,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
            revision: 0,
        }
    }
}

impl<K: Ord + Clone> Selection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one row; returns the new membership
    pub fn toggle(&mut self, id: K) -> bool {
        self.revision += 1;
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Add every given id
    pub fn select_all<I: IntoIterator<Item = K>>(&mut self, ids: I) {
        self.revision += 1;
        self.ids.extend(ids);
    }

    /// Remove every given id, leaving rows outside `ids` untouched
    pub fn deselect_all<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        self.revision += 1;
        for id in ids {
            self.ids.remove(id);
        }
    }

    /// Header checkbox handler
    pub fn set_all(&mut self, ids: &[K], checked: bool) {
        if checked {
            self.select_all(ids.iter().cloned());
        } else {
            self.deselect_all(ids);
        }
    }

    pub fn clear(&mut self) {
        self.revision += 1;
        self.ids.clear();
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_selected(&self, id: &K) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<K> {
        self.ids.iter().cloned().collect()
    }

    /// Header checkbox state: every visible row selected (and at least one row)
    pub fn all_selected(&self, visible: &[K]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id))
    }

    /// Bumped on every mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn affordances(&self) -> BulkAffordances {
        let any = !self.ids.is_empty();
        BulkAffordances {
            edit: any,
            delete: any,
            generate: any,
        }
    }
}
