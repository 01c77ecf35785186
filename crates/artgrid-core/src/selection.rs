//! Cross-page selection set and the per-page reconciliation step.
//!
//! The table only ever reports checkbox state for the rows it renders. A
//! toggle on one page therefore has to replace that page's share of the
//! selection and leave every other page's share alone.

use std::collections::HashSet;

use crate::Record;

/// Selected records across all pages, unique by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    records: Vec<Record>,
    ids: HashSet<u64>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `records`, keeping the first occurrence of each id.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.insert(record);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn get(&self, id: u64) -> Option<&Record> {
        if !self.contains(id) {
            return None;
        }
        self.records.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.iter().map(|r| r.id)
    }

    /// Insert a record. Returns `false` if its id was already selected.
    pub fn insert(&mut self, record: Record) -> bool {
        if !self.ids.insert(record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Drop every record whose id is in `ids`. Returns how many were removed.
    pub fn remove_ids(&mut self, ids: &HashSet<u64>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(&r.id));
        self.ids.retain(|id| !ids.contains(id));
        before - self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.ids.clear();
    }

    /// Replace this page's share of the selection.
    ///
    /// Every record in `visible` is removed, then every record in
    /// `newly_checked` is inserted. Afterwards a visible record is selected
    /// iff it was checked; records on other pages are untouched.
    pub fn apply_visible_selection_change(&mut self, visible: &[Record], newly_checked: &[Record]) {
        let visible_ids: HashSet<u64> = visible.iter().map(|r| r.id).collect();
        let removed = self.remove_ids(&visible_ids);
        let mut added = 0;
        for record in newly_checked {
            if self.insert(record.clone()) {
                added += 1;
            }
        }
        tracing::debug!(
            visible = visible.len(),
            removed,
            added,
            selected = self.len(),
            "applied visible selection change"
        );
    }

    /// The selected records among `visible`, in `visible` order.
    pub fn restricted_to(&self, visible: &[Record]) -> Vec<Record> {
        visible
            .iter()
            .filter(|r| self.contains(r.id))
            .cloned()
            .collect()
    }
}

impl FromIterator<Record> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
