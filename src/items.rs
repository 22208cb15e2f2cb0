use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::warn;

/// Stable key of a list entry.
pub trait ItemId: Clone + Eq + Hash + Debug {}

impl<T> ItemId for T where T: Clone + Eq + Hash + Debug {}

/// Ordered identifiers; sequence order is render order.
#[derive(Debug, Clone)]
pub struct ItemStore<I: ItemId> {
    items: Vec<I>,
    members: HashSet<I>,
}

impl<I: ItemId> Default for ItemStore<I> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            members: HashSet::new(),
        }
    }
}

impl<I: ItemId> ItemStore<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `ids`, dropping repeats after the first.
    pub fn from_ids(ids: impl IntoIterator<Item = I>) -> Self {
        let mut store = Self::new();
        store.batch_add(ids);
        store
    }

    /// Appends `id`. Returns false when it is already present.
    pub fn add(&mut self, id: I) -> bool {
        if !self.members.insert(id.clone()) {
            warn!("ignoring duplicate item {:?}", id);
            return false;
        }
        self.items.push(id);
        true
    }

    /// Appends every new id and returns the ones actually added, in order.
    pub fn batch_add(&mut self, ids: impl IntoIterator<Item = I>) -> Vec<I> {
        let mut added = Vec::new();
        for id in ids {
            if self.add(id.clone()) {
                added.push(id);
            }
        }
        added
    }

    /// Removes `id`, shifting every later index down by one.
    /// Returns the index it had, `None` for unknown ids.
    pub fn remove(&mut self, id: &I) -> Option<usize> {
        if !self.members.remove(id) {
            return None;
        }
        let index = self.items.iter().position(|item| item == id)?;
        self.items.remove(index);
        Some(index)
    }

    /// Removes every known id and returns the ones actually removed.
    pub fn batch_remove<'a>(&mut self, ids: impl IntoIterator<Item = &'a I>) -> Vec<I>
    where
        I: 'a,
    {
        let doomed: HashSet<&I> = ids
            .into_iter()
            .filter(|id| self.members.contains(*id))
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::with_capacity(doomed.len());
        let mut kept = Vec::with_capacity(self.items.len() - doomed.len());
        for item in self.items.drain(..) {
            if doomed.contains(&item) {
                removed.push(item);
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        for id in &removed {
            self.members.remove(id);
        }
        removed
    }

    pub fn has(&self, id: &I) -> bool {
        self.members.contains(id)
    }

    pub fn index_of(&self, id: &I) -> Option<usize> {
        if !self.has(id) {
            return None;
        }
        self.items.iter().position(|item| item == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[I] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.members.clear();
    }
}
