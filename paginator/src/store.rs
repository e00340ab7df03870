use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;
use core::ops::Range;

use crate::{Entry, ItemId, OnChangeCallback};

/// The authoritative ordered collection of fetched items.
///
/// Items are only ever appended (or dropped all at once by [`ListStore::clear`]). Every appended
/// item is tagged with a fresh [`ItemId`] so that reconciliation can work on identity rather than
/// value equality.
///
/// Observers registered via [`ListStore::set_on_change`] are called synchronously on the thread
/// that mutates the store; adapters keep the store on their rendering context.
pub struct ListStore<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
    revision: u64,
    on_change: Option<OnChangeCallback<T>>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListStore<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            revision: 0,
            on_change: None,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&[Entry<T>]) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&[Entry<T>]) + Send + Sync + 'static>,
    ) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of effective mutations so far. No-op appends do not count.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Read-only view of the current collection, in fetch order.
    pub fn current(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry<T>> {
        self.entries.get(index)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        // Ids are assigned in ascending order, so the list is sorted by id.
        self.entries.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    /// Appends `items` at the end, preserving their order.
    ///
    /// Returns the index range the items now occupy. Appending nothing is a no-op and does not
    /// notify.
    pub fn append(&mut self, items: impl IntoIterator<Item = T>) -> Range<usize> {
        let start = self.entries.len();
        for value in items {
            let id = ItemId(self.next_id);
            self.next_id += 1;
            self.entries.push(Entry { id, value });
        }
        let end = self.entries.len();
        if end > start {
            self.revision += 1;
            ptrace!(start, end, revision = self.revision, "ListStore::append");
            self.notify();
        }
        start..end
    }

    /// Drops every item. Ids keep counting up, so entries appended later never collide with
    /// earlier ones.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.revision += 1;
        // The collection is empty, so observers are not called.
        self.notify();
    }

    fn notify_now(&self) {
        if self.entries.is_empty() {
            return;
        }
        if let Some(cb) = &self.on_change {
            cb(&self.entries);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple mutations into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }
}

impl<T: Clone> ListStore<T> {
    /// Clones the current collection.
    pub fn snapshot(&self) -> Vec<Entry<T>> {
        self.entries.clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for ListStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListStore")
            .field("entries", &self.entries)
            .field("next_id", &self.next_id)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
