use alloc::vec;
use alloc::vec::Vec;

use crate::key::{DiffKey, KeyIndexMap};
use crate::{Entry, ItemId};

/// An item that is present in the old sequence but not in the new one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Removal<K> {
    /// Index in the old sequence.
    pub index: usize,
    pub key: K,
}

/// An item that is present in the new sequence but not in the old one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insertion<K> {
    /// Index in the new sequence.
    pub index: usize,
    pub key: K,
}

/// A retained item whose position relative to the other retained items changed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move<K> {
    pub from: usize,
    pub to: usize,
    pub key: K,
}

/// A retained item whose value changed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Update<K> {
    /// Index in the new sequence.
    pub index: usize,
    pub key: K,
}

/// The minimal set of operations that turns one keyed sequence into another.
///
/// Index spaces follow the usual batch-update convention of list views: removals and move
/// sources refer to the old sequence, insertions, move targets and updates to the new one.
/// Every list is sorted by its index.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Changeset<K = ItemId> {
    pub removed: Vec<Removal<K>>,
    pub inserted: Vec<Insertion<K>>,
    pub moved: Vec<Move<K>>,
    pub updated: Vec<Update<K>>,
}

impl<K> Default for Changeset<K> {
    fn default() -> Self {
        Self {
            removed: Vec::new(),
            inserted: Vec::new(),
            moved: Vec::new(),
            updated: Vec::new(),
        }
    }
}

impl Changeset<ItemId> {
    /// Diffs two store snapshots by [`ItemId`].
    pub fn between<T: PartialEq>(old: &[Entry<T>], new: &[Entry<T>]) -> Self {
        diff_by_key(old, new, |e| e.id)
    }
}

impl<K> Changeset<K> {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.inserted.is_empty()
            && self.moved.is_empty()
            && self.updated.is_empty()
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.removed.len() + self.inserted.len() + self.moved.len() + self.updated.len()
    }

    /// Returns `true` if the changeset only inserts a contiguous run at the end of a sequence
    /// that had `old_len` items.
    pub fn is_tail_insert_only(&self, old_len: usize) -> bool {
        self.removed.is_empty()
            && self.moved.is_empty()
            && self.updated.is_empty()
            && self
                .inserted
                .iter()
                .enumerate()
                .all(|(n, ins)| ins.index == old_len + n)
    }

    /// Replays the changeset on `old`, producing the new sequence.
    ///
    /// `insert` builds the element for an inserted position and `update` refreshes a retained
    /// element in place. Retained elements are moved, not rebuilt. This is how a rendering
    /// surface keeps its existing cells across a reconciliation.
    pub fn apply<C>(
        &self,
        old: Vec<C>,
        mut insert: impl FnMut(&Insertion<K>) -> C,
        mut update: impl FnMut(&Update<K>, &mut C),
    ) -> Vec<C> {
        let old_len = old.len();
        let mut slots: Vec<Option<C>> = old.into_iter().map(Some).collect();
        for r in &self.removed {
            if let Some(slot) = slots.get_mut(r.index) {
                *slot = None;
            }
        }

        let mut moving = Vec::with_capacity(self.moved.len());
        for m in &self.moved {
            if let Some(cell) = slots.get_mut(m.from).and_then(Option::take) {
                moving.push((m.to, cell));
            }
        }

        let new_len = old_len
            .saturating_sub(self.removed.len())
            .saturating_add(self.inserted.len());
        let mut out: Vec<Option<C>> = (0..new_len).map(|_| None).collect();
        for ins in &self.inserted {
            if let Some(slot) = out.get_mut(ins.index) {
                *slot = Some(insert(ins));
            }
        }
        for (to, cell) in moving {
            if let Some(slot) = out.get_mut(to) {
                *slot = Some(cell);
            }
        }

        // What is left in `slots` is the stationary run, already in new order.
        let mut stationary = slots.into_iter().flatten();
        for slot in out.iter_mut().filter(|s| s.is_none()) {
            *slot = stationary.next();
        }
        debug_assert!(
            stationary.next().is_none() && out.iter().all(Option::is_some),
            "Changeset::apply: changeset does not match the old sequence"
        );

        let mut out: Vec<C> = out.into_iter().flatten().collect();
        for u in &self.updated {
            if let Some(cell) = out.get_mut(u.index) {
                update(u, cell);
            }
        }
        out
    }
}

/// Computes the changes that turn `old` into `new`, matching elements by `key`.
///
/// - Elements whose key only appears in `old` are removed, those only in `new` are inserted.
/// - Retained elements that stay in the longest run of unchanged relative order are stationary;
///   the rest are reported as moves.
/// - Retained elements whose values differ (`!=`) are reported as updates.
///
/// A pure append (`new` is `old` plus a suffix) therefore yields tail insertions only.
///
/// Keys are expected to be unique within each sequence. If a key repeats, only its first
/// occurrence is matched; later occurrences are treated as unrelated removals/insertions.
pub fn diff_by_key<T: PartialEq, K: DiffKey>(
    old: &[T],
    new: &[T],
    mut key: impl FnMut(&T) -> K,
) -> Changeset<K> {
    let old_keys: Vec<K> = old.iter().map(&mut key).collect();
    let new_keys: Vec<K> = new.iter().map(&mut key).collect();

    let old_pos = first_positions(&old_keys);
    let new_pos = first_positions(&new_keys);

    let mut changes = Changeset::default();

    for (i, k) in old_keys.iter().enumerate() {
        let retained = old_pos.get(k) == Some(&i) && new_pos.contains_key(k);
        if !retained {
            changes.removed.push(Removal {
                index: i,
                key: k.clone(),
            });
        }
    }

    // (old index, new index) for retained elements, in new order.
    let mut retained = Vec::new();
    for (j, k) in new_keys.iter().enumerate() {
        let first_in_new = new_pos.get(k) == Some(&j);
        match old_pos.get(k) {
            Some(&i) if first_in_new => retained.push((i, j)),
            _ => changes.inserted.push(Insertion {
                index: j,
                key: k.clone(),
            }),
        }
    }

    let old_order: Vec<usize> = retained.iter().map(|&(i, _)| i).collect();
    let stationary = longest_increasing_mask(&old_order);
    for (n, &(i, j)) in retained.iter().enumerate() {
        if !stationary[n] {
            changes.moved.push(Move {
                from: i,
                to: j,
                key: new_keys[j].clone(),
            });
        }
        if old[i] != new[j] {
            changes.updated.push(Update {
                index: j,
                key: new_keys[j].clone(),
            });
        }
    }
    changes.moved.sort_by_key(|m| m.to);

    ptrace!(
        old_len = old.len(),
        new_len = new.len(),
        removed = changes.removed.len(),
        inserted = changes.inserted.len(),
        moved = changes.moved.len(),
        updated = changes.updated.len(),
        "diff_by_key"
    );
    changes
}

fn first_positions<K: DiffKey>(keys: &[K]) -> KeyIndexMap<K> {
    let mut map = KeyIndexMap::<K>::new();
    for (i, k) in keys.iter().enumerate() {
        if map.contains_key(k) {
            pwarn!(index = i, "diff_by_key: duplicate key");
            continue;
        }
        map.insert(k.clone(), i);
    }
    map
}

/// Marks one longest strictly increasing subsequence of `seq` (patience sorting, O(n log n)).
fn longest_increasing_mask(seq: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];
    for (p, &v) in seq.iter().enumerate() {
        let at = tails.partition_point(|&t| seq[t] < v);
        if at > 0 {
            prev[p] = Some(tails[at - 1]);
        }
        if at == tails.len() {
            tails.push(p);
        } else {
            tails[at] = p;
        }
    }

    let mut mask = vec![false; seq.len()];
    let mut cur = tails.last().copied();
    while let Some(p) = cur {
        mask[p] = true;
        cur = prev[p];
    }
    mask
}
