use paginator::{Changeset, Entry};

/// The rendering surface (a grid or list view) that reconciliation drives.
pub trait RenderSurface<T> {
    /// Applies a batch of changes. `snapshot` is the full collection after the changes.
    fn apply(&mut self, changes: &Changeset, snapshot: &[Entry<T>]);

    /// Shows or hides the loading footer.
    fn set_footer_loading(&mut self, loading: bool);
}

impl<T, S: RenderSurface<T> + ?Sized> RenderSurface<T> for &mut S {
    fn apply(&mut self, changes: &Changeset, snapshot: &[Entry<T>]) {
        (**self).apply(changes, snapshot);
    }

    fn set_footer_loading(&mut self, loading: bool) {
        (**self).set_footer_loading(loading);
    }
}

/// Remembers what a surface currently shows and turns new snapshots into minimal batches.
///
/// The equivalent of a diffable data source: hand it whole snapshots, it applies only the
/// differences.
#[derive(Clone, Debug)]
pub struct DiffableSource<T> {
    applied: Vec<Entry<T>>,
}

impl<T> Default for DiffableSource<T> {
    fn default() -> Self {
        Self {
            applied: Vec::new(),
        }
    }
}

impl<T: Clone + PartialEq> DiffableSource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot the surface currently shows.
    pub fn applied(&self) -> &[Entry<T>] {
        &self.applied
    }

    /// Diffs `snapshot` against the applied one and applies the changes to `surface`.
    ///
    /// Returns the applied changeset, or `None` if nothing changed.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &[Entry<T>],
        surface: &mut impl RenderSurface<T>,
    ) -> Option<Changeset> {
        let changes = Changeset::between(&self.applied, snapshot);
        if changes.is_empty() {
            return None;
        }
        atrace!(
            removed = changes.removed.len(),
            inserted = changes.inserted.len(),
            moved = changes.moved.len(),
            updated = changes.updated.len(),
            "DiffableSource::apply_snapshot"
        );
        surface.apply(&changes, snapshot);
        self.applied = snapshot.to_vec();
        Some(changes)
    }
}

/// Column layout of a grid: items fill rows left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLayout {
    pub columns: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self { columns: 2 }
    }
}

impl GridLayout {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
        }
    }

    /// `(row, column)` of the item at `index`.
    pub fn position(&self, index: usize) -> (usize, usize) {
        let columns = self.columns.max(1);
        (index / columns, index % columns)
    }

    pub fn row_count(&self, len: usize) -> usize {
        len.div_ceil(self.columns.max(1))
    }
}
