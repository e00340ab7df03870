use paginator::{Changeset, Entry, ItemId};

use crate::{GridLayout, Product, RenderSurface};

/// The image-loading collaborator.
///
/// `load` starts an asynchronous load; the loader reports back by calling
/// [`GridSurface::image_loaded`] once the image is ready.
pub trait ImageLoader {
    fn load(&mut self, id: ItemId, url: &str);
}

/// An [`ImageLoader`] that only records what was requested.
#[derive(Clone, Debug, Default)]
pub struct RecordingImageLoader {
    pub requests: Vec<(ItemId, String)>,
}

impl ImageLoader for RecordingImageLoader {
    fn load(&mut self, id: ItemId, url: &str) {
        self.requests.push((id, url.to_owned()));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageSlot {
    /// The placeholder is shown while the remote image loads.
    Placeholder,
    Loaded,
}

/// What one grid cell shows.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub id: ItemId,
    pub title: String,
    pub image_url: String,
    pub image: ImageSlot,
}

/// A headless product grid: the cells a view would show, plus the loading footer.
///
/// Cells survive reconciliation; only inserted or updated cells are (re)configured, which is
/// when their image load starts.
#[derive(Debug)]
pub struct GridSurface<L = RecordingImageLoader> {
    layout: GridLayout,
    cells: Vec<GridCell>,
    footer_loading: bool,
    loader: L,
    batches: usize,
}

impl<L: ImageLoader + Default> Default for GridSurface<L> {
    fn default() -> Self {
        Self::new(GridLayout::default(), L::default())
    }
}

impl<L: ImageLoader> GridSurface<L> {
    pub fn new(layout: GridLayout, loader: L) -> Self {
        Self {
            layout,
            cells: Vec::new(),
            footer_loading: false,
            loader,
            batches: 0,
        }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    /// Cells grouped by row.
    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(self.layout.columns.max(1))
    }

    pub fn footer_loading(&self) -> bool {
        self.footer_loading
    }

    /// Number of non-empty batches applied so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Swaps the placeholder of cell `id` for its image. Returns `false` if the cell is gone
    /// (e.g. reset while the image was loading).
    pub fn image_loaded(&mut self, id: ItemId) -> bool {
        match self.cells.iter_mut().find(|c| c.id == id) {
            Some(cell) => {
                cell.image = ImageSlot::Loaded;
                true
            }
            None => false,
        }
    }
}

fn configure(entry: &Entry<Product>) -> GridCell {
    GridCell {
        id: entry.id,
        title: entry.value.name.clone(),
        image_url: entry.value.image_url.clone(),
        image: ImageSlot::Placeholder,
    }
}

impl<L: ImageLoader> RenderSurface<Product> for GridSurface<L> {
    fn apply(&mut self, changes: &Changeset, snapshot: &[Entry<Product>]) {
        let old = std::mem::take(&mut self.cells);
        let mut cells = changes.apply(old, |ins| configure(&snapshot[ins.index]), |_, _| {});

        let mut to_load: Vec<usize> = changes.inserted.iter().map(|ins| ins.index).collect();
        for u in &changes.updated {
            let Some(cell) = cells.get_mut(u.index) else {
                continue;
            };
            let entry = &snapshot[u.index];
            cell.title = entry.value.name.clone();
            if cell.image_url != entry.value.image_url {
                cell.image_url = entry.value.image_url.clone();
                cell.image = ImageSlot::Placeholder;
                to_load.push(u.index);
            }
        }

        for index in to_load {
            if let Some(cell) = cells.get(index) {
                self.loader.load(cell.id, &cell.image_url);
            }
        }
        self.cells = cells;
        self.batches += 1;
    }

    fn set_footer_loading(&mut self, loading: bool) {
        self.footer_loading = loading;
    }
}
