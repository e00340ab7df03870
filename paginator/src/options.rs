use alloc::sync::Arc;

use crate::Entry;

/// A callback fired after the store changed, with the full (non-empty) collection.
pub type OnChangeCallback<T> = Arc<dyn Fn(&[Entry<T>]) + Send + Sync>;

/// Configuration for [`crate::Paginator`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PaginatorOptions {
    /// Page size hint forwarded in every [`crate::FetchRequest`].
    pub page_size: usize,

    /// How many items before the end a display event may be and still trigger a fetch.
    ///
    /// `0` means only displaying the last item triggers.
    pub prefetch_distance: usize,

    /// Treat an empty page as the end of the data (enter [`crate::Phase::Exhausted`]).
    pub stop_on_empty_page: bool,

    /// Stop after this many non-empty pages.
    pub max_pages: Option<usize>,

    /// Fail an in-flight fetch with [`crate::FetchError::TimedOut`] once it is older than this.
    ///
    /// Enforced by [`crate::Paginator::update_timeouts`], which your adapter calls from its tick.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginatorOptions {
    pub fn new() -> Self {
        Self {
            page_size: 10,
            prefetch_distance: 0,
            stop_on_empty_page: true,
            max_pages: None,
            fetch_timeout_ms: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_prefetch_distance(mut self, prefetch_distance: usize) -> Self {
        self.prefetch_distance = prefetch_distance;
        self
    }

    pub fn with_stop_on_empty_page(mut self, stop_on_empty_page: bool) -> Self {
        self.stop_on_empty_page = stop_on_empty_page;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_fetch_timeout_ms(mut self, fetch_timeout_ms: Option<u64>) -> Self {
        self.fetch_timeout_ms = fetch_timeout_ms;
        self
    }
}
