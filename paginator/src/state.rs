use crate::Phase;

/// A lightweight, serializable snapshot of the pagination state.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaginationState {
    pub phase: Phase,
    pub item_count: usize,
    pub pages_loaded: usize,
    /// `true` exactly while one fetch is outstanding. Drives the loading footer.
    pub is_fetching_next_page: bool,
}
