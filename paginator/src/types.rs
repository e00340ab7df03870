use core::ops::Range;

use crate::FetchError;

/// Stable identity of a stored item.
///
/// Ids are assigned by [`crate::ListStore`] in append order and are never reused, not even after
/// [`crate::ListStore::clear`]. Two items with identical values still get distinct ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u64);

impl ItemId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// An item together with the id it was assigned when it was appended.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<T> {
    pub id: ItemId,
    pub value: T,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// No fetch outstanding.
    #[default]
    Idle,
    /// Exactly one fetch outstanding; the loading footer is shown.
    Fetching,
    /// The source reported the end of the data. Display events no longer trigger fetches until
    /// [`crate::Paginator::resume`] is called.
    Exhausted,
}

/// Identity of one issued fetch.
///
/// `generation` changes on [`crate::Paginator::reset`], which invalidates every ticket issued
/// before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchTicket {
    pub generation: u32,
    pub seq: u64,
}

/// A page request handed to the fetch collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    /// Number of items in the list when the request was issued.
    pub offset: usize,
    /// Zero-based index of the requested page (pages successfully loaded so far).
    pub page_index: usize,
    /// Preferred page size (a hint; sources may return fewer or more items).
    pub page_size: usize,
    pub issued_at_ms: u64,
}

/// The effect of a fetch completion on the paginator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Items were appended at `range` (indexes in the list).
    Appended { range: Range<usize> },
    /// The page was empty and the paginator is now [`Phase::Exhausted`].
    Exhausted,
    /// The page was empty but `stop_on_empty_page` is off; the paginator is idle again.
    Empty,
    /// The fetch failed; the list is unchanged and the paginator is idle again.
    Failed(FetchError),
}

impl Completion {
    /// Returns `true` if the list changed.
    pub fn is_appended(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }
}
