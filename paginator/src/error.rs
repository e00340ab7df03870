use alloc::string::String;

use crate::FetchTicket;

/// Failure reported for a page fetch.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchError {
    #[error("page fetch failed: {0}")]
    Failed(String),
    #[error("page fetch timed out after {elapsed_ms} ms")]
    TimedOut { elapsed_ms: u64 },
}

/// Misuse of [`crate::Paginator::complete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PaginateError {
    #[error("no fetch is in flight (got ticket {got:?})")]
    NoFetchInFlight { got: FetchTicket },
    #[error("stale fetch ticket {got:?}, expected {expected:?}")]
    StaleTicket {
        expected: FetchTicket,
        got: FetchTicket,
    },
}
