//! A headless infinite-scroll pagination engine.
//!
//! For executors, fetch sources and rendering-surface bindings, see the `paginator-adapter`
//! crate.
//!
//! This crate owns the three pieces of state an infinite list needs: the ordered collection of
//! fetched items (each tagged with a stable [`ItemId`]), the "fetch the next page?" state
//! machine, and keyed reconciliation between two snapshots of the list.
//!
//! It is UI-agnostic. An adapter is expected to:
//! - report which item index is about to be displayed
//! - run the returned [`FetchRequest`]s and hand their results back via [`Paginator::complete`]
//! - apply the resulting [`Changeset`]s to its rendering surface
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod diff;
mod error;
mod key;
mod options;
mod paginator;
mod state;
mod store;
mod types;

#[cfg(test)]
mod tests;

pub use diff::{Changeset, Insertion, Move, Removal, Update, diff_by_key};
pub use error::{FetchError, PaginateError};
pub use key::DiffKey;
pub use options::{OnChangeCallback, PaginatorOptions};
pub use paginator::Paginator;
pub use state::PaginationState;
pub use store::ListStore;
pub use types::{Completion, Entry, FetchRequest, FetchTicket, ItemId, Phase};
