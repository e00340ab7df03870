//! Adapter utilities for the `paginator` crate.
//!
//! The `paginator` crate is UI-agnostic and only holds state. This crate provides the pieces an
//! infinite-scroll view needs around it:
//!
//! - A serialized main-queue executor (`MainQueue`) with delayed tasks and a `Send` handle for
//!   posting from other threads
//! - The fetch collaborator contract (`PageSource`, `PageReply`) with liveness-guarded replies
//! - Reconciliation onto a rendering surface (`RenderSurface`, `DiffableSource`)
//! - A headless two-column product grid with image placeholders (`GridSurface`)
//! - `GridController`, which ties them together
//!
//! This crate is intentionally framework-agnostic; a real view toolkit implements
//! `RenderSurface` and forwards its "will display" events.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod executor;
mod grid;
mod product;
mod source;
mod surface;


pub use controller::GridController;
pub use executor::{MainQueue, RemoteQueue};
pub use grid::{GridCell, GridSurface, ImageLoader, ImageSlot, RecordingImageLoader};
pub use product::{Product, SimulatedProductSource, SimulatedSourceOptions};
pub use source::{PageReply, PageSource};
pub use surface::{DiffableSource, GridLayout, RenderSurface};

/// The product grid used by the demo: simulated source, headless grid surface.
pub type ProductGridController<L = RecordingImageLoader> =
    GridController<Product, SimulatedProductSource, GridSurface<L>>;
