use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use paginator::{Changeset, Completion, FetchRequest, Paginator, PaginatorOptions};

use crate::source::Delivery;
use crate::{DiffableSource, MainQueue, PageReply, PageSource, RenderSurface};

/// A framework-neutral controller that wires a [`Paginator`] to a fetch source and a rendering
/// surface.
///
/// This type does not hold any UI objects of its own; it drives the surface you give it. Adapters
/// call:
/// - `start` once the view is ready (issues the first page unconditionally)
/// - `on_will_display(index)` when a cell is about to be displayed
/// - `tick(now_ms)` each frame/timer tick, on the rendering thread
///
/// Fetch results are only applied inside `tick`/`pump`, so the list, the reconciliation and the
/// pagination flag are all touched from the thread that ticks. Dropping the controller cancels
/// any outstanding reply.
pub struct GridController<T, S, R> {
    paginator: Paginator<T>,
    source: S,
    surface: R,
    data_source: DiffableSource<T>,
    queue: MainQueue,

    inbox_tx: Sender<Delivery<T>>,
    inbox_rx: Receiver<Delivery<T>>,
    liveness: Arc<()>,
    footer_shown: bool,
}

impl<T, S, R> GridController<T, S, R>
where
    T: Clone + PartialEq,
    S: PageSource<T>,
    R: RenderSurface<T>,
{
    pub fn new(options: PaginatorOptions, queue: MainQueue, source: S, surface: R) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel();
        Self {
            paginator: Paginator::new(options),
            source,
            surface,
            data_source: DiffableSource::new(),
            queue,
            inbox_tx,
            inbox_rx,
            liveness: Arc::new(()),
            footer_shown: false,
        }
    }

    pub fn paginator(&self) -> &Paginator<T> {
        &self.paginator
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn queue(&self) -> &MainQueue {
        &self.queue
    }

    /// The snapshot the surface currently shows.
    pub fn applied(&self) -> &[paginator::Entry<T>] {
        self.data_source.applied()
    }

    /// Issues the initial page fetch. Returns `false` if a fetch is already in flight or the data
    /// is exhausted.
    pub fn start(&mut self) -> bool {
        let now_ms = self.queue.now_ms();
        match self.paginator.start(now_ms) {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    /// Call this when the cell at `index` is about to be displayed.
    ///
    /// Returns `true` if this triggered the next page.
    pub fn on_will_display(&mut self, index: usize) -> bool {
        let now_ms = self.queue.now_ms();
        match self.paginator.on_item_displayed(index, now_ms) {
            Some(request) => {
                adebug!(index, "last reached, paginating");
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, request: FetchRequest) {
        self.sync_footer();
        let reply = PageReply::new(
            request,
            self.inbox_tx.clone(),
            Arc::downgrade(&self.liveness),
        );
        self.source.fetch_page(request, reply);
    }

    /// Runs due queue tasks, applies delivered pages and enforces the fetch timeout.
    ///
    /// Returns the number of fetch outcomes applied.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        self.queue.tick(now_ms);
        let mut applied = self.pump();
        if let Some(completion) = self.paginator.update_timeouts(self.queue.now_ms()) {
            // Anything still running for the timed-out request is no longer wanted.
            self.liveness = Arc::new(());
            self.finish(completion);
            applied += 1;
        }
        applied
    }

    /// Applies every delivered page without advancing the queue.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0usize;
        while let Ok(delivery) = self.inbox_rx.try_recv() {
            match self.paginator.complete(delivery.ticket, delivery.result) {
                Ok(completion) => {
                    self.finish(completion);
                    applied += 1;
                }
                Err(_err) => {
                    adebug!(error = %_err, "ignoring fetch outcome");
                }
            }
        }
        applied
    }

    fn finish(&mut self, completion: Completion) {
        if completion.is_appended() {
            self.reconcile();
        }
        self.sync_footer();
    }

    /// Brings the surface in line with the list. The initial empty list is never reconciled.
    pub fn reconcile(&mut self) -> Option<Changeset> {
        if self.paginator.is_empty() {
            return None;
        }
        self.data_source
            .apply_snapshot(self.paginator.items(), &mut self.surface)
    }

    fn sync_footer(&mut self) {
        let loading = self.paginator.footer_loading();
        if loading != self.footer_shown {
            self.footer_shown = loading;
            self.surface.set_footer_loading(loading);
        }
    }

    /// Abandons the in-flight fetch; its reply becomes a no-op. The list is kept.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.paginator.cancel().is_some();
        if cancelled {
            self.liveness = Arc::new(());
            self.sync_footer();
        }
        cancelled
    }

    /// Leaves the exhausted state so that reaching the end fetches again.
    pub fn resume(&mut self) {
        self.paginator.resume();
    }

    /// Clears the list and the surface and cancels the in-flight fetch.
    ///
    /// Call [`GridController::start`] afterwards to load the first page again.
    pub fn reset(&mut self) {
        self.liveness = Arc::new(());
        self.paginator.reset();
        self.data_source
            .apply_snapshot(self.paginator.items(), &mut self.surface);
        self.sync_footer();
    }
}

impl<T, S, R> std::fmt::Debug for GridController<T, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("state", &self.paginator.state())
            .field("queue", &self.queue)
            .field("footer_shown", &self.footer_shown)
            .finish_non_exhaustive()
    }
}
