use alloc::vec::Vec;

use crate::{
    Completion, Entry, FetchError, FetchRequest, FetchTicket, ListStore, PaginateError,
    PaginationState, PaginatorOptions, Phase,
};

/// The infinite-scroll state machine.
///
/// This type is intentionally UI-agnostic:
/// - It does not run fetches. It hands out [`FetchRequest`]s and expects the adapter to report
///   their outcome via [`Paginator::complete`].
/// - It does not render. Adapters diff [`Paginator::items`] snapshots (see
///   [`crate::Changeset::between`]) and apply the result to their surface.
/// - It does not read a clock. Time is passed in as `now_ms` by the adapter.
///
/// At most one fetch is in flight at any time. Display events that arrive while fetching are
/// ignored, and completions for anything but the current ticket are rejected without touching
/// the list.
#[derive(Debug)]
pub struct Paginator<T> {
    options: PaginatorOptions,
    store: ListStore<T>,
    phase: Phase,

    generation: u32,
    next_seq: u64,
    in_flight: Option<FetchRequest>,

    pages_loaded: usize,
    last_error: Option<FetchError>,
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Self::new(PaginatorOptions::default())
    }
}

impl<T> Paginator<T> {
    pub fn new(options: PaginatorOptions) -> Self {
        pdebug!(
            page_size = options.page_size,
            prefetch_distance = options.prefetch_distance,
            "Paginator::new"
        );
        Self {
            options,
            store: ListStore::new(),
            phase: Phase::Idle,
            generation: 0,
            next_seq: 0,
            in_flight: None,
            pages_loaded: 0,
            last_error: None,
        }
    }

    pub fn options(&self) -> &PaginatorOptions {
        &self.options
    }

    /// Replaces the options. An outstanding fetch is not affected.
    pub fn set_options(&mut self, options: PaginatorOptions) {
        self.options = options;
        ptrace!(
            page_size = self.options.page_size,
            prefetch_distance = self.options.prefetch_distance,
            "Paginator::set_options"
        );
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut PaginatorOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    /// Registers the store observer. It is called after every append that leaves the list
    /// non-empty.
    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&[Entry<T>]) + Send + Sync + 'static>,
    ) {
        self.store.set_on_change(on_change);
    }

    pub fn store(&self) -> &ListStore<T> {
        &self.store
    }

    pub fn items(&self) -> &[Entry<T>] {
        self.store.current()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_fetching(&self) -> bool {
        self.phase == Phase::Fetching
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    /// Whether the loading footer should be visible.
    pub fn footer_loading(&self) -> bool {
        self.is_fetching()
    }

    pub fn in_flight(&self) -> Option<&FetchRequest> {
        self.in_flight.as_ref()
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// The error of the most recent failed fetch, cleared by the next successful page.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn state(&self) -> PaginationState {
        PaginationState {
            phase: self.phase,
            item_count: self.store.len(),
            pages_loaded: self.pages_loaded,
            is_fetching_next_page: self.is_fetching(),
        }
    }

    /// Returns `true` if displaying `index` counts as reaching the end of the list.
    ///
    /// With the default `prefetch_distance = 0` this is exactly `index == len - 1`. Indexes past
    /// the end (stale display events) never count.
    pub fn is_trigger_index(&self, index: usize) -> bool {
        let len = self.store.len();
        if index >= len {
            return false;
        }
        index.saturating_add(self.options.prefetch_distance) >= len - 1
    }

    /// Returns `true` if `on_item_displayed(index)` would issue a fetch right now.
    pub fn should_fetch_at(&self, index: usize) -> bool {
        self.phase == Phase::Idle && self.is_trigger_index(index)
    }

    /// Issues the initial fetch.
    ///
    /// Unlike display events this does not look at the list, so it works while the list is
    /// still empty. Returns `None` if a fetch is already in flight or the data is exhausted.
    pub fn start(&mut self, now_ms: u64) -> Option<FetchRequest> {
        if self.phase != Phase::Idle {
            ptrace!(phase = ?self.phase, "Paginator::start ignored");
            return None;
        }
        Some(self.issue(now_ms))
    }

    /// Call this when the item at `index` is about to be displayed.
    ///
    /// Returns the request to run if this event triggers the next page.
    pub fn on_item_displayed(&mut self, index: usize, now_ms: u64) -> Option<FetchRequest> {
        if !self.should_fetch_at(index) {
            return None;
        }
        pdebug!(index, len = self.store.len(), "last item reached, fetching next page");
        Some(self.issue(now_ms))
    }

    fn issue(&mut self, now_ms: u64) -> FetchRequest {
        debug_assert!(self.in_flight.is_none(), "issuing a fetch while one is in flight");
        let ticket = FetchTicket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let request = FetchRequest {
            ticket,
            offset: self.store.len(),
            page_index: self.pages_loaded,
            page_size: self.options.page_size,
            issued_at_ms: now_ms,
        };
        self.in_flight = Some(request);
        self.phase = Phase::Fetching;
        ptrace!(?ticket, offset = request.offset, "Paginator::issue");
        request
    }

    /// Reports the outcome of the fetch identified by `ticket`.
    ///
    /// - A non-empty page is appended and the paginator returns to [`Phase::Idle`] (or
    ///   [`Phase::Exhausted`] once `max_pages` pages were loaded).
    /// - An empty page exhausts the paginator when `stop_on_empty_page` is set.
    /// - An error leaves the list unchanged and returns to [`Phase::Idle`], so the next
    ///   end-of-list display event retries.
    ///
    /// Completions for a ticket other than the in-flight one are rejected and change nothing.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<T>, FetchError>,
    ) -> Result<Completion, PaginateError> {
        let Some(request) = self.in_flight else {
            pwarn!(?ticket, "completion without a fetch in flight");
            return Err(PaginateError::NoFetchInFlight { got: ticket });
        };
        if request.ticket != ticket {
            pwarn!(expected = ?request.ticket, got = ?ticket, "stale fetch completion");
            return Err(PaginateError::StaleTicket {
                expected: request.ticket,
                got: ticket,
            });
        }
        self.in_flight = None;

        let completion = match result {
            Ok(items) if items.is_empty() => {
                if self.options.stop_on_empty_page {
                    self.phase = Phase::Exhausted;
                    Completion::Exhausted
                } else {
                    self.phase = Phase::Idle;
                    Completion::Empty
                }
            }
            Ok(items) => {
                let range = self.store.append(items);
                self.pages_loaded += 1;
                self.last_error = None;
                let limit_reached = self
                    .options
                    .max_pages
                    .is_some_and(|max| self.pages_loaded >= max);
                self.phase = if limit_reached {
                    Phase::Exhausted
                } else {
                    Phase::Idle
                };
                Completion::Appended { range }
            }
            Err(err) => {
                pwarn!(%err, ?ticket, "page fetch failed");
                self.phase = Phase::Idle;
                self.last_error = Some(err.clone());
                Completion::Failed(err)
            }
        };
        pdebug!(
            ?ticket,
            phase = ?self.phase,
            len = self.store.len(),
            "Paginator::complete"
        );
        Ok(completion)
    }

    /// Fails the in-flight fetch with [`FetchError::TimedOut`] once it is older than
    /// `fetch_timeout_ms`.
    ///
    /// A late completion for the timed-out ticket is rejected as stale.
    pub fn update_timeouts(&mut self, now_ms: u64) -> Option<Completion> {
        let timeout = self.options.fetch_timeout_ms?;
        let request = self.in_flight?;
        let elapsed_ms = now_ms.saturating_sub(request.issued_at_ms);
        if elapsed_ms < timeout {
            return None;
        }
        self.complete(request.ticket, Err(FetchError::TimedOut { elapsed_ms }))
            .ok()
    }

    /// Abandons the in-flight fetch, if any, and returns to [`Phase::Idle`].
    ///
    /// The list is kept. A late completion for the abandoned ticket is rejected as stale.
    pub fn cancel(&mut self) -> Option<FetchRequest> {
        let request = self.in_flight.take()?;
        self.phase = Phase::Idle;
        pdebug!(ticket = ?request.ticket, "Paginator::cancel");
        Some(request)
    }

    /// Leaves [`Phase::Exhausted`] so that display events can trigger fetches again.
    pub fn resume(&mut self) {
        if self.phase == Phase::Exhausted {
            self.phase = Phase::Idle;
        }
    }

    /// Drops every item, cancels the in-flight fetch and starts over from [`Phase::Idle`].
    ///
    /// Tickets issued before the reset can no longer complete.
    pub fn reset(&mut self) {
        self.store.clear();
        self.in_flight = None;
        self.phase = Phase::Idle;
        self.generation = self.generation.wrapping_add(1);
        self.pages_loaded = 0;
        self.last_error = None;
        pdebug!(generation = self.generation, "Paginator::reset");
    }
}
