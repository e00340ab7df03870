use std::fmt;
use std::sync::Weak;
use std::sync::mpsc::Sender;

use paginator::{FetchError, FetchRequest, FetchTicket};

/// A fetch outcome on its way back to the controller.
pub(crate) struct Delivery<T> {
    pub(crate) ticket: FetchTicket,
    pub(crate) result: Result<Vec<T>, FetchError>,
}

/// The fetch collaborator.
///
/// `fetch_page` must not block. Run the request however you like (a timer, a thread, an async
/// runtime) and hand the outcome to `reply` exactly once. The controller never has more than one
/// request outstanding.
///
/// Closures `FnMut(FetchRequest, PageReply<T>)` implement this trait.
pub trait PageSource<T> {
    fn fetch_page(&mut self, request: FetchRequest, reply: PageReply<T>);
}

impl<T, F: FnMut(FetchRequest, PageReply<T>)> PageSource<T> for F {
    fn fetch_page(&mut self, request: FetchRequest, reply: PageReply<T>) {
        self(request, reply)
    }
}

/// One-shot completion handle for a [`FetchRequest`].
///
/// The reply is `Send` when `T` is, so it can be completed from any thread; the result is applied
/// on the controller's next tick. It holds only a weak liveness token: once the controller is
/// dropped, reset or cancels the fetch, the reply is cancelled and `send` does nothing.
pub struct PageReply<T> {
    request: FetchRequest,
    tx: Sender<Delivery<T>>,
    alive: Weak<()>,
}

impl<T> PageReply<T> {
    pub(crate) fn new(request: FetchRequest, tx: Sender<Delivery<T>>, alive: Weak<()>) -> Self {
        Self { request, tx, alive }
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Returns `true` once nobody is waiting for this page anymore.
    pub fn is_cancelled(&self) -> bool {
        self.alive.strong_count() == 0
    }

    /// Delivers the outcome. Returns `false` if the reply was cancelled.
    pub fn send(self, result: Result<Vec<T>, FetchError>) -> bool {
        if self.is_cancelled() {
            adebug!(ticket = ?self.request.ticket, "dropping reply for a cancelled fetch");
            return false;
        }
        let delivery = Delivery {
            ticket: self.request.ticket,
            result,
        };
        self.tx.send(delivery).is_ok()
    }

    pub fn succeed(self, items: Vec<T>) -> bool {
        self.send(Ok(items))
    }

    pub fn fail(self, err: FetchError) -> bool {
        self.send(Err(err))
    }
}

impl<T> fmt::Debug for PageReply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageReply")
            .field("request", &self.request)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
