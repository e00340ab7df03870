use std::collections::VecDeque;

use paginator::{FetchError, FetchRequest};

use crate::{MainQueue, PageReply, PageSource};

/// A grid item: a label and the URL of its remote image.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Product {
    pub name: String,
    pub image_url: String,
}

impl Product {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
        }
    }

    /// The `n`-th demo product (1-based).
    pub fn numbered(n: usize) -> Self {
        Self::new(
            format!("Product {n}"),
            format!("https://source.unsplash.com/random/?product&{n}"),
        )
    }
}

/// Configuration for [`SimulatedProductSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulatedSourceOptions {
    /// Delay between the request and its reply.
    pub latency_ms: u64,
    /// Total number of products available. Requests past the end get empty pages.
    pub total: Option<usize>,
}

impl Default for SimulatedSourceOptions {
    fn default() -> Self {
        Self {
            latency_ms: 2_000,
            total: None,
        }
    }
}

impl SimulatedSourceOptions {
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_total(mut self, total: Option<usize>) -> Self {
        self.total = total;
        self
    }
}

/// A [`PageSource`] that fabricates numbered products after a fixed delay on a [`MainQueue`].
///
/// The page for a request at `offset` contains products `offset + 1 ..= offset + page_size`.
#[derive(Debug)]
pub struct SimulatedProductSource {
    queue: MainQueue,
    options: SimulatedSourceOptions,
    failures: VecDeque<FetchError>,
    requests: Vec<FetchRequest>,
}

impl SimulatedProductSource {
    pub fn new(queue: MainQueue, options: SimulatedSourceOptions) -> Self {
        Self {
            queue,
            options,
            failures: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    pub fn options(&self) -> &SimulatedSourceOptions {
        &self.options
    }

    pub fn set_total(&mut self, total: Option<usize>) {
        self.options.total = total;
    }

    /// Makes the next request fail with `err`. Queued failures are used in order.
    pub fn fail_next(&mut self, err: FetchError) {
        self.failures.push_back(err);
    }

    /// Every request received so far.
    pub fn requests(&self) -> &[FetchRequest] {
        &self.requests
    }

    fn page_for(&self, request: &FetchRequest) -> Vec<Product> {
        let end = request.offset.saturating_add(request.page_size);
        let end = match self.options.total {
            Some(total) => end.min(total),
            None => end,
        };
        (request.offset + 1..=end).map(Product::numbered).collect()
    }
}

impl PageSource<Product> for SimulatedProductSource {
    fn fetch_page(&mut self, request: FetchRequest, reply: PageReply<Product>) {
        self.requests.push(request);
        let result = match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(self.page_for(&request)),
        };
        adebug!(
            offset = request.offset,
            page = request.page_index,
            latency_ms = self.options.latency_ms,
            "simulated fetch scheduled"
        );
        self.queue.post_after(self.options.latency_ms, move || {
            if reply.is_cancelled() {
                return;
            }
            reply.send(result);
        });
    }
}
