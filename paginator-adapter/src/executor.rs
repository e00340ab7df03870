use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

type LocalTask = Box<dyn FnOnce()>;
type RemoteTask = Box<dyn FnOnce() + Send>;

struct QueueInner {
    now_ms: u64,
    next_seq: u64,
    // (deadline, seq) keeps FIFO order among tasks with the same deadline.
    timers: BTreeMap<(u64, u64), LocalTask>,
}

/// A single-threaded, serialized task queue standing in for a UI main loop.
///
/// This type does not own a thread or read a clock. Your adapter drives it by calling
/// `tick(now_ms)` from its frame/timer callback; every task runs on that caller's thread, one at
/// a time, in deadline order (FIFO for equal deadlines).
///
/// Other threads post work through a [`RemoteQueue`]; those tasks are picked up on the next tick.
///
/// Cloning a `MainQueue` yields another handle to the same queue.
#[derive(Clone)]
pub struct MainQueue {
    inner: Rc<RefCell<QueueInner>>,
    remote_tx: Sender<RemoteTask>,
    remote_rx: Rc<Receiver<RemoteTask>>,
}

/// A `Send` handle for posting tasks onto a [`MainQueue`] from other threads.
#[derive(Clone)]
pub struct RemoteQueue {
    tx: Sender<RemoteTask>,
}

impl RemoteQueue {
    /// Posts `task` to run on the main queue's next tick.
    ///
    /// Returns `false` if the queue is gone.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(task)).is_ok()
    }
}

impl fmt::Debug for RemoteQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RemoteQueue(..)")
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MainQueue {
    pub fn new() -> Self {
        let (remote_tx, remote_rx) = mpsc::channel();
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                now_ms: 0,
                next_seq: 0,
                timers: BTreeMap::new(),
            })),
            remote_tx,
            remote_rx: Rc::new(remote_rx),
        }
    }

    /// The time of the most recent tick.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    pub fn remote(&self) -> RemoteQueue {
        RemoteQueue {
            tx: self.remote_tx.clone(),
        }
    }

    /// Number of queued tasks (remote tasks not yet picked up are not counted).
    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Deadline of the earliest queued task.
    pub fn next_deadline(&self) -> Option<u64> {
        self.inner
            .borrow()
            .timers
            .first_key_value()
            .map(|(&(due, _), _)| due)
    }

    /// Queues `task` to run on the next tick.
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.post_after(0, task);
    }

    /// Queues `task` to run on the first tick at or after `now_ms() + delay_ms`.
    pub fn post_after(&self, delay_ms: u64, task: impl FnOnce() + 'static) {
        self.push(delay_ms, Box::new(task));
    }

    fn push(&self, delay_ms: u64, task: LocalTask) {
        let mut inner = self.inner.borrow_mut();
        let due = inner.now_ms.saturating_add(delay_ms);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.insert((due, seq), task);
        atrace!(due, seq, "MainQueue::push");
    }

    /// Advances the queue clock to `now_ms` and runs every task that is due.
    ///
    /// Tasks posted while ticking run in the same tick if they are due. Time never moves
    /// backwards; an earlier `now_ms` is treated as the current time.
    ///
    /// Returns the number of tasks run.
    pub fn tick(&self, now_ms: u64) -> usize {
        {
            let mut inner = self.inner.borrow_mut();
            if now_ms < inner.now_ms {
                awarn!(now_ms, current = inner.now_ms, "MainQueue::tick: clock went backwards");
            }
            inner.now_ms = inner.now_ms.max(now_ms);
        }

        while let Ok(task) = self.remote_rx.try_recv() {
            self.push(0, task);
        }

        let mut ran = 0usize;
        loop {
            let task = {
                let mut inner = self.inner.borrow_mut();
                let now = inner.now_ms;
                let next_due = inner.timers.first_key_value().map(|(&(due, _), _)| due);
                match next_due {
                    Some(due) if due <= now => inner.timers.pop_first().map(|(_, task)| task),
                    _ => None,
                }
            };
            // The borrow is released here so tasks can post more work.
            let Some(task) = task else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    /// Advances the clock by `delta_ms` and runs what is due.
    pub fn advance(&self, delta_ms: u64) -> usize {
        let now = self.now_ms().saturating_add(delta_ms);
        self.tick(now)
    }

    /// Jumps from deadline to deadline until nothing is queued.
    ///
    /// Useful for tests and demos. Returns the final clock value.
    pub fn run_until_idle(&self) -> u64 {
        self.tick(self.now_ms());
        while let Some(due) = self.next_deadline() {
            self.tick(due);
        }
        self.now_ms()
    }
}

impl fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MainQueue")
            .field("now_ms", &inner.now_ms)
            .field("pending", &inner.timers.len())
            .finish_non_exhaustive()
    }
}
