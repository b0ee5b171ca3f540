use hermes_core::Trade;
use std::collections::VecDeque;
use parking_lot::Mutex;
use std::fmt;

use crate::error::BrokerError;

/// Outcome handed back to the submitter
pub type TradeResult = std::result::Result<Trade, BrokerError>;

/// Completion callback, invoked exactly once
pub type Completion = Box<dyn FnOnce(TradeResult) + Send + 'static>;

/// A submitted trade plus its completion callback
pub struct WorkItem {
    trade: Trade,
    on_complete: Completion,
}

impl WorkItem {
    pub fn new(trade: Trade, on_complete: impl FnOnce(TradeResult) + Send + 'static) -> Self {
        Self {
            trade,
            on_complete: Box::new(on_complete),
        }
    }

    pub fn trade(&self) -> &Trade {
        &self.trade
    }

    pub fn into_parts(self) -> (Trade, Completion) {
        (self.trade, self.on_complete)
    }

    /// Consume the item, firing its callback
    pub fn complete(self, result: TradeResult) {
        (self.on_complete)(result)
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("trade", &self.trade)
            .finish_non_exhaustive()
    }
}

/// Unbounded FIFO shared by every producer
///
/// Producers never block on a full queue. Once closed, the queue refuses new
/// items and hands them back to the caller; items already queued stay
/// available to `dequeue`.
pub struct TradeQueue<T = WorkItem> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> TradeQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
        }
    }

    /// Append to the tail, or give the item back if the queue is closed
    pub fn enqueue(&self, item: T) -> std::result::Result<(), T> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(item);
        }
        inner.items.push_back(item);
        Ok(())
    }

    /// Remove and return the head, or `None` when empty
    pub fn dequeue(&self) -> Option<T> {
        self.inner.lock().items.pop_front()
    }

    /// Refuse every later `enqueue`
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Point-in-time snapshot; may be stale by the time it is read
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }
}

impl<T> Default for TradeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
