//! Current position over the loaded paper list.
//!
//! The navigator holds a single index and knows nothing about where the
//! list comes from: callers pass the current length on every mutation.
//! Every effective change is published on a `watch` channel so the event
//! loop can react (prefetch check, redraw) without polling.

use tokio::sync::watch;

/// Bounded index over a list that only grows.
///
/// Invariant: `index < max(1, len)` for the `len` last passed in.
#[derive(Debug)]
pub struct Navigator {
    index: usize,
    tx: watch::Sender<usize>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { index: 0, tx }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Subscribes to index changes.
    ///
    /// The receiver sees the latest index only; intermediate values of a
    /// fast burst may be skipped.
    pub fn on_index_change(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }

    /// Moves one item forward. No-op at the last item or on an empty list.
    pub fn advance(&mut self, len: usize) -> bool {
        if len == 0 || self.index + 1 >= len {
            return false;
        }
        self.publish(self.index + 1)
    }

    /// Moves one item back. No-op at the first item.
    pub fn retreat(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.publish(self.index - 1)
    }

    /// Jumps to `index`, clamped to the list bounds.
    pub fn set_index(&mut self, index: usize, len: usize) -> bool {
        let target = index.min(len.saturating_sub(1));
        self.publish(target)
    }

    /// Re-establishes the bound after the list changed length.
    ///
    /// Growth never moves a valid index.
    pub fn clamp(&mut self, len: usize) -> bool {
        let max = len.saturating_sub(1);
        if self.index <= max {
            return false;
        }
        self.publish(max)
    }

    /// Back to the first item, publishing even when the index was already 0
    /// so listeners re-check the freshly emptied list.
    pub fn reset(&mut self) {
        self.index = 0;
        self.tx.send_replace(0);
    }

    fn publish(&mut self, index: usize) -> bool {
        if index == self.index {
            return false;
        }
        tracing::trace!(from = self.index, to = index, "Index changed");
        self.index = index;
        self.tx.send_replace(index);
        true
    }
}
