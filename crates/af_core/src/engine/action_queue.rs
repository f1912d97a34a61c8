//! Time-ordered queue of pending action requests.
//!
//! Sizes stay in the tens, so this is a sorted `Vec` with insertion at the
//! partition point. Equal execute instants keep insertion order, which is
//! what guarantees an `UltimateUp` never overtakes its `UltimateDown`.

use std::time::Instant;

use crate::engine::actions::ActionRequest;

#[derive(Debug, Default)]
pub struct ActionQueue {
    items: Vec<ActionRequest>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping non-decreasing `execute_at`; ties go after existing
    /// entries with the same instant (FIFO).
    pub fn enqueue(&mut self, request: ActionRequest) {
        let at = self.items.partition_point(|queued| queued.execute_at <= request.execute_at);
        self.items.insert(at, request);
        log::debug!(
            "enqueued {} (operator {}, queue len {})",
            request.kind,
            request.operator,
            self.items.len()
        );
    }

    /// Remove and return every request due at `now`, in execution order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<ActionRequest> {
        let due = self.items.partition_point(|queued| queued.execute_at <= now);
        self.items.drain(..due).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Instant of the next pending request, if any.
    pub fn next_execute_at(&self) -> Option<Instant> {
        self.items.first().map(|request| request.execute_at)
    }
}
