// packages/engine/src/events/event_queue.rs
//! FIFO event queue
//!
//! Buffers events between cycles. The hardware drains it at the start of
//! every cycle, re-checking for emptiness after each dispatch so events
//! queued by handlers are drained in the same pass.

use crate::events::event::Event;
use serde::Serialize;
use std::collections::VecDeque;

/// Unbounded FIFO of pending events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    /// Underlying queue, oldest first
    queue: VecDeque<Event>,

    /// Push counter
    push_count: u64,

    /// Pop counter
    pop_count: u64,
}

impl EventQueue {
    /// Create an empty event queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the tail
    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
        self.push_count += 1;
    }

    /// Pop the oldest event
    pub fn try_pop(&mut self) -> Option<Event> {
        let event = self.queue.pop_front()?;
        self.pop_count += 1;
        Some(event)
    }

    /// Discard every queued event. Counters are kept.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Queued events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count,
            pop_count: self.pop_count,
            current_size: self.queue.len(),
        }
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Total events pushed
    pub push_count: u64,

    /// Total events popped
    pub pop_count: u64,

    /// Current queue size
    pub current_size: usize,
}
