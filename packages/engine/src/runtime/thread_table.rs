// packages/engine/src/runtime/thread_table.rs
//! Thread slot table with id recycling
//!
//! Rather than allocating a fresh context for every spawn, the table keeps a
//! growable set of slots and recycles the ids of dead threads.
//!
//! # Architecture
//!
//! ```text
//! ThreadTable
//! ├─ Slots:      [T0, T1, T2, ...]      (grows up to max_thread_space)
//! ├─ Unused:     [.., 5, 3]             (reuse stack, top = next id out)
//! ├─ Pending:    [7, 2, ...]            (FIFO, arrival order)
//! ├─ Active:     {0, 1, 4}              (RUNNING ids)
//! └─ Exec order: [0, 4, 1]              (activation order, compacted per cycle)
//! ```
//!
//! Between cycles every id sits in exactly one of unused, pending or active.

use crate::runtime::thread::{Clear, Thread, ThreadId};
use crate::utils::config::HardwareConfig;
use crate::utils::errors::{EngineError, Result};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, trace, warn};

/// Thread slots plus the bookkeeping that partitions their ids
#[derive(Debug, Clone)]
pub struct ThreadTable<S> {
    /// All slots, indexed by thread id
    threads: Vec<Thread<S>>,

    /// Free ids; the most recently freed id is reused first
    unused: Vec<ThreadId>,

    /// Ids awaiting admission, oldest first
    pending: VecDeque<ThreadId>,

    /// Ids currently running
    active: BTreeSet<ThreadId>,

    /// Activation order; may hold ids that died since the last compaction
    exec_order: Vec<ThreadId>,

    /// Upper bound on the number of slots
    max_thread_space: usize,
}

impl<S: Clear + Default> ThreadTable<S> {
    /// Create a table pre-sized to `min(2 * max_active_threads, max_thread_space)`
    pub fn new(config: &HardwareConfig) -> Self {
        let initial = config.initial_thread_space();
        let mut threads = Vec::with_capacity(initial);
        threads.resize_with(initial, Thread::default);

        Self {
            threads,
            unused: (0..initial).rev().collect(),
            pending: VecDeque::new(),
            active: BTreeSet::new(),
            exec_order: Vec::new(),
            max_thread_space: config.max_thread_space,
        }
    }

    /// Claim a slot for a new pending thread
    ///
    /// Reuses an unused id when one exists, otherwise grows the table by one
    /// slot. `init` runs on the blanked slot before it is marked pending.
    pub fn allocate<F>(&mut self, priority: f64, init: F) -> Result<ThreadId>
    where
        F: FnOnce(&mut Thread<S>),
    {
        let thread_id = if let Some(id) = self.unused.pop() {
            id
        } else if self.threads.len() < self.max_thread_space {
            self.threads.push(Thread::default());
            trace!("Grew thread table to {} slots", self.threads.len());
            self.threads.len() - 1
        } else {
            warn!(
                "Thread space exhausted ({} slots, none unused)",
                self.max_thread_space
            );
            return Err(EngineError::ThreadSpaceExhausted {
                max_thread_space: self.max_thread_space,
            });
        };

        let thread = &mut self.threads[thread_id];
        thread.reset();
        thread.set_priority(priority);
        init(thread);
        thread.set_pending();
        self.pending.push_back(thread_id);

        trace!("Allocated thread #{} (priority {})", thread_id, priority);
        Ok(thread_id)
    }
}

impl<S: Clear> ThreadTable<S> {
    /// Kill a thread and return its id to the unused pool
    pub fn reap(&mut self, thread_id: ThreadId) {
        let thread = self.get_mut(thread_id);
        thread.reset();
        self.active.remove(&thread_id);
        self.unused.push(thread_id);
    }

    /// Return every id to the unused pool. The table keeps its size.
    pub fn reset_all(&mut self) {
        for thread in &mut self.threads {
            thread.reset();
        }
        self.exec_order.clear();
        self.active.clear();
        self.pending.clear();
        self.unused.clear();
        self.unused.extend((0..self.threads.len()).rev());
        debug!("Reset thread table ({} slots unused)", self.unused.len());
    }

    /// Drop dead ids from the execution order, reaping any the stepper killed
    ///
    /// Ids evicted during admission were already reaped and are only dropped
    /// from the order here. Returns the ids reaped by this call.
    pub fn compact(&mut self) -> Vec<ThreadId> {
        let order = std::mem::take(&mut self.exec_order);
        let mut reaped = Vec::new();

        for thread_id in order {
            if self.threads[thread_id].is_running() {
                self.exec_order.push(thread_id);
            } else if self.active.contains(&thread_id) {
                self.reap(thread_id);
                reaped.push(thread_id);
            }
        }

        reaped
    }
}

impl<S> ThreadTable<S> {
    /// Mark a pending thread running and append it to the execution order
    pub fn activate(&mut self, thread_id: ThreadId) {
        debug_assert!(self.threads[thread_id].is_pending());
        self.threads[thread_id].set_running();
        self.active.insert(thread_id);
        self.exec_order.push(thread_id);
    }

    /// Pop the oldest pending id
    pub fn pop_pending(&mut self) -> Option<ThreadId> {
        self.pending.pop_front()
    }

    /// Get a thread by id
    ///
    /// # Panics
    ///
    /// Panics if `thread_id` is not a slot of this table.
    pub fn thread(&self, thread_id: ThreadId) -> &Thread<S> {
        assert!(
            thread_id < self.threads.len(),
            "Thread id {} out of range (table holds {} slots)",
            thread_id,
            self.threads.len()
        );
        &self.threads[thread_id]
    }

    /// Get a mutable thread by id
    ///
    /// # Panics
    ///
    /// Panics if `thread_id` is not a slot of this table.
    pub fn get_mut(&mut self, thread_id: ThreadId) -> &mut Thread<S> {
        assert!(
            thread_id < self.threads.len(),
            "Thread id {} out of range (table holds {} slots)",
            thread_id,
            self.threads.len()
        );
        &mut self.threads[thread_id]
    }

    pub fn threads(&self) -> &[Thread<S>] {
        &self.threads
    }

    /// Number of slots (used or not)
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn max_thread_space(&self) -> usize {
        self.max_thread_space
    }

    /// Raise or lower the slot cap. Callers check it against [`len`](Self::len).
    pub(crate) fn set_max_thread_space(&mut self, max_thread_space: usize) {
        self.max_thread_space = max_thread_space;
    }

    pub fn active_ids(&self) -> &BTreeSet<ThreadId> {
        &self.active
    }

    pub fn pending_ids(&self) -> &VecDeque<ThreadId> {
        &self.pending
    }

    pub fn unused_ids(&self) -> &[ThreadId] {
        &self.unused
    }

    pub fn exec_order(&self) -> &[ThreadId] {
        &self.exec_order
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn unused_count(&self) -> usize {
        self.unused.len()
    }
}
