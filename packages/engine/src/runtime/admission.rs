// packages/engine/src/runtime/admission.rs
//! Priority-based admission control
//!
//! Enforces the cap on concurrently running threads. Each cycle the
//! controller promotes pending threads while there is room, then resolves
//! any remaining contention by priority:
//!
//! ```text
//! Pending (arrival order)        Candidates (min-heap, priority < max pending)
//! [p0, p1, p2, ...]              [weakest, ...]
//!   │                              │
//!   └────── p0 > weakest ? ────────┘
//!             │yes                  │no
//!       evict weakest,         drop p0 (DEAD)
//!       admit p0
//! ```
//!
//! Ties favour the running thread. Pending threads never carry over to the
//! next cycle: whatever is not admitted is reaped.

use crate::runtime::thread::{Clear, ThreadId};
use crate::runtime::thread_table::ThreadTable;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// Outcome of one admission pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdmissionReport {
    /// Pending threads promoted to running, in admission order
    pub admitted: Vec<ThreadId>,

    /// Running threads killed to make room
    pub evicted: Vec<ThreadId>,

    /// Pending threads dropped without running
    pub rejected: Vec<ThreadId>,
}

impl AdmissionReport {
    /// True when no thread changed state
    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty() && self.evicted.is_empty() && self.rejected.is_empty()
    }
}

/// Running thread that may lose its slot this cycle
#[derive(Debug, Clone, Copy)]
struct Candidate {
    priority: f64,
    thread_id: ThreadId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed so the max-heap yields the lowest priority (then lowest id) first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.thread_id.cmp(&self.thread_id))
    }
}

/// Admission controller
///
/// Holds a scratch heap so repeated passes do not reallocate.
#[derive(Debug, Clone, Default)]
pub struct AdmissionController {
    candidates: BinaryHeap<Candidate>,
}

impl AdmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve pending threads against `max_active_threads`
    pub fn resolve<S: Clear>(
        &mut self,
        table: &mut ThreadTable<S>,
        max_active_threads: usize,
    ) -> AdmissionReport {
        let mut report = AdmissionReport::default();

        // Free capacity: admit in arrival order
        while table.active_count() < max_active_threads {
            let Some(thread_id) = next_pending(table, &mut report) else {
                break;
            };
            table.activate(thread_id);
            report.admitted.push(thread_id);
        }

        if table.pending_count() == 0 {
            return report;
        }

        // Active threads at or above the strongest pending priority cannot lose
        let max_pending_priority = table
            .pending_ids()
            .iter()
            .map(|&id| table.thread(id))
            .filter(|thread| thread.is_pending())
            .map(|thread| thread.priority())
            .fold(f64::NEG_INFINITY, f64::max);

        self.candidates.clear();
        self.candidates.extend(table.active_ids().iter().filter_map(|&id| {
            let priority = table.thread(id).priority();
            (priority < max_pending_priority).then_some(Candidate {
                priority,
                thread_id: id,
            })
        }));

        trace!(
            "Admission contention: {} pending, {} candidates (max pending priority {})",
            table.pending_count(),
            self.candidates.len(),
            max_pending_priority
        );

        while let Some(&weakest) = self.candidates.peek() {
            let Some(pending_id) = next_pending(table, &mut report) else {
                break;
            };

            if table.thread(pending_id).priority() > weakest.priority {
                self.candidates.pop();
                debug!(
                    "Thread #{} (priority {}) evicts thread #{} (priority {})",
                    pending_id,
                    table.thread(pending_id).priority(),
                    weakest.thread_id,
                    weakest.priority
                );
                table.reap(weakest.thread_id);
                table.activate(pending_id);
                report.evicted.push(weakest.thread_id);
                report.admitted.push(pending_id);
            } else {
                trace!("Pending thread #{} lost contention", pending_id);
                table.reap(pending_id);
                report.rejected.push(pending_id);
            }
        }

        while let Some(pending_id) = table.pop_pending() {
            table.reap(pending_id);
            report.rejected.push(pending_id);
        }

        self.candidates.clear();

        if !report.rejected.is_empty() {
            debug!("Rejected {} pending threads", report.rejected.len());
        }

        report
    }

    /// Evict the weakest running threads until at most `max_active_threads` remain
    ///
    /// Used when the cap is lowered. Returns the evicted ids, weakest first.
    pub fn shrink<S: Clear>(
        &mut self,
        table: &mut ThreadTable<S>,
        max_active_threads: usize,
    ) -> Vec<ThreadId> {
        let excess = table.active_count().saturating_sub(max_active_threads);
        if excess == 0 {
            return Vec::new();
        }

        self.candidates.clear();
        self.candidates
            .extend(table.active_ids().iter().map(|&id| Candidate {
                priority: table.thread(id).priority(),
                thread_id: id,
            }));

        let mut evicted = Vec::with_capacity(excess);
        for _ in 0..excess {
            if let Some(weakest) = self.candidates.pop() {
                table.reap(weakest.thread_id);
                evicted.push(weakest.thread_id);
            }
        }

        self.candidates.clear();
        evicted
    }
}

/// Pop the oldest id that is still pending
///
/// Threads killed while queued (e.g. by an event handler) are reaped and
/// reported as rejected instead of being admitted.
fn next_pending<S: Clear>(
    table: &mut ThreadTable<S>,
    report: &mut AdmissionReport,
) -> Option<ThreadId> {
    while let Some(thread_id) = table.pop_pending() {
        if table.thread(thread_id).is_pending() {
            return Some(thread_id);
        }
        trace!("Pending thread #{} died before admission", thread_id);
        table.reap(thread_id);
        report.rejected.push(thread_id);
    }
    None
}
