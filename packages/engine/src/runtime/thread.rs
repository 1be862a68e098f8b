// packages/engine/src/runtime/thread.rs
//! Cooperative thread slots
//!
//! A thread is not an OS thread: it is an execution state owned by the
//! hardware plus a priority and a run-state. Its identity is the index of the
//! slot it occupies in the thread table.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Slot index of a thread in the thread table
pub type ThreadId = usize;

/// Identifier of a program module, as understood by the execution stepper
pub type ModuleId = usize;

/// Priority given to threads when the caller does not pick one
pub const DEFAULT_PRIORITY: f64 = 1.0;

/// Reset-to-blank capability required of execution states
pub trait Clear {
    /// Return the value to its blank state without reallocating
    fn clear(&mut self);
}

impl<T> Clear for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<T> Clear for VecDeque<T> {
    fn clear(&mut self) {
        VecDeque::clear(self);
    }
}

impl Clear for String {
    fn clear(&mut self) {
        String::clear(self);
    }
}

/// Run-state of a thread slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    Running,
    Pending,
    Dead,
}

/// A cooperative execution context
#[derive(Debug, Clone)]
pub struct Thread<S> {
    exec_state: S,
    priority: f64,
    run_state: ThreadState,
}

impl<S: Default> Default for Thread<S> {
    fn default() -> Self {
        Self {
            exec_state: S::default(),
            priority: DEFAULT_PRIORITY,
            run_state: ThreadState::Dead,
        }
    }
}

impl<S> Thread<S> {
    pub fn exec_state(&self) -> &S {
        &self.exec_state
    }

    pub fn exec_state_mut(&mut self) -> &mut S {
        &mut self.exec_state
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: f64) {
        self.priority = priority;
    }

    pub fn run_state(&self) -> ThreadState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == ThreadState::Running
    }

    pub fn is_pending(&self) -> bool {
        self.run_state == ThreadState::Pending
    }

    pub fn is_dead(&self) -> bool {
        self.run_state == ThreadState::Dead
    }

    /// Mark the thread finished. The step loop reclaims the slot at the end
    /// of the cycle.
    pub fn set_dead(&mut self) {
        self.run_state = ThreadState::Dead;
    }

    pub(crate) fn set_pending(&mut self) {
        self.run_state = ThreadState::Pending;
    }

    pub(crate) fn set_running(&mut self) {
        self.run_state = ThreadState::Running;
    }
}

impl<S: Clear> Thread<S> {
    /// Blank the execution state and return to DEAD with default priority
    pub fn reset(&mut self) {
        self.exec_state.clear();
        self.run_state = ThreadState::Dead;
        self.priority = DEFAULT_PRIORITY;
    }
}
