// packages/engine/src/runtime/stepper.rs
//! Execution stepper interface
//!
//! The hardware knows how to schedule threads but not how to run them. That
//! is delegated to an execution stepper, which owns the program
//! representation, the module lookup metric and the instruction semantics.

use crate::runtime::hardware::Hardware;
use crate::runtime::thread::{Clear, ModuleId, Thread, ThreadId};

/// Program execution semantics plugged into a [`Hardware`]
pub trait ExecutionStepper: Sized {
    /// Per-thread execution state
    type ExecState: Clear + Default;

    /// Reference used to look modules up
    type Tag;

    /// Up to `limit` module ids matching `tag`, best match first
    fn find_module_match(&self, tag: &Self::Tag, limit: usize) -> Vec<ModuleId>;

    /// Prepare a blanked thread to start running `module_id`
    fn init_thread(&mut self, thread: &mut Thread<Self::ExecState>, module_id: ModuleId);

    /// Advance thread `thread_id` by one unit of work
    ///
    /// The thread stays in its slot for the whole step, so handlers and
    /// dispatchers run from here see it live through [`Hardware::thread`].
    /// Use [`Hardware::stepper_and_thread_mut`] to reach the stepper and the
    /// thread together. Calling [`Thread::set_dead`] ends the thread at the
    /// end of the cycle.
    fn single_execution_step(hardware: &mut Hardware<'_, Self>, thread_id: ThreadId);

    /// Reset stepper-held hardware state on a full hardware reset
    fn reset_hardware_state(&mut self) {}
}
