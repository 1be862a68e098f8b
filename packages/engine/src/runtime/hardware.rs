// packages/engine/src/runtime/hardware.rs
//! Signal-driven virtual hardware
//!
//! Owns the thread table, the event queue and the admission controller, and
//! sequences them once per cycle:
//!
//! 1. Drain the event queue through the event library (handlers may spawn
//!    pending threads or queue further events)
//! 2. Resolve pending threads against `max_active_threads`
//! 3. Give every running thread one step, in activation order
//! 4. Reap threads that died during the cycle
//!
//! Everything happens on the caller's thread; there is no parallelism
//! between or within cycles.

use crate::events::event::Event;
use crate::events::event_library::EventLibrary;
use crate::events::event_queue::EventQueue;
use crate::observability::names;
use crate::runtime::admission::{AdmissionController, AdmissionReport};
use crate::runtime::stepper::ExecutionStepper;
use crate::runtime::thread::{ModuleId, Thread, ThreadId};
use crate::runtime::thread_table::ThreadTable;
use crate::utils::config::HardwareConfig;
use crate::utils::errors::{EngineError, Result};
use metrics::{counter, gauge};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info, trace};

/// Virtual hardware running cooperative threads on an execution stepper
pub struct Hardware<'lib, X: ExecutionStepper> {
    /// Events this hardware knows how to handle (shared, not owned)
    event_lib: &'lib EventLibrary<X>,

    /// Execution semantics
    stepper: X,

    /// Events waiting for the next cycle
    event_queue: EventQueue,

    /// Thread slots and id bookkeeping
    threads: ThreadTable<X::ExecState>,

    /// Priority resolution for pending threads
    admission: AdmissionController,

    /// Maximum number of concurrently running threads
    max_active_threads: usize,

    /// Thread being stepped, if any
    cur_thread_id: Option<ThreadId>,

    /// Inside a cycle
    is_executing: bool,

    /// Completed cycles
    cycles: u64,
}

/// Snapshot of thread usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardwareStats {
    pub cycles: u64,
    pub active_threads: usize,
    pub pending_threads: usize,
    pub unused_threads: usize,
    pub thread_space: usize,
    pub max_active_threads: usize,
    pub max_thread_space: usize,
    pub queued_events: usize,
}

impl<'lib, X: ExecutionStepper> Hardware<'lib, X> {
    /// Create hardware with default limits (64 active, 512 total)
    pub fn new(event_lib: &'lib EventLibrary<X>, stepper: X) -> Self {
        Self::build(event_lib, stepper, HardwareConfig::default())
    }

    /// Create hardware with custom limits
    pub fn with_config(
        event_lib: &'lib EventLibrary<X>,
        stepper: X,
        config: HardwareConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(event_lib, stepper, config))
    }

    fn build(event_lib: &'lib EventLibrary<X>, stepper: X, config: HardwareConfig) -> Self {
        debug!(
            "Initializing hardware ({} active threads, {} thread space)",
            config.max_active_threads, config.max_thread_space
        );

        Self {
            event_lib,
            stepper,
            event_queue: EventQueue::new(),
            threads: ThreadTable::new(&config),
            admission: AdmissionController::new(),
            max_active_threads: config.max_active_threads,
            cur_thread_id: None,
            is_executing: false,
            cycles: 0,
        }
    }

    /// Full reset: stepper hardware state, event queue and all threads
    ///
    /// # Panics
    ///
    /// Panics if called during a cycle.
    pub fn reset(&mut self) {
        assert!(!self.is_executing, "Cannot reset hardware while executing");
        self.stepper.reset_hardware_state();
        self.reset_state();
    }

    /// Clear the event queue and return every thread to the unused pool,
    /// leaving the stepper untouched
    ///
    /// # Panics
    ///
    /// Panics if called during a cycle.
    pub fn reset_state(&mut self) {
        assert!(!self.is_executing, "Cannot reset hardware while executing");
        self.event_queue.clear();
        self.threads.reset_all();
        self.cur_thread_id = None;
        info!("Hardware state reset");
    }

    /// Spawn a pending thread running `module_id`
    ///
    /// The thread competes for admission at the start of the next cycle.
    pub fn spawn_thread_with_id(&mut self, module_id: ModuleId, priority: f64) -> Result<ThreadId> {
        let stepper = &mut self.stepper;
        let thread_id = self
            .threads
            .allocate(priority, |thread| stepper.init_thread(thread, module_id))?;

        counter!(names::THREADS_SPAWNED).increment(1);
        trace!("Spawned thread #{} for module {}", thread_id, module_id);
        Ok(thread_id)
    }

    /// Spawn a pending thread running the module that best matches `tag`
    pub fn spawn_thread_with_tag(&mut self, tag: &X::Tag, priority: f64) -> Result<ThreadId> {
        let module_id = self
            .stepper
            .find_module_match(tag, 1)
            .first()
            .copied()
            .ok_or(EngineError::NoModuleMatch)?;
        self.spawn_thread_with_id(module_id, priority)
    }

    /// Spawn up to `n` pending threads, one per matching module
    ///
    /// Stops early when the thread space is exhausted. Returns the ids that
    /// were spawned.
    pub fn spawn_threads(&mut self, tag: &X::Tag, n: usize, priority: f64) -> Vec<ThreadId> {
        let matches = self.stepper.find_module_match(tag, n);
        let mut thread_ids = Vec::with_capacity(matches.len());

        for module_id in matches {
            match self.spawn_thread_with_id(module_id, priority) {
                Ok(thread_id) => thread_ids.push(thread_id),
                Err(_) => break,
            }
        }

        thread_ids
    }

    /// Queue an event to be handled at the start of the next cycle
    pub fn queue_event(&mut self, event: Event) {
        self.event_queue.push(event);
    }

    /// Handle an event on this hardware now, bypassing the queue
    pub fn handle_event(&mut self, event: &Event) {
        let event_lib = self.event_lib;
        event_lib.handle_event(self, event);
        counter!(names::EVENTS_DISPATCHED).increment(1);
    }

    /// Trigger an event from this hardware (runs the library's dispatchers)
    pub fn trigger_event(&mut self, event: &Event) {
        let event_lib = self.event_lib;
        event_lib.trigger_event(self, event);
    }

    /// Run one cycle: drain events, admit pending threads, step, reap
    ///
    /// # Panics
    ///
    /// Panics if called from inside a cycle (e.g. by a handler or stepper).
    pub fn single_process(&mut self) {
        assert!(!self.is_executing, "Cycle already in progress");
        self.is_executing = true;

        // Handle events (which may spawn threads or queue more events)
        while let Some(event) = self.event_queue.try_pop() {
            self.handle_event(&event);
        }

        // Activate pending threads (which may evict running threads)
        let report = self.admission.resolve(&mut self.threads, self.max_active_threads);
        debug_assert!(self.threads.active_count() <= self.max_active_threads);
        self.record_admission(&report);

        self.execute_threads();

        let reaped = self.threads.compact();
        if !reaped.is_empty() {
            trace!("Reaped {} finished threads", reaped.len());
        }

        gauge!(names::ACTIVE_THREADS).set(self.threads.active_count() as f64);
        self.cycles += 1;
        self.is_executing = false;
    }

    /// Run `num_cycles` cycles back to back
    pub fn process(&mut self, num_cycles: usize) {
        for _ in 0..num_cycles {
            self.single_process();
        }
    }

    fn execute_threads(&mut self) {
        // The order cannot change while stepping: admission and compaction
        // only run outside this loop.
        let order_len = self.threads.exec_order().len();

        for position in 0..order_len {
            let thread_id = self.threads.exec_order()[position];
            if !self.threads.thread(thread_id).is_running() {
                continue;
            }

            self.cur_thread_id = Some(thread_id);
            X::single_execution_step(self, thread_id);
        }

        self.cur_thread_id = None;
    }

    fn record_admission(&self, report: &AdmissionReport) {
        if report.is_empty() {
            return;
        }

        counter!(names::THREADS_ADMITTED).increment(report.admitted.len() as u64);
        counter!(names::THREADS_EVICTED).increment(report.evicted.len() as u64);
        counter!(names::THREADS_REJECTED).increment(report.rejected.len() as u64);

        debug!(
            "Admission: {} admitted, {} evicted, {} rejected",
            report.admitted.len(),
            report.evicted.len(),
            report.rejected.len()
        );
    }

    /// Change the cap on running threads
    ///
    /// Lowering the cap below the current active count evicts the
    /// lowest-priority running threads immediately.
    ///
    /// # Panics
    ///
    /// Panics if called during a cycle.
    pub fn set_max_active_threads(&mut self, max_active_threads: usize) -> Result<()> {
        assert!(
            !self.is_executing,
            "Cannot adjust max active threads while executing"
        );
        if max_active_threads == 0 {
            return Err(EngineError::ConfigError(
                "max_active_threads must be greater than 0".to_string(),
            ));
        }

        self.max_active_threads = max_active_threads;
        let evicted = self.admission.shrink(&mut self.threads, max_active_threads);
        if !evicted.is_empty() {
            info!(
                "Evicted {} threads after lowering max active threads to {}",
                evicted.len(),
                max_active_threads
            );
            counter!(names::THREADS_EVICTED).increment(evicted.len() as u64);
            self.threads.compact();
        }

        Ok(())
    }

    /// Change the cap on thread slots
    ///
    /// The table never shrinks, so the cap cannot go below the current
    /// number of slots.
    ///
    /// # Panics
    ///
    /// Panics if called during a cycle.
    pub fn set_max_thread_space(&mut self, max_thread_space: usize) -> Result<()> {
        assert!(
            !self.is_executing,
            "Cannot adjust max thread space while executing"
        );
        if max_thread_space == 0 || max_thread_space < self.threads.len() {
            return Err(EngineError::ConfigError(format!(
                "max_thread_space must be at least {} (current table size)",
                self.threads.len().max(1)
            )));
        }

        self.threads.set_max_thread_space(max_thread_space);
        Ok(())
    }

    pub fn event_lib(&self) -> &'lib EventLibrary<X> {
        self.event_lib
    }

    pub fn stepper(&self) -> &X {
        &self.stepper
    }

    pub fn stepper_mut(&mut self) -> &mut X {
        &mut self.stepper
    }

    /// Borrow the stepper and one thread at the same time
    ///
    /// # Panics
    ///
    /// Panics if `thread_id` is out of range.
    pub fn stepper_and_thread_mut(
        &mut self,
        thread_id: ThreadId,
    ) -> (&mut X, &mut Thread<X::ExecState>) {
        (&mut self.stepper, self.threads.get_mut(thread_id))
    }

    pub fn max_active_threads(&self) -> usize {
        self.max_active_threads
    }

    /// Maximum number of active + pending threads
    pub fn max_thread_space(&self) -> usize {
        self.threads.max_thread_space()
    }

    /// Number of thread slots currently allocated
    pub fn thread_space(&self) -> usize {
        self.threads.len()
    }

    pub fn num_active_threads(&self) -> usize {
        self.threads.active_count()
    }

    pub fn num_pending_threads(&self) -> usize {
        self.threads.pending_count()
    }

    /// May exceed `max_active_threads`
    pub fn num_unused_threads(&self) -> usize {
        self.threads.unused_count()
    }

    pub fn active_thread_ids(&self) -> &BTreeSet<ThreadId> {
        self.threads.active_ids()
    }

    pub fn pending_thread_ids(&self) -> &VecDeque<ThreadId> {
        self.threads.pending_ids()
    }

    /// Unused ids; the last one is handed out next
    pub fn unused_thread_ids(&self) -> &[ThreadId] {
        self.threads.unused_ids()
    }

    /// Activation order. Between cycles every entry is running.
    pub fn thread_exec_order(&self) -> &[ThreadId] {
        self.threads.exec_order()
    }

    pub fn event_queue(&self) -> &EventQueue {
        &self.event_queue
    }

    pub fn threads(&self) -> &[Thread<X::ExecState>] {
        self.threads.threads()
    }

    /// Get a thread by id
    ///
    /// # Panics
    ///
    /// Panics if `thread_id` is out of range.
    pub fn thread(&self, thread_id: ThreadId) -> &Thread<X::ExecState> {
        self.threads.thread(thread_id)
    }

    /// # Panics
    ///
    /// Panics if `thread_id` is out of range.
    pub fn thread_mut(&mut self, thread_id: ThreadId) -> &mut Thread<X::ExecState> {
        self.threads.get_mut(thread_id)
    }

    /// Id of the thread being stepped
    ///
    /// # Panics
    ///
    /// Panics outside the execution phase of a cycle.
    pub fn current_thread_id(&self) -> ThreadId {
        match self.cur_thread_id {
            Some(thread_id) => thread_id,
            None => panic!("Hardware is not executing a thread; no current thread"),
        }
    }

    /// The thread being stepped
    ///
    /// # Panics
    ///
    /// Panics outside the execution phase of a cycle.
    pub fn current_thread(&self) -> &Thread<X::ExecState> {
        self.threads.thread(self.current_thread_id())
    }

    /// The thread being stepped, mutably (e.g. to change its priority on the fly)
    ///
    /// # Panics
    ///
    /// Panics outside the execution phase of a cycle.
    pub fn current_thread_mut(&mut self) -> &mut Thread<X::ExecState> {
        let thread_id = self.current_thread_id();
        self.threads.get_mut(thread_id)
    }

    /// Id of the thread being stepped, if any
    pub fn try_current_thread_id(&self) -> Option<ThreadId> {
        self.cur_thread_id
    }

    /// True while a cycle is in progress
    pub fn is_executing(&self) -> bool {
        self.is_executing
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Get thread usage statistics
    pub fn stats(&self) -> HardwareStats {
        HardwareStats {
            cycles: self.cycles,
            active_threads: self.threads.active_count(),
            pending_threads: self.threads.pending_count(),
            unused_threads: self.threads.unused_count(),
            thread_space: self.threads.len(),
            max_active_threads: self.max_active_threads,
            max_thread_space: self.threads.max_thread_space(),
            queued_events: self.event_queue.len(),
        }
    }
}

impl<'lib, X> Clone for Hardware<'lib, X>
where
    X: ExecutionStepper + Clone,
    X::ExecState: Clone,
{
    /// Duplicates all thread state; the event library stays shared
    fn clone(&self) -> Self {
        Self {
            event_lib: self.event_lib,
            stepper: self.stepper.clone(),
            event_queue: self.event_queue.clone(),
            threads: self.threads.clone(),
            admission: self.admission.clone(),
            max_active_threads: self.max_active_threads,
            cur_thread_id: self.cur_thread_id,
            is_executing: self.is_executing,
            cycles: self.cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::stepper::testing::CountdownStepper;

    type Hw<'lib> = Hardware<'lib, CountdownStepper>;

    /// A thread running this module never finishes on its own
    const FOREVER: usize = usize::MAX;

    fn hardware<'lib>(
        lib: &'lib EventLibrary<CountdownStepper>,
        lengths: Vec<usize>,
        max_active: usize,
        max_space: usize,
    ) -> Hw<'lib> {
        Hardware::with_config(
            lib,
            CountdownStepper::new(lengths),
            HardwareConfig::new(max_active, max_space),
        )
        .unwrap()
    }

    #[test]
    fn test_hardware_creation() {
        let lib = EventLibrary::new();
        let hw = Hardware::new(&lib, CountdownStepper::new(vec![1]));

        assert_eq!(hw.max_active_threads(), 64);
        assert_eq!(hw.max_thread_space(), 512);
        assert_eq!(hw.thread_space(), 128);
        assert_eq!(hw.num_unused_threads(), 128);
        assert_eq!(hw.num_active_threads(), 0);
        assert!(hw.try_current_thread_id().is_none());
        assert!(!hw.is_executing());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let lib = EventLibrary::new();
        let result = Hardware::with_config(
            &lib,
            CountdownStepper::new(vec![1]),
            HardwareConfig::new(0, 8),
        );
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_no_escalation_without_capacity() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![FOREVER], 2, 8);

        let ids: Vec<_> = (0..3)
            .map(|_| hw.spawn_thread_with_id(0, 1.0).unwrap())
            .collect();
        assert!(ids.iter().all(|&id| hw.thread(id).is_pending()));

        hw.single_process();
        assert!(hw.thread(ids[0]).is_running());
        assert!(hw.thread(ids[1]).is_running());
        assert!(!hw.thread(ids[2]).is_running());
        assert_eq!(hw.num_active_threads(), 2);

        hw.single_process();
        assert_eq!(hw.num_active_threads(), 2);
        assert!(!hw.active_thread_ids().contains(&ids[2]));
        assert_eq!(hw.num_pending_threads(), 0);
    }

    #[test]
    fn test_cascading_events_drained_before_admission() {
        let mut lib = EventLibrary::<CountdownStepper>::new();
        lib.add_event(
            "spawn",
            |hw: &mut Hardware<'_, CountdownStepper>, _: &Event| {
                hw.spawn_thread_with_id(0, 1.0).unwrap();
            },
            "",
        )
        .unwrap();
        lib.add_event(
            "chain",
            |hw: &mut Hardware<'_, CountdownStepper>, _: &Event| {
                hw.queue_event(Event::new(0));
            },
            "",
        )
        .unwrap();
        let mut hw = Hardware::new(&lib, CountdownStepper::new(vec![3]));

        hw.queue_event(Event::new(1));
        hw.single_process();

        assert!(hw.event_queue().is_empty());
        assert_eq!(hw.event_queue().stats().pop_count, 2);
        // The spawned thread was admitted and stepped in the same cycle
        assert_eq!(hw.num_active_threads(), 1);
        assert_eq!(hw.stepper().stepped, vec![0]);
    }

    #[test]
    fn test_step_order_follows_activation() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![1, 10], 4, 8);

        hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.spawn_thread_with_id(1, 1.0).unwrap();
        hw.spawn_thread_with_id(1, 1.0).unwrap();
        hw.single_process();

        // Thread 0 finished and was reclaimed at the end of the cycle
        assert_eq!(hw.thread_exec_order(), &[1, 2]);
        assert_eq!(hw.unused_thread_ids().last(), Some(&0));

        let reused = hw.spawn_thread_with_id(1, 1.0).unwrap();
        assert_eq!(reused, 0);
        hw.single_process();

        assert_eq!(hw.stepper().stepped, vec![0, 1, 2, 1, 2, 0]);
        assert_eq!(hw.thread_exec_order(), &[1, 2, 0]);
    }

    #[test]
    fn test_dead_threads_free_capacity_for_next_cycle() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![1, FOREVER], 1, 4);

        let first = hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.single_process();
        assert_eq!(hw.num_active_threads(), 0);

        let second = hw.spawn_thread_with_id(1, 1.0).unwrap();
        assert_eq!(second, first);
        hw.single_process();

        assert_eq!(hw.num_active_threads(), 1);
        assert!(hw.thread(second).is_running());
    }

    #[test]
    fn test_thread_space_exhausted() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![FOREVER], 1, 2);

        hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.spawn_thread_with_id(0, 1.0).unwrap();
        let result = hw.spawn_thread_with_id(0, 1.0);

        assert!(matches!(result, Err(EngineError::ThreadSpaceExhausted { .. })));
        assert_eq!(hw.thread_space(), 2);
        assert_eq!(hw.num_pending_threads(), 2);
    }

    #[test]
    fn test_spawn_by_tag() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![5, 1, 3], 4, 8);

        let id = hw.spawn_thread_with_tag(&4, 2.0).unwrap();
        assert_eq!(hw.thread(id).exec_state().module, Some(0));
        assert_eq!(hw.thread(id).priority(), 2.0);

        let ids = hw.spawn_threads(&3, 2, 1.0);
        let modules: Vec<_> = ids
            .iter()
            .map(|&id| hw.thread(id).exec_state().module)
            .collect();
        assert_eq!(modules, vec![Some(2), Some(0)]);
    }

    #[test]
    fn test_spawn_threads_stops_when_exhausted() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![1, 2, 3], 1, 2);

        let ids = hw.spawn_threads(&2, 3, 1.0);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_spawn_without_match() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![], 1, 2);

        let result = hw.spawn_thread_with_tag(&1, 1.0);
        assert!(matches!(result, Err(EngineError::NoModuleMatch)));
        assert!(hw.spawn_threads(&1, 4, 1.0).is_empty());
    }

    #[test]
    fn test_reset_returns_threads_to_unused() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![FOREVER], 2, 8);
        for _ in 0..3 {
            hw.spawn_thread_with_id(0, 1.0).unwrap();
        }
        hw.single_process();
        hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.queue_event(Event::new(0));

        hw.reset();

        assert_eq!(hw.num_active_threads(), 0);
        assert_eq!(hw.num_pending_threads(), 0);
        assert_eq!(hw.num_unused_threads(), hw.thread_space());
        assert!(hw.thread_exec_order().is_empty());
        assert!(hw.event_queue().is_empty());
        assert_eq!(hw.stepper().resets, 1);
        assert!(hw.stepper().stepped.is_empty());
    }

    #[test]
    #[should_panic(expected = "while executing")]
    fn test_reset_during_cycle_panics() {
        let mut lib = EventLibrary::<CountdownStepper>::new();
        lib.add_event(
            "reset",
            |hw: &mut Hardware<'_, CountdownStepper>, _: &Event| hw.reset(),
            "",
        )
        .unwrap();
        let mut hw = Hardware::new(&lib, CountdownStepper::new(vec![1]));

        hw.queue_event(Event::new(0));
        hw.single_process();
    }

    #[test]
    #[should_panic(expected = "no current thread")]
    fn test_current_thread_outside_cycle_panics() {
        let lib = EventLibrary::new();
        let hw = Hardware::new(&lib, CountdownStepper::new(vec![1]));
        hw.current_thread_id();
    }

    #[test]
    fn test_dispatcher_updates_current_thread_mid_step() {
        let mut lib = EventLibrary::<CountdownStepper>::new();
        let boost = lib
            .add_event("boost", |_: &mut Hardware<'_, CountdownStepper>, _: &Event| {}, "")
            .unwrap();
        lib.add_dispatcher("boost", |hw: &mut Hardware<'_, CountdownStepper>, _: &Event| {
            let id = hw.current_thread_id();
            assert!(hw.thread(id).is_running());
            assert!(hw.active_thread_ids().contains(&id));

            let priority = hw.current_thread().priority();
            hw.thread_mut(id).set_priority(priority + 4.0);
        })
        .unwrap();

        let mut stepper = CountdownStepper::new(vec![FOREVER]);
        stepper.trigger_on_step = Some(boost);
        let mut hw = Hardware::new(&lib, stepper);
        let id = hw.spawn_thread_with_id(0, 5.0).unwrap();

        hw.single_process();
        assert_eq!(hw.thread(id).priority(), 9.0);
        hw.single_process();
        assert_eq!(hw.thread(id).priority(), 13.0);
        assert!(hw.thread(id).is_running());
    }

    #[test]
    fn test_dispatcher_can_end_current_thread() {
        let mut lib = EventLibrary::<CountdownStepper>::new();
        let stop = lib
            .add_event("stop", |_: &mut Hardware<'_, CountdownStepper>, _: &Event| {}, "")
            .unwrap();
        lib.add_dispatcher("stop", |hw: &mut Hardware<'_, CountdownStepper>, _: &Event| {
            hw.current_thread_mut().set_dead();
        })
        .unwrap();

        let mut stepper = CountdownStepper::new(vec![FOREVER]);
        stepper.trigger_on_step = Some(stop);
        let mut hw = Hardware::new(&lib, stepper);
        let id = hw.spawn_thread_with_id(0, 1.0).unwrap();

        hw.single_process();

        assert_eq!(hw.num_active_threads(), 0);
        assert_eq!(hw.unused_thread_ids().last(), Some(&id));
    }

    #[test]
    fn test_pending_thread_killed_by_handler_is_not_admitted() {
        let mut lib = EventLibrary::<CountdownStepper>::new();
        lib.add_event(
            "cancel",
            |hw: &mut Hardware<'_, CountdownStepper>, _: &Event| {
                let oldest = hw.pending_thread_ids()[0];
                hw.thread_mut(oldest).set_dead();
            },
            "",
        )
        .unwrap();
        let mut hw = Hardware::new(&lib, CountdownStepper::new(vec![FOREVER]));

        let cancelled = hw.spawn_thread_with_id(0, 1.0).unwrap();
        let kept = hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.queue_event(Event::new(0));
        hw.single_process();

        assert_eq!(hw.active_thread_ids().iter().copied().collect::<Vec<_>>(), vec![kept]);
        assert_eq!(hw.thread_exec_order(), &[kept]);
        assert!(hw.thread(cancelled).is_dead());
        assert!(hw.unused_thread_ids().contains(&cancelled));
        assert_eq!(hw.stepper().stepped, vec![kept]);
    }

    #[test]
    fn test_lower_max_active_threads_evicts_weakest() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![FOREVER], 4, 8);
        for priority in [3.0, 1.0, 2.0, 4.0] {
            hw.spawn_thread_with_id(0, priority).unwrap();
        }
        hw.single_process();

        hw.set_max_active_threads(2).unwrap();

        assert_eq!(hw.max_active_threads(), 2);
        assert_eq!(hw.active_thread_ids().iter().copied().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(hw.thread_exec_order(), &[0, 3]);
        assert!(hw.unused_thread_ids().contains(&1));
        assert!(hw.unused_thread_ids().contains(&2));
        assert!(hw.set_max_active_threads(0).is_err());
    }

    #[test]
    fn test_max_thread_space_cannot_shrink_table() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![FOREVER], 2, 8);
        assert_eq!(hw.thread_space(), 4);

        assert!(hw.set_max_thread_space(3).is_err());
        assert!(hw.set_max_thread_space(0).is_err());
        hw.set_max_thread_space(5).unwrap();

        for _ in 0..5 {
            hw.spawn_thread_with_id(0, 1.0).unwrap();
        }
        assert!(hw.spawn_thread_with_id(0, 1.0).is_err());
        assert_eq!(hw.thread_space(), 5);
    }

    #[test]
    fn test_clone_duplicates_thread_state() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![2], 2, 4);
        hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.single_process();

        let mut copy = hw.clone();
        copy.single_process();

        assert_eq!(hw.num_active_threads(), 1);
        assert_eq!(copy.num_active_threads(), 0);
        assert_eq!(hw.cycles(), 1);
        assert_eq!(copy.cycles(), 2);
        assert!(std::ptr::eq(hw.event_lib(), copy.event_lib()));
    }

    #[test]
    fn test_stats_snapshot() {
        let lib = EventLibrary::new();
        let mut hw = hardware(&lib, vec![FOREVER], 2, 8);
        hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.single_process();
        hw.spawn_thread_with_id(0, 1.0).unwrap();
        hw.queue_event(Event::new(0));

        let stats = hw.stats();
        assert_eq!(
            stats,
            HardwareStats {
                cycles: 1,
                active_threads: 1,
                pending_threads: 1,
                unused_threads: 2,
                thread_space: 4,
                max_active_threads: 2,
                max_thread_space: 8,
                queued_events: 1,
            }
        );
    }
}
