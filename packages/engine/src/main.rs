// packages/engine/src/main.rs
//! SignalGP Engine
//!
//! Runs a synthetic workload on one hardware instance: every cycle a batch of
//! spawn events with random priorities arrives, each spawning a countdown
//! program, and the scheduler admits, preempts and reaps them.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use signalgp_engine::observability::{init_metrics, init_tracing};
use signalgp_engine::runtime::{
    Clear, ExecutionStepper, ModuleId, Thread, ThreadId, DEFAULT_PRIORITY,
};
use signalgp_engine::{EngineConfig, Event, EventLibrary, Hardware};
use tracing::{debug, info, trace};

/// Steps left before the program finishes
#[derive(Debug, Clone, Default)]
struct Countdown {
    remaining: usize,
}

impl Clear for Countdown {
    fn clear(&mut self) {
        self.remaining = 0;
    }
}

/// Module `i` counts down `i + 1` steps; tags are program lengths
#[derive(Debug, Clone)]
struct CountdownStepper {
    modules: usize,
    completed: u64,
}

impl CountdownStepper {
    fn new(modules: usize) -> Self {
        Self {
            modules,
            completed: 0,
        }
    }
}

impl ExecutionStepper for CountdownStepper {
    type ExecState = Countdown;
    type Tag = usize;

    fn find_module_match(&self, tag: &usize, limit: usize) -> Vec<ModuleId> {
        let mut modules: Vec<ModuleId> = (0..self.modules).collect();
        modules.sort_by_key(|&m| ((m + 1).abs_diff(*tag), m));
        modules.truncate(limit);
        modules
    }

    fn init_thread(&mut self, thread: &mut Thread<Countdown>, module_id: ModuleId) {
        thread.exec_state_mut().remaining = module_id + 1;
    }

    fn single_execution_step(hardware: &mut Hardware<'_, Self>, thread_id: ThreadId) {
        let (stepper, thread) = hardware.stepper_and_thread_mut(thread_id);
        let state = thread.exec_state_mut();
        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining > 0 {
            return;
        }

        thread.set_dead();
        stepper.completed += 1;
        if let Some(done) = hardware.event_lib().get_id("done") {
            hardware.trigger_event(&Event::new(done));
        }
    }
}

fn main() -> Result<()> {
    // Load configuration first: it decides how logging is set up
    let config = EngineConfig::load()?;

    init_tracing(&config.observability)?;
    let metrics = init_metrics(&config.observability)?;

    info!("Starting SignalGP engine v{}", signalgp_engine::VERSION);
    info!("Configuration loaded: {:?}", config);

    let mut event_lib = EventLibrary::<CountdownStepper>::new();
    let spawn = event_lib.add_event(
        "spawn",
        |hw: &mut Hardware<'_, CountdownStepper>, event: &Event| {
            let tag = event.data["tag"].as_u64().unwrap_or(1) as usize;
            let priority = event.data["priority"].as_f64().unwrap_or(DEFAULT_PRIORITY);
            if let Err(e) = hw.spawn_thread_with_tag(&tag, priority) {
                debug!("Spawn dropped: {}", e);
            }
        },
        "Spawn the program whose length best matches `tag`",
    )?;
    event_lib.add_event(
        "done",
        |_: &mut Hardware<'_, CountdownStepper>, _: &Event| {},
        "A program ran to completion",
    )?;
    event_lib.add_dispatcher("done", |hw: &mut Hardware<'_, CountdownStepper>, _: &Event| {
        trace!("Thread #{} completed", hw.current_thread_id());
    })?;

    let sim = &config.simulation;
    let max_len = sim.max_program_len.max(1);
    let mut rng = StdRng::seed_from_u64(sim.seed);
    let mut hardware = Hardware::with_config(
        &event_lib,
        CountdownStepper::new(max_len),
        config.hardware,
    )?;

    info!(
        "Running {} cycles ({} spawns per cycle)",
        sim.cycles, sim.spawns_per_cycle
    );

    for cycle in 0..sim.cycles {
        for _ in 0..sim.spawns_per_cycle {
            let tag = rng.gen_range(1..=max_len);
            let priority: f64 = rng.gen_range(0.0..10.0);
            hardware.queue_event(
                Event::new(spawn).with_data(serde_json::json!({
                    "tag": tag,
                    "priority": priority,
                })),
            );
        }

        hardware.single_process();

        if cycle % 10 == 0 {
            debug!("Cycle {}: {:?}", cycle, hardware.stats());
        }
    }

    info!(
        "Simulation finished: {}",
        serde_json::to_string(&hardware.stats())?
    );
    info!("Programs completed: {}", hardware.stepper().completed);

    if let Some(handle) = metrics {
        println!("{}", handle.render());
    }

    Ok(())
}
