// packages/engine/src/runtime/mod.rs
//! Cooperative thread runtime
//!
//! This module provides the scheduling core of the hardware:
//!
//! - **Thread**: execution state, priority and run-state of one logical thread
//! - **Thread Table**: slot storage with id recycling
//! - **Admission**: priority-based promotion and preemption under a hard cap
//! - **Stepper**: interface to the program semantics plugged into the hardware
//! - **Hardware**: the per-cycle step loop tying it all together
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Hardware                           │
//! │                                                         │
//! │  Event Queue ──drain──▶ Event Library ──spawn──┐        │
//! │                                                ▼        │
//! │  ┌──────────┐   admit    ┌──────────┐   step  ┌──────┐  │
//! │  │ Pending  │ ─────────▶ │  Active  │ ──────▶ │Stepper│ │
//! │  │  (FIFO)  │  /evict    │ (≤ cap)  │         └──────┘  │
//! │  └──────────┘            └──────────┘                   │
//! │        ▲                      │ dead                    │
//! │        │     ┌──────────┐     ▼                         │
//! │        └──── │  Unused  │ ◀── reap                      │
//! │   allocate   └──────────┘                               │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod admission;
pub mod hardware;
pub mod stepper;
pub mod thread;
pub mod thread_table;

// Re-export commonly used types
pub use admission::{AdmissionController, AdmissionReport};
pub use hardware::{Hardware, HardwareStats};
pub use stepper::ExecutionStepper;
pub use thread::{Clear, ModuleId, Thread, ThreadId, ThreadState, DEFAULT_PRIORITY};
pub use thread_table::ThreadTable;
