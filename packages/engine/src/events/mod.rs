// packages/engine/src/events/mod.rs
//! Event handling
//!
//! - **Event**: numeric id plus optional JSON payload
//! - **Event Queue**: FIFO buffer drained at the start of every cycle
//! - **Event Library**: caller-owned table of handlers and dispatchers
//!
//! # Architecture
//!
//! ```text
//! queue_event() → Event Queue → drain (start of cycle) → Event Library
//!                     ▲                                       │
//!                     └──── handler may queue more ───────────┤
//!                                                             ▼
//!                                                 spawn_thread_*() → Pending
//! ```

pub mod event;
pub mod event_library;
pub mod event_queue;

// Re-export commonly used types
pub use event::{Event, EventId};
pub use event_library::{EventDef, EventHandler, EventLibrary};
pub use event_queue::{EventQueue, QueueStats};
