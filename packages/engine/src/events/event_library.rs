// packages/engine/src/events/event_library.rs
//! Event library mapping event ids to handlers
//!
//! The library is owned by the caller and borrowed by every hardware instance
//! that uses it, so one table can serve a whole population of hardware.
//!
//! - **Handler**: runs on the receiving hardware when the event is handled
//!   (typically spawning threads)
//! - **Dispatchers**: run when the hardware triggers the event outward

use crate::events::event::{Event, EventId};
use crate::runtime::hardware::Hardware;
use crate::runtime::stepper::ExecutionStepper;
use crate::utils::errors::{EngineError, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Callback run against a hardware instance for an event
pub type EventHandler<X> = Box<dyn for<'lib> Fn(&mut Hardware<'lib, X>, &Event)>;

/// A registered event type
pub struct EventDef<X: ExecutionStepper> {
    /// Unique event name
    pub name: String,

    /// Human-readable description
    pub description: String,

    handler: EventHandler<X>,
    dispatchers: Vec<EventHandler<X>>,
}

/// Table of event types known to a population of hardware
pub struct EventLibrary<X: ExecutionStepper> {
    /// Event definitions, indexed by event id
    events: Vec<EventDef<X>>,

    /// Name to id mapping
    ids: HashMap<String, EventId>,
}

impl<X: ExecutionStepper> EventLibrary<X> {
    /// Create an empty event library
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// Register an event type; ids are assigned in registration order
    pub fn add_event<F>(
        &mut self,
        name: impl Into<String>,
        handler: F,
        description: impl Into<String>,
    ) -> Result<EventId>
    where
        F: for<'lib> Fn(&mut Hardware<'lib, X>, &Event) + 'static,
    {
        let name = name.into();
        if self.ids.contains_key(&name) {
            return Err(EngineError::ConfigError(format!(
                "Event already registered: {}",
                name
            )));
        }

        let id = self.events.len();
        debug!("Registering event {} as #{}", name, id);

        self.ids.insert(name.clone(), id);
        self.events.push(EventDef {
            name,
            description: description.into(),
            handler: Box::new(handler),
            dispatchers: Vec::new(),
        });

        Ok(id)
    }

    /// Attach a dispatcher run when hardware triggers the named event
    pub fn add_dispatcher<F>(&mut self, name: &str, dispatcher: F) -> Result<()>
    where
        F: for<'lib> Fn(&mut Hardware<'lib, X>, &Event) + 'static,
    {
        let id = self
            .get_id(name)
            .ok_or_else(|| EngineError::UnknownEvent(name.to_string()))?;
        self.events[id].dispatchers.push(Box::new(dispatcher));
        Ok(())
    }

    /// Run the event's handler on `hardware`
    pub fn handle_event(&self, hardware: &mut Hardware<'_, X>, event: &Event) {
        match self.events.get(event.id) {
            Some(def) => (def.handler)(hardware, event),
            None => warn!("No handler registered for event #{}", event.id),
        }
    }

    /// Run every dispatcher attached to the event
    pub fn trigger_event(&self, hardware: &mut Hardware<'_, X>, event: &Event) {
        match self.events.get(event.id) {
            Some(def) => {
                for dispatcher in &def.dispatchers {
                    dispatcher(hardware, event);
                }
            }
            None => warn!("Cannot trigger unknown event #{}", event.id),
        }
    }

    /// Lookup an event id by name
    pub fn get_id(&self, name: &str) -> Option<EventId> {
        self.ids.get(name).copied()
    }

    /// Lookup an event definition by id
    pub fn get(&self, id: EventId) -> Option<&EventDef<X>> {
        self.events.get(id)
    }

    /// Number of registered event types
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<X: ExecutionStepper> Default for EventLibrary<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: ExecutionStepper> fmt::Debug for EventLibrary<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.events.iter().map(|def| &def.name))
            .finish()
    }
}
