// packages/engine/src/events/event.rs
//! Signals delivered to the hardware

use serde::{Deserialize, Serialize};

/// Index of an event type in the event library
pub type EventId = usize;

/// An event to be handled by the hardware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type id (see [`EventLibrary`](crate::events::EventLibrary))
    pub id: EventId,

    /// Optional payload, `null` when absent
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload() {
        let event = Event::new(3);
        assert_eq!(event.id, 3);
        assert!(event.data.is_null());

        let event = Event::new(1).with_data(serde_json::json!({ "tag": 4 }));
        assert_eq!(event.data["tag"], 4);
    }

    #[test]
    fn test_event_deserializes_without_payload() {
        let event: Event = serde_json::from_str(r#"{ "id": 2 }"#).unwrap();
        assert_eq!(event, Event::new(2));
    }
}
