//! Event Bus - collects session events for the log
//!
//! Systems emit events as things happen; the logger drains the bus once per
//! frame in `Last`. Timestamps are taken from the bus clock, which is
//! updated at the start of every frame.

use bevy::prelude::*;

use super::types::ReceiverEvent;

/// Timestamped event
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// Milliseconds since app start
    pub time_ms: u32,
    pub event: ReceiverEvent,
}

#[derive(Resource, Default)]
pub struct EventBus {
    /// Events emitted this frame, waiting to be written
    pending: Vec<BusEvent>,

    /// Events already drained (kept for tests and the HUD)
    processed: Vec<BusEvent>,

    elapsed_ms: u32,

    /// Whether the bus is enabled (for testing)
    enabled: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Create a disabled event bus (events are dropped)
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.elapsed_ms = (elapsed_secs * 1000.0) as u32;
    }

    pub fn emit(&mut self, event: ReceiverEvent) {
        if !self.enabled {
            return;
        }
        self.pending.push(BusEvent {
            time_ms: self.elapsed_ms,
            event,
        });
    }

    /// Drain pending events, moving them to processed
    pub fn drain(&mut self) -> Vec<BusEvent> {
        let events = std::mem::take(&mut self.pending);
        self.processed.extend(events.iter().cloned());
        events
    }

    pub fn processed(&self) -> &[BusEvent] {
        &self.processed
    }

    pub fn clear_processed(&mut self) {
        self.processed.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// System to update the event bus time each frame
pub fn update_event_bus_time(mut bus: ResMut<EventBus>, time: Res<Time>) {
    bus.update_time(time.elapsed_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_drain() {
        let mut bus = EventBus::new();
        bus.update_time(1.5);

        bus.emit(ReceiverEvent::Connected {
            endpoint: "ws://localhost:8765".to_string(),
        });

        assert_eq!(bus.pending_count(), 1);

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_ms, 1500);
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(bus.processed().len(), 1);
    }

    #[test]
    fn test_disabled_bus() {
        let mut bus = EventBus::disabled();
        bus.emit(ReceiverEvent::PhaseEntered {
            phase: "flight".to_string(),
        });
        assert_eq!(bus.pending_count(), 0);
        assert!(!bus.is_enabled());
    }
}
