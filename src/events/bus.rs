//! Loop event bus
//!
//! Cycle, echo, interaction and plate transitions land here in tick order.
//! The `.evlog` writer empties it each frame; headless runs and tests empty it
//! themselves. A disabled bus drops everything, which is what an app without
//! a log gets.

use bevy::prelude::*;

use super::types::LoopEvent;

/// A loop event stamped with the app clock
#[derive(Debug, Clone)]
pub struct BusEvent {
    /// App clock in whole milliseconds when the event was emitted
    pub time_ms: u32,
    pub event: LoopEvent,
}

#[derive(Resource, Default)]
pub struct EventBus {
    pending: Vec<BusEvent>,
    /// Stamp applied to events emitted this frame
    elapsed_ms: u32,
    enabled: bool,
}

impl EventBus {
    /// A bus that keeps events until drained
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// A bus that drops every event
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.elapsed_ms = (elapsed_secs * 1000.0) as u32;
    }

    pub fn emit(&mut self, event: LoopEvent) {
        if self.enabled {
            let time_ms = self.elapsed_ms;
            self.pending.push(BusEvent { time_ms, event });
        }
    }

    /// Events not yet drained, oldest first
    pub fn peek(&self) -> &[BusEvent] {
        &self.pending
    }

    /// Take every pending event, leaving the bus empty
    pub fn drain(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.pending)
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

/// Stamp this frame's events with the app clock. Runs first in the loop.
pub fn update_event_bus_time(mut bus: ResMut<EventBus>, time: Res<Time>) {
    bus.update_time(time.elapsed_secs());
}
