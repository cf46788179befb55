//! Event type definitions for the logging system

use bevy::prelude::*;

use crate::cycle::{EndReason, Guard};
use crate::interaction::{InteractableId, Performer};

/// All loop events that can be logged
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    // === Session Events ===
    /// Session started (generated once per launch)
    SessionStart {
        session_id: String, // UUID v4
        timestamp: String,  // ISO 8601
    },

    // === Cycle Events ===
    CycleStarted {
        cycle: u32,
        cycle_id: String, // UUID v4
        start: Vec3,
    },
    CycleEnded {
        cycle: u32,
        reason: EndReason,
        samples: usize,
    },
    /// A start/stop request was refused
    GuardWarning { guard: Guard },

    // === Echo Events ===
    EchoSpawned { cycle: u32, echo: Entity },
    EchoSpawnFailed { cycle: u32, reason: String },
    EchoDespawned { echo: Entity },

    // === World Events ===
    Interaction {
        performer: Performer,
        target: InteractableId,
    },
    PlatePressed { plate: String },
    PlateReleased { plate: String, forced: bool },
}

impl LoopEvent {
    /// Short code used in the .evlog format
    pub fn type_code(&self) -> &'static str {
        match self {
            LoopEvent::SessionStart { .. } => "SS",
            LoopEvent::CycleStarted { .. } => "CS",
            LoopEvent::CycleEnded { .. } => "CE",
            LoopEvent::GuardWarning { .. } => "GW",
            LoopEvent::EchoSpawned { .. } => "ES",
            LoopEvent::EchoSpawnFailed { .. } => "EF",
            LoopEvent::EchoDespawned { .. } => "ED",
            LoopEvent::Interaction { .. } => "IN",
            LoopEvent::PlatePressed { .. } => "PP",
            LoopEvent::PlateReleased { .. } => "PR",
        }
    }
}
