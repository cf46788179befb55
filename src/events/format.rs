//! Compact text format for loop event serialization
//!
//! Format: `T:NNNNNN|CODE|data...`
//! - T:NNNNNN = timestamp in milliseconds (6 digits, wraps at 999999)
//! - CODE = 2-char event type code
//! - data = pipe-separated values specific to event type
//!
//! Examples:
//! ```text
//! T:000000|SS|5b0e...|2026-10-18T12:00:00
//! T:001250|CS|1|c41f...|-120.0,40.0,0.0
//! T:003400|IN|L|lever_west
//! T:011250|CE|1|timeout|600
//! T:011250|ES|1|12v0
//! T:012000|IN|E1|lever_west
//! T:012100|PR|plate_north|forced
//! ```

use bevy::prelude::*;

use super::types::LoopEvent;

/// Format a position with fixed precision (1 decimal)
fn fmt_pos(pos: Vec3) -> String {
    format!("{:.1},{:.1},{:.1}", pos.x, pos.y, pos.z)
}

/// Serialize a LoopEvent to compact text format
pub fn serialize_event(time_ms: u32, event: &LoopEvent) -> String {
    let ts = format!("T:{:06}", time_ms % 1_000_000);
    let code = event.type_code();

    let data = match event {
        LoopEvent::SessionStart {
            session_id,
            timestamp,
        } => format!("{}|{}", session_id, timestamp),
        LoopEvent::CycleStarted {
            cycle,
            cycle_id,
            start,
        } => format!("{}|{}|{}", cycle, cycle_id, fmt_pos(*start)),
        LoopEvent::CycleEnded {
            cycle,
            reason,
            samples,
        } => format!("{}|{}|{}", cycle, reason, samples),
        LoopEvent::GuardWarning { guard } => guard.to_string(),
        LoopEvent::EchoSpawned { cycle, echo } => format!("{}|{}", cycle, echo),
        LoopEvent::EchoSpawnFailed { cycle, reason } => format!("{}|{}", cycle, reason),
        LoopEvent::EchoDespawned { echo } => echo.to_string(),
        LoopEvent::Interaction { performer, target } => format!("{}|{}", performer, target),
        LoopEvent::PlatePressed { plate } => plate.clone(),
        LoopEvent::PlateReleased { plate, forced } => {
            if *forced {
                format!("{}|forced", plate)
            } else {
                plate.clone()
            }
        }
    };

    format!("{}|{}|{}", ts, code, data)
}
