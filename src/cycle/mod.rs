//! Cycle orchestration - countdown and the record/spawn/reset state machine

mod countdown;
mod orchestrator;

pub use countdown::CycleCountdown;
pub use orchestrator::{
    ConfigError, CycleContext, CyclePhase, CycleRequest, EndReason, Guard, LoopOrchestrator,
    apply_loop_settings, forget_destroyed_echoes, run_loop_orchestrator,
};
