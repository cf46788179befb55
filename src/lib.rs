//! Echo Loop - record-and-replay "temporal echo" loop built with Bevy
//!
//! The live actor records its motion and interactions for one cycle; when the
//! cycle ends a semi-autonomous echo replays that recording forever, phase
//! locked to the cycle length, while the live actor starts over.

// Core modules
pub mod config_watcher;
pub mod constants;
pub mod events;
pub mod plugin;
pub mod settings;
pub mod simulation;

// Loop modules
pub mod cycle;
pub mod interaction;
pub mod playback;
pub mod recording;

// World modules
pub mod input;
pub mod player;
pub mod scene;
pub mod ui;
pub mod world;

// Re-export commonly used types for convenience
pub use config_watcher::{ConfigWatcher, check_config_changes};
pub use constants::*;
pub use cycle::{
    ConfigError, CycleCountdown, CyclePhase, CycleRequest, EndReason, Guard, LoopOrchestrator,
};
pub use events::{BusEvent, EventBus, EventLogConfig, EventLogger, LoopEvent};
pub use input::{PlayerInput, capture_input};
pub use interaction::{
    Interactable, InteractableId, InteractableRegistry, InteractionRequest, Performer,
};
pub use playback::{
    Echo, EchoBlueprint, EchoPlayback, EchoSpawnService, EchoSpawner, MotionAnimator,
    PlaybackTimeline, SpawnError, SpawnRequest,
};
pub use player::{Facing, InteractionIntent, LiveActor, MotionState, Velocity};
pub use plugin::{EchoLoopPlugin, EchoLoopSet};
pub use recording::{
    FrameRecorder, InteractionEvent, Locomotion, MotionFlags, Pose, Recording, Sample,
};
pub use scene::{SceneDef, spawn_scene};
pub use settings::{CurrentSettings, LoopSettings};
pub use world::{
    ActivationZone, CycleBoundarySync, Gate, Lever, PressurePlate, TriggerVolume,
};
