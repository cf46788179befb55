//! Echo playback.
//!
//! Each echo owns an [`EchoPlayback`]: a [`PlaybackTimeline`] over one cycle's
//! recording plus the interactable registry snapshot taken when it spawned.
//! Echoes never talk to each other or to the orchestrator after spawn.

mod echo;
mod spawner;
mod timeline;

pub use echo::{Echo, EchoPlayback, MotionAnimator, drive_echoes};
pub use spawner::{EchoBlueprint, EchoSpawnService, EchoSpawner, SpawnError, SpawnRequest};
pub use timeline::PlaybackTimeline;
