//! Echo spawn service

use bevy::prelude::*;

use crate::recording::Pose;

use super::{Echo, EchoPlayback, MotionAnimator};

/// Everything needed to bring one echo into the world
pub struct SpawnRequest {
    pub cycle: u32,
    pub pose: Pose,
    pub playback: EchoPlayback,
    /// Echoes alive before this spawn
    pub live_echoes: usize,
}

/// Why an echo could not be spawned
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnError {
    CapacityReached { limit: usize },
    InvalidPose,
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnError::CapacityReached { limit } => write!(f, "echo limit of {} reached", limit),
            SpawnError::InvalidPose => write!(f, "spawn pose is not finite"),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Creates echo entities. Swappable so scenes and tests can decide what an
/// echo looks like or refuse to spawn one.
pub trait EchoSpawner: Send + Sync + 'static {
    fn spawn_echo(&self, commands: &mut Commands, request: SpawnRequest) -> Result<Entity, SpawnError>;
}

/// Resource wrapping the active spawner
#[derive(Resource)]
pub struct EchoSpawnService(pub Box<dyn EchoSpawner>);

impl EchoSpawnService {
    pub fn new(spawner: impl EchoSpawner) -> Self {
        Self(Box::new(spawner))
    }

    pub fn spawn_echo(&self, commands: &mut Commands, request: SpawnRequest) -> Result<Entity, SpawnError> {
        self.0.spawn_echo(commands, request)
    }
}

/// Default spawner: a bare echo with transform, playback and animator.
/// Rendering is added by whoever watches for `Added<Echo>`.
#[derive(Debug, Clone, Default)]
pub struct EchoBlueprint {
    pub max_echoes: Option<usize>,
}

impl EchoSpawner for EchoBlueprint {
    fn spawn_echo(&self, commands: &mut Commands, request: SpawnRequest) -> Result<Entity, SpawnError> {
        if let Some(limit) = self.max_echoes
            && request.live_echoes >= limit
        {
            return Err(SpawnError::CapacityReached { limit });
        }
        if !request.pose.is_finite() {
            return Err(SpawnError::InvalidPose);
        }

        let entity = commands
            .spawn((
                Name::new(format!("Echo {}", request.cycle)),
                Echo {
                    cycle: request.cycle,
                },
                request.pose.to_transform(),
                MotionAnimator::default(),
                request.playback,
            ))
            .id();
        Ok(entity)
    }
}
