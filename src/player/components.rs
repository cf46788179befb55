//! Live actor components

use bevy::prelude::*;

use crate::recording::Locomotion;

/// Marker for the player-controlled actor.
/// The recorder is attached separately by the scene.
#[derive(Component)]
#[require(Velocity, MotionState, InteractionIntent, Facing)]
pub struct LiveActor;

/// 2D velocity in units per second
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Velocity(pub Vec2);

/// Motion flags produced this tick
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct MotionState {
    pub locomotion: Locomotion,
    /// True only on the tick the jump input began
    pub jump_triggered: bool,
}

/// Interactable the actor invoked this tick, if any
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct InteractionIntent {
    pub target: Option<Entity>,
}

/// Unit vector the actor faces (top-down, +Y is up)
#[derive(Component, Debug, Clone, Copy)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec2::Y)
    }
}

impl Facing {
    /// Rotation about Z that turns +Y toward this facing
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_z(self.0.to_angle() - std::f32::consts::FRAC_PI_2)
    }
}
