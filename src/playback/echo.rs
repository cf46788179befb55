//! Echo components and the per-tick playback system

use bevy::prelude::*;

use crate::interaction::{Interactable, InteractableRegistry, InteractionRequest, Performer};
use crate::recording::{MotionFlags, Recording};

use super::PlaybackTimeline;

/// Marker for spawned echo entities
#[derive(Component, Debug, Clone, Copy)]
pub struct Echo {
    /// Cycle whose recording this echo replays
    pub cycle: u32,
}

/// Playback controller owned by one echo.
///
/// Despawning the echo drops the timeline and registry snapshot with it.
#[derive(Component, Debug)]
pub struct EchoPlayback {
    pub timeline: PlaybackTimeline,
    pub registry: InteractableRegistry,
}

impl EchoPlayback {
    pub fn new(recording: Recording, cycle_duration: f32, registry: InteractableRegistry) -> Self {
        Self {
            timeline: PlaybackTimeline::new(recording, cycle_duration),
            registry,
        }
    }
}

/// Optional animation target for recorded motion flags.
/// Visual layers read it; playback works without it.
#[derive(Component, Debug, Default, Clone)]
pub struct MotionAnimator {
    pub walking: bool,
    pub running: bool,
    /// Jump triggers seen since spawn
    pub jumps: u32,
    /// Set on the tick a jump trigger is applied
    pub jump_this_tick: bool,
}

impl MotionAnimator {
    pub fn apply(&mut self, flags: MotionFlags) {
        self.walking = flags.walking;
        self.running = flags.running;
        if flags.jump_triggered {
            self.jumps += 1;
            self.jump_this_tick = true;
        }
    }
}

/// Advance every echo's timeline and apply whatever fell due this tick.
pub fn drive_echoes(
    time: Res<Time>,
    mut echoes: Query<(
        &Echo,
        &mut EchoPlayback,
        &mut Transform,
        Option<&mut MotionAnimator>,
    )>,
    interactables: Query<(Entity, &Interactable)>,
    mut requests: MessageWriter<InteractionRequest>,
) {
    let dt = time.delta_secs();

    for (echo, mut playback, mut transform, mut animator) in &mut echoes {
        if let Some(animator) = animator.as_deref_mut() {
            animator.jump_this_tick = false;
        }

        let EchoPlayback { timeline, registry } = &mut *playback;
        timeline.advance(dt, |sample| {
            sample.pose.apply_to(&mut transform);

            if let Some(animator) = animator.as_deref_mut() {
                animator.apply(sample.motion);
            }

            let Some(interaction) = &sample.interaction else {
                return;
            };
            // Nothing alive carries the id any more
            let Some(target) = registry.resolve_live(&interaction.target, &interactables) else {
                return;
            };
            requests.write(InteractionRequest {
                target,
                performer: Performer::Echo { cycle: echo.cycle },
            });
        });
    }
}
