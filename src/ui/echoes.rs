//! Echo visuals

use bevy::prelude::*;

use crate::constants::*;
use crate::playback::{Echo, MotionAnimator};

/// Give newly spawned echoes a translucent copy of the actor sprite
pub fn dress_new_echoes(mut commands: Commands, echoes: Query<Entity, Added<Echo>>) {
    for entity in &echoes {
        commands
            .entity(entity)
            .insert(Sprite::from_color(ACTOR_COLOR.with_alpha(ECHO_ALPHA), ACTOR_SIZE));
    }
}

/// Squash echoes on the tick they replay a jump; running echoes read brighter
pub fn animate_echoes(mut echoes: Query<(&MotionAnimator, &mut Sprite, &mut Transform), With<Echo>>) {
    for (animator, mut sprite, mut transform) in &mut echoes {
        transform.scale = if animator.jump_this_tick {
            Vec3::new(1.2, 0.8, 1.0)
        } else {
            Vec3::ONE
        };
        let alpha = if animator.running {
            ECHO_ALPHA + 0.2
        } else {
            ECHO_ALPHA
        };
        sprite.color = ACTOR_COLOR.with_alpha(alpha);
    }
}
