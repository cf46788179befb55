//! Reference motion/interaction source for the live actor
//!
//! Kinematic top-down movement: input direction times walk or run speed, no
//! acceleration. Interaction picks the nearest interactable in front of the
//! actor within reach.

use bevy::prelude::*;

use crate::constants::*;
use crate::input::PlayerInput;
use crate::interaction::{Interactable, InteractionRequest, Performer};
use crate::player::components::*;
use crate::recording::Locomotion;
use crate::settings::CurrentSettings;

/// Nearest candidate within `range` and inside the facing cone.
/// Candidates sitting on the origin count as in front.
pub fn pick_interaction_target(
    origin: Vec2,
    facing: Vec2,
    range: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Option<Entity> {
    let facing = facing.normalize_or(Vec2::Y);
    candidates
        .into_iter()
        .filter_map(|(entity, position)| {
            let to_target = position - origin;
            let distance = to_target.length();
            if distance > range {
                return None;
            }
            if distance > f32::EPSILON && facing.dot(to_target / distance) < INTERACT_CONE_COS {
                return None;
            }
            Some((entity, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

/// Apply buffered input to the live actor: move, set motion flags and
/// resolve an interaction intent for this tick.
pub fn apply_actor_input(
    time: Res<Time>,
    settings: Res<CurrentSettings>,
    mut input: ResMut<PlayerInput>,
    mut actors: Query<
        (
            &mut Transform,
            &mut Velocity,
            &mut MotionState,
            &mut InteractionIntent,
            &mut Facing,
        ),
        With<LiveActor>,
    >,
    interactables: Query<(Entity, &Transform), (With<Interactable>, Without<LiveActor>)>,
    mut requests: MessageWriter<InteractionRequest>,
) {
    let tuning = &settings.settings;
    let jump = std::mem::take(&mut input.jump_pressed);
    let interact = std::mem::take(&mut input.interact_pressed);

    for (mut transform, mut velocity, mut motion, mut intent, mut facing) in &mut actors {
        let dir = input.move_dir.clamp_length_max(1.0);

        if dir.length() > MOVE_DEADZONE {
            let (speed, locomotion) = if input.run_held {
                (tuning.run_speed, Locomotion::Running)
            } else {
                (tuning.walk_speed, Locomotion::Walking)
            };
            velocity.0 = dir * speed;
            facing.0 = dir.normalize();
            motion.locomotion = locomotion;
        } else {
            velocity.0 = Vec2::ZERO;
            motion.locomotion = Locomotion::Idle;
        }

        transform.translation += velocity.0.extend(0.0) * time.delta_secs();
        transform.rotation = facing.rotation();
        motion.jump_triggered = jump;

        intent.target = None;
        if interact {
            let origin = transform.translation.truncate();
            let candidates = interactables
                .iter()
                .map(|(entity, t)| (entity, t.translation.truncate()));
            intent.target =
                pick_interaction_target(origin, facing.0, tuning.interact_range, candidates);

            if let Some(target) = intent.target {
                requests.write(InteractionRequest {
                    target,
                    performer: Performer::Live,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_picks_nearest_in_front() {
        let ids = entities(2);
        let (near, far) = (ids[0], ids[1]);
        let target = pick_interaction_target(
            Vec2::ZERO,
            Vec2::Y,
            100.0,
            [(far, Vec2::new(0.0, 80.0)), (near, Vec2::new(10.0, 40.0))],
        );
        assert_eq!(target, Some(near));
    }

    #[test]
    fn test_ignores_out_of_range_and_behind() {
        let ids = entities(2);
        let (behind, distant) = (ids[0], ids[1]);
        let target = pick_interaction_target(
            Vec2::ZERO,
            Vec2::Y,
            100.0,
            [(behind, Vec2::new(0.0, -20.0)), (distant, Vec2::new(0.0, 150.0))],
        );
        assert_eq!(target, None);
    }

    #[test]
    fn test_overlapping_target_counts() {
        let under = entities(1)[0];
        let target = pick_interaction_target(Vec2::ONE, Vec2::X, 10.0, [(under, Vec2::ONE)]);
        assert_eq!(target, Some(under));
    }
}
