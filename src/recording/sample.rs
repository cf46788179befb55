//! Recorded sample types

use bevy::prelude::*;

use crate::interaction::InteractableId;

/// Position and orientation of an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            orientation: transform.rotation,
        }
    }

    /// Write this pose into a transform, leaving scale untouched
    pub fn apply_to(&self, transform: &mut Transform) {
        transform.translation = self.position;
        transform.rotation = self.orientation;
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.orientation)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

/// Discrete locomotion state reported by the motion source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locomotion {
    #[default]
    Idle,
    Walking,
    Running,
}

/// Animation-facing motion flags stored per sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionFlags {
    pub walking: bool,
    pub running: bool,
    /// True only on the tick the jump input began
    pub jump_triggered: bool,
}

impl MotionFlags {
    pub fn new(locomotion: Locomotion, jump_triggered: bool) -> Self {
        Self {
            walking: locomotion == Locomotion::Walking,
            running: locomotion == Locomotion::Running,
            jump_triggered,
        }
    }
}

/// An interaction initiated on the sampled tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionEvent {
    /// Resolved once, at record time
    pub target: InteractableId,
}

/// One recorded frame
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Seconds since recording start
    pub offset: f32,
    pub pose: Pose,
    pub motion: MotionFlags,
    pub interaction: Option<InteractionEvent>,
}

/// A finished, owned sample sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    samples: Vec<Sample>,
}

impl Recording {
    /// Build a recording, sorting by offset so playback can rely on order.
    pub fn new(mut samples: Vec<Sample>) -> Self {
        if !samples.is_sorted_by(|a, b| a.offset <= b.offset) {
            samples.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        }
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Offset of the last sample (0 when empty)
    pub fn duration(&self) -> f32 {
        self.samples.last().map(|s| s.offset).unwrap_or(0.0)
    }

    pub fn interaction_count(&self) -> usize {
        self.samples.iter().filter(|s| s.interaction.is_some()).count()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(offset: f32) -> Sample {
        Sample {
            offset,
            pose: Pose::default(),
            motion: MotionFlags::default(),
            interaction: None,
        }
    }

    #[test]
    fn test_running_excludes_walking() {
        let flags = MotionFlags::new(Locomotion::Running, false);
        assert!(flags.running);
        assert!(!flags.walking);

        let flags = MotionFlags::new(Locomotion::Walking, true);
        assert!(flags.walking);
        assert!(!flags.running);
        assert!(flags.jump_triggered);
    }

    #[test]
    fn test_recording_orders_samples() {
        let recording = Recording::new(vec![sample_at(2.0), sample_at(0.0), sample_at(1.0)]);
        let offsets: Vec<f32> = recording.samples().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 1.0, 2.0]);
        assert_eq!(recording.duration(), 2.0);
    }

    #[test]
    fn test_pose_round_trips_through_transform() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 0.0), Quat::from_rotation_z(0.5));
        let mut transform = Transform::from_scale(Vec3::splat(2.0));
        pose.apply_to(&mut transform);
        assert_eq!(Pose::from_transform(&transform), pose);
        assert_eq!(transform.scale, Vec3::splat(2.0));
    }
}
