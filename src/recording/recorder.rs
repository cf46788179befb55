use bevy::prelude::*;

use crate::interaction::Interactable;
use crate::player::{InteractionIntent, LiveActor, MotionState};

use super::{InteractionEvent, MotionFlags, Pose, Recording, Sample};

/// Per-tick recorder attached to the live actor.
///
/// Sampling is driven by [`record_frame`]; the recorder never advances its
/// own clock.
#[derive(Component, Debug, Default)]
pub struct FrameRecorder {
    samples: Vec<Sample>,
    active: bool,
    /// Seconds since the first sample of the session
    elapsed: f32,
}

impl FrameRecorder {
    /// Clear the previous buffer and begin sampling.
    /// Returns false (and changes nothing) if already recording.
    pub fn start(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.samples.clear();
        self.elapsed = 0.0;
        self.active = true;
        true
    }

    /// Stop sampling. Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }

    pub fn is_recording(&self) -> bool {
        self.active
    }

    /// Deep copy of the buffer. The buffer itself is kept until the next `start`.
    pub fn take_recording(&self) -> Recording {
        Recording::new(self.samples.clone())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Append one sample. `dt` is the tick delta since the previous sample;
    /// the first sample of a session always lands at offset 0.
    pub fn record(
        &mut self,
        dt: f32,
        pose: Pose,
        motion: MotionFlags,
        interaction: Option<InteractionEvent>,
    ) {
        if !self.active {
            return;
        }
        if !self.samples.is_empty() {
            self.elapsed += dt.max(0.0);
        }
        self.samples.push(Sample {
            offset: self.elapsed,
            pose,
            motion,
            interaction,
        });
    }
}

/// Sample the live actor once per tick while its recorder is active.
///
/// The interaction target is mapped to its stable id here, against the
/// interactables that exist right now.
pub fn record_frame(
    time: Res<Time>,
    mut actors: Query<
        (&Transform, &MotionState, &InteractionIntent, &mut FrameRecorder),
        With<LiveActor>,
    >,
    interactables: Query<&Interactable>,
) {
    for (transform, motion, intent, mut recorder) in &mut actors {
        if !recorder.is_recording() {
            continue;
        }

        let interaction = intent
            .target
            .and_then(|entity| interactables.get(entity).ok())
            .map(|interactable| InteractionEvent {
                target: interactable.id.clone(),
            });

        recorder.record(
            time.delta_secs(),
            Pose::from_transform(transform),
            MotionFlags::new(motion.locomotion, motion.jump_triggered),
            interaction,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractableId;
    use crate::recording::Locomotion;

    fn pose_x(x: f32) -> Pose {
        Pose::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY)
    }

    #[test]
    fn test_offsets_accumulate_from_zero() {
        let mut recorder = FrameRecorder::default();
        assert!(recorder.start());
        recorder.record(0.5, pose_x(0.0), MotionFlags::default(), None);
        recorder.record(0.25, pose_x(1.0), MotionFlags::default(), None);
        recorder.record(0.25, pose_x(2.0), MotionFlags::default(), None);

        let offsets: Vec<f32> = recorder.samples().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.25, 0.5]);
    }

    #[test]
    fn test_double_start_keeps_captured_data() {
        let mut recorder = FrameRecorder::default();
        recorder.start();
        recorder.record(0.0, pose_x(0.0), MotionFlags::default(), None);
        recorder.record(0.5, pose_x(1.0), MotionFlags::default(), None);

        assert!(!recorder.start());
        assert_eq!(recorder.samples().len(), 2);
        assert_eq!(recorder.elapsed(), 0.5);
    }

    #[test]
    fn test_stop_is_idempotent_and_halts_sampling() {
        let mut recorder = FrameRecorder::default();
        recorder.start();
        recorder.record(0.0, pose_x(0.0), MotionFlags::default(), None);
        assert!(recorder.stop());
        assert!(!recorder.stop());

        recorder.record(0.5, pose_x(1.0), MotionFlags::default(), None);
        assert_eq!(recorder.samples().len(), 1);
    }

    #[test]
    fn test_taken_recording_survives_restart() {
        let mut recorder = FrameRecorder::default();
        recorder.start();
        recorder.record(
            0.0,
            pose_x(3.0),
            MotionFlags::new(Locomotion::Running, true),
            Some(InteractionEvent {
                target: InteractableId::new("lever"),
            }),
        );
        recorder.stop();

        let taken = recorder.take_recording();
        // Buffer stays queryable after the hand-off
        assert_eq!(recorder.samples().len(), 1);

        recorder.start();
        recorder.record(0.0, pose_x(9.0), MotionFlags::default(), None);

        assert_eq!(taken.len(), 1);
        assert_eq!(taken.samples()[0].pose.position.x, 3.0);
        assert!(taken.samples()[0].motion.running);
        assert_eq!(taken.interaction_count(), 1);
    }
}
