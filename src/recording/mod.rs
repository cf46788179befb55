//! Frame recording for the live actor.
//!
//! A [`FrameRecorder`] on the live actor accumulates [`Sample`]s while a cycle
//! is running. At cycle end the orchestrator takes a deep copy as a
//! [`Recording`] and hands it to a new echo.

mod recorder;
mod sample;

pub use recorder::{FrameRecorder, record_frame};
pub use sample::{InteractionEvent, Locomotion, MotionFlags, Pose, Recording, Sample};
