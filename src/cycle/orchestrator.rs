//! Loop orchestrator - the Idle/Recording state machine
//!
//! Starts the live actor's recorder, runs the cycle countdown, and at the end
//! of each cycle hands a copy of the recording to a freshly spawned echo
//! before putting the live actor back where the cycle began.

use bevy::ecs::query::QuerySingleError;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use uuid::Uuid;

use crate::constants::*;
use crate::events::{EventBus, LoopEvent};
use crate::interaction::{Interactable, InteractableRegistry};
use crate::playback::{Echo, EchoPlayback, EchoSpawnService, SpawnRequest};
use crate::player::{LiveActor, Velocity};
use crate::recording::{FrameRecorder, Pose, Recording};
use crate::settings::CurrentSettings;
use crate::world::{CycleBoundarySync, PressurePlate, force_release_boundary_plates};

use super::CycleCountdown;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    Recording,
}

/// Why a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Timeout,
    Manual,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::Timeout => write!(f, "timeout"),
            EndReason::Manual => write!(f, "manual"),
        }
    }
}

/// A refused request. Logged, never changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    AlreadyRecording,
    NotRecording,
    OutsideZone,
}

impl std::fmt::Display for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Guard::AlreadyRecording => write!(f, "already_recording"),
            Guard::NotRecording => write!(f, "not_recording"),
            Guard::OutsideZone => write!(f, "outside_zone"),
        }
    }
}

/// Missing collaborators or bad settings. A cycle cannot start until fixed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoLiveActor,
    MultipleLiveActors,
    NoRecorder,
    NoSpawnService,
    InvalidDuration(f32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoLiveActor => write!(f, "no live actor in the scene"),
            ConfigError::MultipleLiveActors => write!(f, "more than one live actor in the scene"),
            ConfigError::NoRecorder => write!(f, "live actor has no FrameRecorder"),
            ConfigError::NoSpawnService => write!(f, "no EchoSpawnService resource"),
            ConfigError::InvalidDuration(d) => write!(f, "cycle duration must be positive, got {}", d),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Entry points for starting and stopping a cycle
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleRequest {
    Start,
    StopEarly,
}

/// Orchestration state. One per app.
#[derive(Resource, Debug)]
pub struct LoopOrchestrator {
    phase: CyclePhase,
    /// Number of cycles started so far (the running cycle's number while recording)
    cycle: u32,
    cycle_id: String,
    start_pose: Pose,
    countdown: Option<CycleCountdown>,
    /// Duration used by the next cycle
    cycle_duration: f32,
    require_zone: bool,
    in_zone: bool,
    active_echoes: usize,
    config_error_reported: bool,
}

impl Default for LoopOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_DURATION, true)
    }
}

impl LoopOrchestrator {
    pub fn new(cycle_duration: f32, require_zone: bool) -> Self {
        Self {
            phase: CyclePhase::Idle,
            cycle: 0,
            cycle_id: String::new(),
            start_pose: Pose::default(),
            countdown: None,
            cycle_duration,
            require_zone,
            in_zone: false,
            active_echoes: 0,
            config_error_reported: false,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn is_recording(&self) -> bool {
        self.phase == CyclePhase::Recording
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    pub fn cycle_start_pose(&self) -> Pose {
        self.start_pose
    }

    /// Countdown of the running cycle (None while idle)
    pub fn countdown(&self) -> Option<&CycleCountdown> {
        self.countdown.as_ref()
    }

    pub fn cycle_duration(&self) -> f32 {
        self.cycle_duration
    }

    /// Takes effect when the next cycle starts
    pub fn set_cycle_duration(&mut self, duration: f32) {
        self.cycle_duration = duration;
    }

    pub fn require_zone(&self) -> bool {
        self.require_zone
    }

    pub fn set_require_zone(&mut self, require: bool) {
        self.require_zone = require;
    }

    pub fn in_zone(&self) -> bool {
        self.in_zone
    }

    /// Activation zone enter/exit transition
    pub fn set_in_zone(&mut self, in_zone: bool) {
        if self.in_zone != in_zone {
            debug!("Live actor {} activation zone", if in_zone { "entered" } else { "left" });
        }
        self.in_zone = in_zone;
    }

    /// Echoes spawned by this orchestrator that still exist
    pub fn active_echo_count(&self) -> usize {
        self.active_echoes
    }

    /// True while a configuration error has been logged and not yet cleared
    pub fn config_error_reported(&self) -> bool {
        self.config_error_reported
    }

    fn begin(&mut self, pose: Pose) -> u32 {
        self.phase = CyclePhase::Recording;
        self.cycle += 1;
        self.cycle_id = Uuid::new_v4().to_string();
        self.start_pose = pose;
        self.countdown = Some(CycleCountdown::new(self.cycle_duration));
        self.cycle
    }

    /// Advance the running countdown. True when it just ran out.
    fn tick_countdown(&mut self, dt: f32) -> bool {
        self.countdown.as_mut().is_some_and(|c| c.tick(dt))
    }

    /// Leave Recording, discarding the countdown
    fn finish(&mut self) -> Option<CycleCountdown> {
        self.phase = CyclePhase::Idle;
        self.countdown.take()
    }

    fn report_config_error(&mut self, err: &ConfigError) {
        if !self.config_error_reported {
            error!("Cannot start cycle: {}", err);
            self.config_error_reported = true;
        }
    }
}

/// Everything one orchestrator step touches
#[derive(SystemParam)]
pub struct CycleContext<'w, 's> {
    time: Res<'w, Time>,
    orchestrator: ResMut<'w, LoopOrchestrator>,
    bus: ResMut<'w, EventBus>,
    spawner: Option<Res<'w, EchoSpawnService>>,
    commands: Commands<'w, 's>,
    actors: Query<
        'w,
        's,
        (
            &'static mut Transform,
            &'static mut Velocity,
            Option<&'static mut FrameRecorder>,
        ),
        With<LiveActor>,
    >,
    boundary_plates: Query<'w, 's, &'static mut PressurePlate, With<CycleBoundarySync>>,
    interactables: Query<'w, 's, (Entity, &'static Interactable)>,
}

impl CycleContext<'_, '_> {
    fn guard_warning(&mut self, guard: Guard) {
        warn!("Cycle request refused: {}", guard);
        self.bus.emit(LoopEvent::GuardWarning { guard });
    }

    /// Check the collaborators a cycle needs. Returns the start pose.
    fn validate(&self) -> Result<Pose, ConfigError> {
        let duration = self.orchestrator.cycle_duration();
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ConfigError::InvalidDuration(duration));
        }

        let (transform, _, recorder) = self.actors.single().map_err(|e| match e {
            QuerySingleError::NoEntities(_) => ConfigError::NoLiveActor,
            QuerySingleError::MultipleEntities(_) => ConfigError::MultipleLiveActors,
        })?;
        if recorder.is_none() {
            return Err(ConfigError::NoRecorder);
        }
        if self.spawner.is_none() {
            return Err(ConfigError::NoSpawnService);
        }
        Ok(Pose::from_transform(transform))
    }

    fn start_cycle(&mut self) {
        if self.orchestrator.is_recording() {
            self.guard_warning(Guard::AlreadyRecording);
            return;
        }

        let pose = match self.validate() {
            Ok(pose) => pose,
            Err(err) => {
                self.orchestrator.report_config_error(&err);
                return;
            }
        };
        self.orchestrator.config_error_reported = false;

        if self.orchestrator.require_zone() && !self.orchestrator.in_zone() {
            self.guard_warning(Guard::OutsideZone);
            return;
        }

        if let Ok((_, _, Some(mut recorder))) = self.actors.single_mut() {
            recorder.start();
        }

        let cycle = self.orchestrator.begin(pose);
        info!(
            "Cycle {} started ({:.1}s) at ({:.0}, {:.0})",
            cycle,
            self.orchestrator.cycle_duration(),
            pose.position.x,
            pose.position.y
        );
        self.bus.emit(LoopEvent::CycleStarted {
            cycle,
            cycle_id: self.orchestrator.cycle_id().to_string(),
            start: pose.position,
        });
    }

    fn stop_cycle_early(&mut self) {
        if !self.orchestrator.is_recording() {
            self.guard_warning(Guard::NotRecording);
            return;
        }
        self.end_cycle(EndReason::Manual);
    }

    /// Close the running cycle: hand the recording to a new echo and reset
    /// the live actor. The actor is reset even if no echo could be spawned.
    fn end_cycle(&mut self, reason: EndReason) {
        let Some(countdown) = self.orchestrator.finish() else {
            return;
        };
        let cycle = self.orchestrator.cycle();
        let pose = self.orchestrator.cycle_start_pose();

        let recording = match self.actors.single_mut() {
            Ok((_, _, Some(mut recorder))) => {
                recorder.stop();
                recorder.take_recording()
            }
            _ => {
                warn!("Cycle {} ended without a recorder, echo will hold still", cycle);
                Recording::default()
            }
        };
        info!(
            "Cycle {} ended ({}) with {} samples over {:.2}s",
            cycle,
            reason,
            recording.len(),
            recording.duration()
        );
        self.bus.emit(LoopEvent::CycleEnded {
            cycle,
            reason,
            samples: recording.len(),
        });

        force_release_boundary_plates(self.boundary_plates.iter_mut(), &mut self.bus);

        let registry = InteractableRegistry::snapshot(self.interactables.iter());
        let request = SpawnRequest {
            cycle,
            pose,
            playback: EchoPlayback::new(recording, countdown.duration(), registry),
            live_echoes: self.orchestrator.active_echo_count(),
        };
        let spawned = match self.spawner.as_deref() {
            Some(spawner) => spawner
                .spawn_echo(&mut self.commands, request)
                .map_err(|e| e.to_string()),
            None => Err(ConfigError::NoSpawnService.to_string()),
        };
        match spawned {
            Ok(echo) => {
                self.orchestrator.active_echoes += 1;
                info!("Echo {} spawned for cycle {}", echo, cycle);
                self.bus.emit(LoopEvent::EchoSpawned { cycle, echo });
            }
            Err(reason) => {
                warn!("Echo for cycle {} not spawned: {}", cycle, reason);
                self.bus.emit(LoopEvent::EchoSpawnFailed { cycle, reason });
            }
        }

        if let Ok((mut transform, mut velocity, _)) = self.actors.single_mut() {
            pose.apply_to(&mut transform);
            velocity.0 = Vec2::ZERO;
        }
    }
}

/// One orchestrator step per tick: run the countdown, then handle requests.
pub fn run_loop_orchestrator(mut ctx: CycleContext, mut requests: MessageReader<CycleRequest>) {
    let dt = ctx.time.delta_secs();
    if ctx.orchestrator.tick_countdown(dt) {
        ctx.end_cycle(EndReason::Timeout);
    }

    for request in requests.read() {
        match request {
            CycleRequest::Start => ctx.start_cycle(),
            CycleRequest::StopEarly => ctx.stop_cycle_early(),
        }
    }
}

/// Keep the live echo count in step with despawns
pub fn forget_destroyed_echoes(
    mut removed: RemovedComponents<Echo>,
    mut orchestrator: ResMut<LoopOrchestrator>,
    mut bus: ResMut<EventBus>,
) {
    for echo in removed.read() {
        orchestrator.active_echoes = orchestrator.active_echoes.saturating_sub(1);
        bus.emit(LoopEvent::EchoDespawned { echo });
    }
}

/// Copy settings into the orchestrator. Duration changes apply to the next cycle.
pub fn apply_loop_settings(settings: Res<CurrentSettings>, mut orchestrator: ResMut<LoopOrchestrator>) {
    if !settings.is_changed() {
        return;
    }
    let s = &settings.settings;
    if orchestrator.cycle_duration() != s.cycle_duration {
        info!("Cycle duration set to {:.1}s (next cycle)", s.cycle_duration);
    }
    orchestrator.set_cycle_duration(s.cycle_duration);
    orchestrator.set_require_zone(s.require_activation_zone);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_only_runs_while_recording() {
        let mut orchestrator = LoopOrchestrator::new(1.0, false);
        assert!(!orchestrator.tick_countdown(5.0));

        let cycle = orchestrator.begin(Pose::default());
        assert_eq!(cycle, 1);
        assert!(orchestrator.is_recording());
        assert!(!orchestrator.tick_countdown(0.5));
        assert!(orchestrator.tick_countdown(0.5));

        let countdown = orchestrator.finish();
        assert_eq!(countdown.map(|c| c.duration()), Some(1.0));
        assert_eq!(orchestrator.phase(), CyclePhase::Idle);
        assert!(orchestrator.countdown().is_none());
    }

    #[test]
    fn test_duration_change_waits_for_next_cycle() {
        let mut orchestrator = LoopOrchestrator::new(4.0, false);
        orchestrator.begin(Pose::default());
        orchestrator.set_cycle_duration(2.0);
        assert_eq!(orchestrator.countdown().map(|c| c.duration()), Some(4.0));

        orchestrator.finish();
        orchestrator.begin(Pose::default());
        assert_eq!(orchestrator.countdown().map(|c| c.duration()), Some(2.0));
        assert_eq!(orchestrator.cycle(), 2);
    }

    #[test]
    fn test_cycle_ids_are_unique() {
        let mut orchestrator = LoopOrchestrator::default();
        orchestrator.begin(Pose::default());
        let first = orchestrator.cycle_id().to_string();
        orchestrator.finish();
        orchestrator.begin(Pose::default());
        assert_ne!(first, orchestrator.cycle_id());
        assert_eq!(first.len(), 36);
    }
}
