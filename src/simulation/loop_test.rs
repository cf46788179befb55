//! End-to-end loop tests on a headless app
//!
//! Frames are 0.25s and cycles 2s, so every clock value below is exact.

use bevy::prelude::*;

use crate::cycle::{CycleRequest, EndReason, Guard, LoopOrchestrator};
use crate::events::{EventBus, LoopEvent};
use crate::input::PlayerInput;
use crate::interaction::{Interactable, Performer};
use crate::playback::{Echo, EchoPlayback, MotionAnimator};
use crate::player::{LiveActor, Velocity};
use crate::recording::{FrameRecorder, Sample};
use crate::scene::SceneDef;
use crate::settings::LoopSettings;
use crate::world::{Lever, PressurePlate};

use super::app_builder::{HeadlessAppBuilder, step};

const DT: f32 = 0.25;

const SCENE: &str = r#"
[actor]
start = [0.0, 0.0]

[[zones]]
position = [0.0, 0.0]
half_extents = [40.0, 40.0]

[[plates]]
id = "plate_a"
position = [0.0, 0.0]
half_extents = [10.0, 10.0]
boundary_sync = true

[[levers]]
id = "lever_a"
position = [0.0, 60.0]

[[gates]]
id = "gate_a"
position = [300.0, 0.0]
size = [10.0, 10.0]
trigger = "lever_a"
"#;

fn settings(require_zone: bool) -> LoopSettings {
    LoopSettings {
        cycle_duration: 2.0,
        require_activation_zone: require_zone,
        ..Default::default()
    }
}

fn build(builder: HeadlessAppBuilder) -> App {
    let mut app = builder
        .with_scene(SceneDef::parse(SCENE).unwrap())
        .build();
    // Startup frame
    step(&mut app, DT);
    app
}

fn loop_app(require_zone: bool) -> App {
    build(HeadlessAppBuilder::new().with_settings(settings(require_zone)))
}

fn request(app: &mut App, request: CycleRequest) {
    app.world_mut().write_message(request);
}

fn orchestrator(app: &App) -> &LoopOrchestrator {
    app.world().resource::<LoopOrchestrator>()
}

fn input(app: &mut App) -> Mut<'_, PlayerInput> {
    app.world_mut().resource_mut::<PlayerInput>()
}

fn live_actor(app: &mut App) -> Entity {
    let mut query = app.world_mut().query_filtered::<Entity, With<LiveActor>>();
    query.single(app.world()).unwrap()
}

fn echo_of_cycle(app: &mut App, cycle: u32) -> Option<Entity> {
    let mut query = app.world_mut().query::<(Entity, &Echo)>();
    query
        .iter(app.world())
        .find(|(_, echo)| echo.cycle == cycle)
        .map(|(entity, _)| entity)
}

fn echo_count(app: &mut App) -> usize {
    let mut query = app.world_mut().query::<&Echo>();
    query.iter(app.world()).count()
}

fn lever(app: &mut App) -> Entity {
    let mut query = app.world_mut().query_filtered::<Entity, With<Lever>>();
    query.single(app.world()).unwrap()
}

fn drain(app: &mut App) -> Vec<LoopEvent> {
    app.world_mut()
        .resource_mut::<EventBus>()
        .drain()
        .into_iter()
        .map(|e| e.event)
        .collect()
}

/// Step until the running cycle ends. Returns frames stepped.
fn finish_cycle(app: &mut App) -> u32 {
    let mut frames = 0;
    while orchestrator(app).is_recording() {
        step(app, DT);
        frames += 1;
        assert!(frames < 100, "cycle never ended");
    }
    frames
}

fn recorded_samples(app: &mut App) -> Vec<Sample> {
    let actor = live_actor(app);
    app.world()
        .get::<FrameRecorder>(actor)
        .unwrap()
        .samples()
        .to_vec()
}

#[test]
fn test_double_start_records_once() {
    let mut app = loop_app(false);
    drain(&mut app);

    request(&mut app, CycleRequest::Start);
    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    assert!(orchestrator(&app).is_recording());
    assert_eq!(orchestrator(&app).cycle(), 1);

    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    assert_eq!(orchestrator(&app).cycle(), 1);

    finish_cycle(&mut app);
    let events = drain(&mut app);

    let starts = events
        .iter()
        .filter(|e| matches!(e, LoopEvent::CycleStarted { .. }))
        .count();
    let guards = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                LoopEvent::GuardWarning {
                    guard: Guard::AlreadyRecording
                }
            )
        })
        .count();
    assert_eq!(starts, 1);
    assert_eq!(guards, 2);
    assert!(events.contains(&LoopEvent::CycleEnded {
        cycle: 1,
        reason: EndReason::Timeout,
        samples: 8,
    }));
    assert_eq!(orchestrator(&app).active_echo_count(), 1);
    assert_eq!(echo_count(&mut app), 1);
}

#[test]
fn test_stop_while_idle_changes_nothing() {
    let mut app = loop_app(false);
    let actor = live_actor(&mut app);
    let before = *app.world().get::<Transform>(actor).unwrap();
    drain(&mut app);

    request(&mut app, CycleRequest::StopEarly);
    step(&mut app, DT);

    assert!(!orchestrator(&app).is_recording());
    assert_eq!(orchestrator(&app).cycle(), 0);
    assert_eq!(echo_count(&mut app), 0);
    assert_eq!(*app.world().get::<Transform>(actor).unwrap(), before);
    assert_eq!(
        drain(&mut app),
        vec![LoopEvent::GuardWarning {
            guard: Guard::NotRecording
        }]
    );
}

#[test]
fn test_start_requires_activation_zone() {
    let mut app = loop_app(true);
    let actor = live_actor(&mut app);
    assert!(orchestrator(&app).in_zone());

    app.world_mut().get_mut::<Transform>(actor).unwrap().translation.x = 200.0;
    step(&mut app, DT);
    assert!(!orchestrator(&app).in_zone());

    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    assert!(!orchestrator(&app).is_recording());
    assert!(drain(&mut app).contains(&LoopEvent::GuardWarning {
        guard: Guard::OutsideZone
    }));

    app.world_mut().get_mut::<Transform>(actor).unwrap().translation.x = 0.0;
    step(&mut app, DT);
    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    assert!(orchestrator(&app).is_recording());
}

#[test]
fn test_missing_collaborators_block_start() {
    let mut app = build(
        HeadlessAppBuilder::new()
            .with_settings(settings(false))
            .without_spawn_service(),
    );

    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    assert!(!orchestrator(&app).is_recording());
    assert!(orchestrator(&app).config_error_reported());

    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    assert!(!orchestrator(&app).is_recording());
    assert_eq!(orchestrator(&app).cycle(), 0);
}

#[test]
fn test_missing_recorder_blocks_start() {
    let mut app = loop_app(false);
    let actor = live_actor(&mut app);
    app.world_mut().entity_mut(actor).remove::<FrameRecorder>();

    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    assert!(!orchestrator(&app).is_recording());
    assert!(orchestrator(&app).config_error_reported());
}

#[test]
fn test_spawn_failure_still_resets_actor() {
    let mut app = build(HeadlessAppBuilder::new().with_settings(LoopSettings {
        max_echoes: Some(0),
        ..settings(false)
    }));
    let actor = live_actor(&mut app);

    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    input(&mut app).move_dir = Vec2::X;
    finish_cycle(&mut app);

    let transform = app.world().get::<Transform>(actor).unwrap();
    assert_eq!(transform.translation.truncate(), Vec2::ZERO);
    assert_eq!(app.world().get::<Velocity>(actor).unwrap().0, Vec2::ZERO);
    assert_eq!(orchestrator(&app).active_echo_count(), 0);
    assert_eq!(echo_count(&mut app), 0);
    assert!(
        drain(&mut app)
            .iter()
            .any(|e| matches!(e, LoopEvent::EchoSpawnFailed { cycle: 1, .. }))
    );
}

#[test]
fn test_stop_early_spawns_echo_with_full_cycle_length() {
    let mut app = loop_app(false);
    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    step(&mut app, DT);
    step(&mut app, DT);

    request(&mut app, CycleRequest::StopEarly);
    step(&mut app, DT);
    assert!(!orchestrator(&app).is_recording());
    assert!(orchestrator(&app).countdown().is_none());

    let echo = echo_of_cycle(&mut app, 1).unwrap();
    let playback = app.world().get::<EchoPlayback>(echo).unwrap();
    assert_eq!(playback.timeline.cycle_duration(), 2.0);
    assert_eq!(playback.timeline.samples().len(), 3);
    assert!(drain(&mut app).contains(&LoopEvent::CycleEnded {
        cycle: 1,
        reason: EndReason::Manual,
        samples: 3,
    }));
}

#[test]
fn test_echo_replays_recorded_poses_and_flags() {
    let mut app = loop_app(false);

    input(&mut app).move_dir = Vec2::X;
    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);

    let mut frame = 0;
    while orchestrator(&app).is_recording() {
        frame += 1;
        if frame == 2 {
            input(&mut app).jump_pressed = true;
        }
        if frame == 4 {
            input(&mut app).run_held = true;
        }
        step(&mut app, DT);
    }

    let samples = recorded_samples(&mut app);
    assert_eq!(samples.len(), 8);
    assert!(samples[2].motion.jump_triggered);
    assert!(samples[5].motion.running);
    assert!(!samples[5].motion.walking);

    *input(&mut app) = PlayerInput::default();
    let echo = echo_of_cycle(&mut app, 1).unwrap();

    for (k, sample) in samples.iter().enumerate() {
        if k > 0 {
            step(&mut app, DT);
        }
        let transform = app.world().get::<Transform>(echo).unwrap();
        assert_eq!(transform.translation, sample.pose.position, "pose at sample {}", k);
        assert_eq!(transform.rotation, sample.pose.orientation);

        let animator = app.world().get::<MotionAnimator>(echo).unwrap();
        assert_eq!(animator.walking, sample.motion.walking, "walking at sample {}", k);
        assert_eq!(animator.running, sample.motion.running, "running at sample {}", k);
        assert_eq!(animator.jump_this_tick, sample.motion.jump_triggered);
    }

    // One repetition later the echo is back at the first sample
    for _ in 0..(8 - samples.len() + 1) {
        step(&mut app, DT);
    }
    let playback = app.world().get::<EchoPlayback>(echo).unwrap();
    assert_eq!(playback.timeline.repetitions(), 1);
    let transform = app.world().get::<Transform>(echo).unwrap();
    assert_eq!(transform.translation, samples[0].pose.position);
}

/// Record one lever pull half a second into the cycle
fn record_lever_pull(app: &mut App) {
    request(app, CycleRequest::Start);
    step(app, DT);
    step(app, DT);
    input(app).interact_pressed = true;
    step(app, DT);
    finish_cycle(app);
}

#[test]
fn test_echo_reinvokes_recorded_target() {
    let mut app = loop_app(false);
    let lever_entity = lever(&mut app);

    record_lever_pull(&mut app);
    let samples = recorded_samples(&mut app);
    assert_eq!(samples[2].interaction.as_ref().map(|i| i.target.as_str()), Some("lever_a"));
    assert!(app.world().get::<Lever>(lever_entity).unwrap().on);
    drain(&mut app);

    step(&mut app, DT);
    step(&mut app, DT);

    assert!(!app.world().get::<Lever>(lever_entity).unwrap().on);
    assert!(drain(&mut app).contains(&LoopEvent::Interaction {
        performer: Performer::Echo { cycle: 1 },
        target: "lever_a".into(),
    }));
}

fn echo_interaction_count(events: &[LoopEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                LoopEvent::Interaction {
                    performer: Performer::Echo { .. },
                    ..
                }
            )
        })
        .count()
}

#[test]
fn test_removed_target_is_skipped() {
    let mut app = loop_app(false);
    let original = lever(&mut app);

    record_lever_pull(&mut app);
    drain(&mut app);

    app.world_mut().despawn(original);
    for _ in 0..12 {
        step(&mut app, DT);
    }

    assert_eq!(echo_interaction_count(&drain(&mut app)), 0);

    let echo = echo_of_cycle(&mut app, 1).unwrap();
    let playback = app.world().get::<EchoPlayback>(echo).unwrap();
    assert!(playback.timeline.repetitions() >= 1);
}

#[test]
fn test_respawned_target_is_invoked() {
    let mut app = loop_app(false);
    let original = lever(&mut app);

    record_lever_pull(&mut app);
    drain(&mut app);

    app.world_mut().despawn(original);
    let replacement = app
        .world_mut()
        .spawn((
            Interactable::new("lever_a"),
            Lever::default(),
            Transform::from_xyz(0.0, 60.0, 0.0),
        ))
        .id();

    // Recorded pull lands at 0.5s into each repetition
    step(&mut app, DT);
    step(&mut app, DT);
    assert!(app.world().get::<Lever>(replacement).unwrap().on);
    assert!(drain(&mut app).contains(&LoopEvent::Interaction {
        performer: Performer::Echo { cycle: 1 },
        target: "lever_a".into(),
    }));

    // Next repetition pulls it again
    for _ in 0..8 {
        step(&mut app, DT);
    }
    assert!(!app.world().get::<Lever>(replacement).unwrap().on);
    assert_eq!(echo_interaction_count(&drain(&mut app)), 1);
}

#[test]
fn test_boundary_plates_release_at_cycle_end() {
    let mut app = loop_app(false);
    let mut plates = app.world_mut().query::<&PressurePlate>();
    assert!(plates.single(app.world()).unwrap().is_pressed());
    drain(&mut app);

    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    finish_cycle(&mut app);

    assert!(!plates.single(app.world()).unwrap().is_pressed());
    assert!(drain(&mut app).contains(&LoopEvent::PlateReleased {
        plate: "plate_a".to_string(),
        forced: true,
    }));

    // The new echo stands on the plate and presses it again
    step(&mut app, DT);
    assert!(plates.single(app.world()).unwrap().is_pressed());
}

/// Two cycles: the first walks right, the second walks up
fn two_echo_app() -> App {
    let mut app = loop_app(false);
    for dir in [Vec2::X, Vec2::Y] {
        input(&mut app).move_dir = dir;
        request(&mut app, CycleRequest::Start);
        step(&mut app, DT);
        finish_cycle(&mut app);
    }
    *input(&mut app) = PlayerInput::default();
    app
}

#[test]
fn test_despawning_one_echo_leaves_the_other_alone() {
    let mut control = two_echo_app();
    let mut app = two_echo_app();
    assert_eq!(orchestrator(&app).active_echo_count(), 2);

    let first = echo_of_cycle(&mut app, 1).unwrap();
    app.world_mut().despawn(first);
    drain(&mut app);

    for _ in 0..10 {
        step(&mut app, DT);
        step(&mut control, DT);

        let survivor = echo_of_cycle(&mut app, 2).unwrap();
        let twin = echo_of_cycle(&mut control, 2).unwrap();

        let a = app.world().get::<Transform>(survivor).unwrap();
        let b = control.world().get::<Transform>(twin).unwrap();
        assert_eq!(a.translation, b.translation);

        let a = &app.world().get::<EchoPlayback>(survivor).unwrap().timeline;
        let b = &control.world().get::<EchoPlayback>(twin).unwrap().timeline;
        assert_eq!(a.cursor(), b.cursor());
        assert_eq!(a.cycle_clock(), b.cycle_clock());
        assert_eq!(a.repetitions(), b.repetitions());
    }

    assert_eq!(orchestrator(&app).active_echo_count(), 1);
    assert_eq!(orchestrator(&control).active_echo_count(), 2);
    assert!(drain(&mut app).contains(&LoopEvent::EchoDespawned { echo: first }));
}

#[test]
fn test_bus_stays_empty_without_logger() {
    let mut app = build(
        HeadlessAppBuilder::new()
            .with_settings(settings(false))
            .without_event_capture(),
    );
    assert!(!app.world().resource::<EventBus>().is_enabled());

    // Echo walks off the plate and back every repetition
    input(&mut app).move_dir = Vec2::X;
    request(&mut app, CycleRequest::Start);
    step(&mut app, DT);
    finish_cycle(&mut app);
    *input(&mut app) = PlayerInput::default();
    assert_eq!(echo_count(&mut app), 1);

    for _ in 0..400 {
        step(&mut app, DT);
    }
    assert_eq!(app.world().resource::<EventBus>().pending_count(), 0);
}
