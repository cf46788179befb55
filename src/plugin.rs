//! EchoLoopPlugin - registers the loop's messages, resources and systems

use bevy::prelude::*;

use crate::cycle::{
    CycleRequest, LoopOrchestrator, apply_loop_settings, forget_destroyed_echoes,
    run_loop_orchestrator,
};
use crate::events::{EventBus, EventLogger, flush_event_log, update_event_bus_time};
use crate::input::{PlayerInput, request_cycle_from_input};
use crate::interaction::InteractionRequest;
use crate::playback::{EchoBlueprint, EchoSpawnService, drive_echoes};
use crate::player::apply_actor_input;
use crate::recording::record_frame;
use crate::settings::CurrentSettings;
use crate::world::{
    apply_interaction_requests, paint_world_objects, sync_gates, update_activation_zone,
    update_trigger_volumes,
};

/// Per-tick order of the loop. Chained: every set sees the previous set's writes.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EchoLoopSet {
    /// Live actor input and motion
    Source,
    /// Trigger volumes and the activation zone
    Triggers,
    /// Cycle start/stop/timeout
    Orchestrate,
    /// Live actor sampling
    Record,
    /// Echo timelines
    Playback,
    /// Interaction handling and world state
    Effects,
}

/// Core loop systems. Resources already present (settings, spawn service,
/// orchestrator, event bus) are kept, so apps and tests can override them
/// before adding the plugin. Insert the `EventLogger` first to get a live bus.
pub struct EchoLoopPlugin;

impl Plugin for EchoLoopPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<CycleRequest>()
            .add_message::<InteractionRequest>()
            .init_resource::<PlayerInput>()
            .init_resource::<CurrentSettings>();

        let settings = app.world().resource::<CurrentSettings>().settings.clone();
        if !app.world().contains_resource::<LoopOrchestrator>() {
            app.insert_resource(LoopOrchestrator::new(
                settings.cycle_duration,
                settings.require_activation_zone,
            ));
        }
        if !app.world().contains_resource::<EchoSpawnService>() {
            app.insert_resource(EchoSpawnService::new(EchoBlueprint {
                max_echoes: settings.max_echoes,
            }));
        }
        // Only the event logger drains the bus, so without one it records nothing
        if !app.world().contains_resource::<EventBus>() {
            let bus = if app.world().contains_resource::<EventLogger>() {
                EventBus::new()
            } else {
                EventBus::disabled()
            };
            app.insert_resource(bus);
        }

        app.configure_sets(
            Update,
            (
                EchoLoopSet::Source,
                EchoLoopSet::Triggers,
                EchoLoopSet::Orchestrate,
                EchoLoopSet::Record,
                EchoLoopSet::Playback,
                EchoLoopSet::Effects,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                (
                    update_event_bus_time,
                    apply_loop_settings,
                    request_cycle_from_input,
                    apply_actor_input,
                )
                    .chain()
                    .in_set(EchoLoopSet::Source),
                (update_trigger_volumes, update_activation_zone)
                    .chain()
                    .in_set(EchoLoopSet::Triggers),
                (forget_destroyed_echoes, run_loop_orchestrator)
                    .chain()
                    .in_set(EchoLoopSet::Orchestrate),
                record_frame.in_set(EchoLoopSet::Record),
                drive_echoes.in_set(EchoLoopSet::Playback),
                (
                    apply_interaction_requests,
                    sync_gates,
                    paint_world_objects,
                    flush_event_log.run_if(resource_exists::<EventLogger>),
                )
                    .chain()
                    .in_set(EchoLoopSet::Effects),
            ),
        );
    }
}
