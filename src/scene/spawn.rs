//! Scene spawning (shared between the demo and headless runs)

use bevy::prelude::*;

use crate::constants::*;
use crate::interaction::Interactable;
use crate::player::LiveActor;
use crate::recording::FrameRecorder;
use crate::world::{ActivationZone, CycleBoundarySync, Gate, Lever, PressurePlate, TriggerVolume};

use super::SceneDef;

fn at(position: [f32; 2], z: f32) -> Transform {
    Transform::from_xyz(position[0], position[1], z)
}

/// Spawn every object in the scene. Sprites are only added when `visuals`
/// is set. Returns the live actor.
pub fn spawn_scene(commands: &mut Commands, scene: &SceneDef, visuals: bool) -> Entity {
    for zone in &scene.zones {
        let half = Vec2::from_array(zone.half_extents);
        let mut entity = commands.spawn((
            Name::new("Activation Zone"),
            ActivationZone,
            TriggerVolume::new(half),
            at(zone.position, -1.0),
        ));
        if visuals {
            entity.insert(Sprite::from_color(ZONE_COLOR, half * 2.0));
        }
    }

    for plate in &scene.plates {
        let half = Vec2::from_array(plate.half_extents);
        let mut entity = commands.spawn((
            Name::new(format!("Plate {}", plate.id)),
            PressurePlate::new(plate.id.clone()),
            TriggerVolume::new(half),
            at(plate.position, -0.5),
        ));
        if plate.boundary_sync {
            entity.insert(CycleBoundarySync);
        }
        if visuals {
            entity.insert(Sprite::from_color(PLATE_IDLE_COLOR, half * 2.0));
        }
    }

    for lever in &scene.levers {
        let mut entity = commands.spawn((
            Name::new(format!("Lever {}", lever.id)),
            Interactable::new(lever.id.clone()),
            Lever::default(),
            at(lever.position, 0.0),
        ));
        if visuals {
            entity.insert(Sprite::from_color(LEVER_OFF_COLOR, LEVER_SIZE));
        }
    }

    for gate in &scene.gates {
        let mut entity = commands.spawn((
            Name::new(format!("Gate {}", gate.id)),
            Gate::new(gate.trigger.clone()),
            at(gate.position, 0.0),
        ));
        if visuals {
            entity.insert(Sprite::from_color(
                GATE_CLOSED_COLOR,
                Vec2::from_array(gate.size),
            ));
        }
    }

    let mut actor = commands.spawn((
        Name::new("Live Actor"),
        LiveActor,
        FrameRecorder::default(),
        at(scene.actor.start, 1.0),
    ));
    if visuals {
        actor.insert(Sprite::from_color(ACTOR_COLOR, ACTOR_SIZE));
    }
    actor.id()
}
