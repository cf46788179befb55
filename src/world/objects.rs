//! Levers, gates and how they answer interaction requests

use bevy::prelude::*;
use std::collections::HashMap;

use crate::constants::*;
use crate::events::{EventBus, LoopEvent};
use crate::interaction::{Interactable, InteractionRequest};

use super::PressurePlate;

/// Two-state switch flipped by interaction
#[derive(Component, Debug, Clone, Default)]
pub struct Lever {
    pub on: bool,
}

impl Lever {
    pub fn toggle(&mut self) {
        self.on = !self.on;
    }
}

/// Opens while its trigger (a plate id or lever id) is active
#[derive(Component, Debug, Clone)]
pub struct Gate {
    pub trigger: String,
    pub open: bool,
}

impl Gate {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            open: false,
        }
    }
}

/// Handle every interaction written this tick, live or echo.
/// Requests whose target no longer exists are dropped.
pub fn apply_interaction_requests(
    mut requests: MessageReader<InteractionRequest>,
    mut targets: Query<(&Interactable, Option<&mut Lever>)>,
    mut bus: ResMut<EventBus>,
) {
    for request in requests.read() {
        let Ok((interactable, lever)) = targets.get_mut(request.target) else {
            continue;
        };

        if let Some(mut lever) = lever {
            lever.toggle();
        }

        bus.emit(LoopEvent::Interaction {
            performer: request.performer,
            target: interactable.id.clone(),
        });
    }
}

/// Open or close gates to match their trigger
pub fn sync_gates(
    plates: Query<&PressurePlate>,
    levers: Query<(&Interactable, &Lever)>,
    mut gates: Query<&mut Gate>,
) {
    let mut active: HashMap<&str, bool> = HashMap::new();
    for plate in &plates {
        active.insert(plate.id.as_str(), plate.is_pressed());
    }
    for (interactable, lever) in &levers {
        active.insert(interactable.id.as_str(), lever.on);
    }

    for mut gate in &mut gates {
        let open = active.get(gate.trigger.as_str()).copied().unwrap_or(false);
        if gate.open != open {
            gate.open = open;
        }
    }
}

/// Recolor world objects whose state changed (no-op without sprites)
pub fn paint_world_objects(
    mut sprites: Query<
        (
            &mut Sprite,
            Option<&PressurePlate>,
            Option<&Lever>,
            Option<&Gate>,
        ),
        Or<(Changed<PressurePlate>, Changed<Lever>, Changed<Gate>)>,
    >,
) {
    for (mut sprite, plate, lever, gate) in &mut sprites {
        if let Some(plate) = plate {
            sprite.color = if plate.is_pressed() {
                PLATE_PRESSED_COLOR
            } else {
                PLATE_IDLE_COLOR
            };
        } else if let Some(lever) = lever {
            sprite.color = if lever.on { LEVER_ON_COLOR } else { LEVER_OFF_COLOR };
        } else if let Some(gate) = gate {
            sprite.color = if gate.open {
                GATE_OPEN_COLOR
            } else {
                GATE_CLOSED_COLOR
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_gate_follows_plate_and_lever() {
        let mut world = World::new();
        let plate = world.spawn(PressurePlate::new("plate_a")).id();
        let lever = world.spawn((Interactable::new("lever_a"), Lever::default())).id();
        let plate_gate = world.spawn(Gate::new("plate_a")).id();
        let lever_gate = world.spawn(Gate::new("lever_a")).id();
        let orphan_gate = world.spawn(Gate::new("missing")).id();

        world.get_mut::<PressurePlate>(plate).unwrap().press();
        world.get_mut::<Lever>(lever).unwrap().toggle();
        world.run_system_once(sync_gates).unwrap();

        assert!(world.get::<Gate>(plate_gate).unwrap().open);
        assert!(world.get::<Gate>(lever_gate).unwrap().open);
        assert!(!world.get::<Gate>(orphan_gate).unwrap().open);

        world.get_mut::<PressurePlate>(plate).unwrap().release();
        world.run_system_once(sync_gates).unwrap();
        assert!(!world.get::<Gate>(plate_gate).unwrap().open);
    }
}
