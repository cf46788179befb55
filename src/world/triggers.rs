//! Trigger volumes, pressure plates and the activation zone

use bevy::prelude::*;

use crate::cycle::LoopOrchestrator;
use crate::events::{EventBus, LoopEvent};
use crate::playback::Echo;
use crate::player::LiveActor;

/// Axis-aligned box that tracks which actors (live or echo) stand inside it
#[derive(Component, Debug, Clone, Default)]
pub struct TriggerVolume {
    pub half_extents: Vec2,
    /// Actors inside as of the last trigger update, sorted
    occupants: Vec<Entity>,
}

impl TriggerVolume {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            half_extents,
            occupants: Vec::new(),
        }
    }

    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let d = (point - center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y
    }

    pub fn occupants(&self) -> &[Entity] {
        &self.occupants
    }

    pub fn is_occupied_by(&self, entity: Entity) -> bool {
        self.occupants.binary_search(&entity).is_ok()
    }

    /// Replace the occupant set. Returns (entered, exited) counts.
    pub fn set_occupants(&mut self, mut current: Vec<Entity>) -> (usize, usize) {
        current.sort();
        let entered = current
            .iter()
            .filter(|e| self.occupants.binary_search(e).is_err())
            .count();
        let exited = self
            .occupants
            .iter()
            .filter(|e| current.binary_search(e).is_err())
            .count();
        self.occupants = current;
        (entered, exited)
    }
}

/// A plate pressed by anything standing on its trigger volume.
/// Press and release are idempotent.
#[derive(Component, Debug, Clone)]
#[require(TriggerVolume)]
pub struct PressurePlate {
    pub id: String,
    pressed: bool,
}

impl PressurePlate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pressed: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Returns true if the plate changed state
    pub fn press(&mut self) -> bool {
        let changed = !self.pressed;
        self.pressed = true;
        changed
    }

    /// Returns true if the plate changed state
    pub fn release(&mut self) -> bool {
        let changed = self.pressed;
        self.pressed = false;
        changed
    }
}

/// Plates carrying this marker are released whenever a cycle ends
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CycleBoundarySync;

/// Region the live actor must occupy to start a cycle (when gating is on)
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(TriggerVolume)]
pub struct ActivationZone;

/// Recompute occupants of every trigger volume and press/release plates.
///
/// Enter presses. The plate releases once the last occupant has left.
pub fn update_trigger_volumes(
    actors: Query<(Entity, &Transform), Or<(With<LiveActor>, With<Echo>)>>,
    mut volumes: Query<(&Transform, &mut TriggerVolume, Option<&mut PressurePlate>)>,
    mut bus: ResMut<EventBus>,
) {
    for (volume_transform, mut volume, plate) in &mut volumes {
        let center = volume_transform.translation.truncate();
        let inside: Vec<Entity> = actors
            .iter()
            .filter(|(_, t)| volume.contains(center, t.translation.truncate()))
            .map(|(entity, _)| entity)
            .collect();

        let (entered, exited) = volume.set_occupants(inside);
        let Some(mut plate) = plate else {
            continue;
        };

        if entered > 0 && plate.press() {
            bus.emit(LoopEvent::PlatePressed {
                plate: plate.id.clone(),
            });
        }
        if exited > 0 && volume.occupants().is_empty() && plate.release() {
            bus.emit(LoopEvent::PlateReleased {
                plate: plate.id.clone(),
                forced: false,
            });
        }
    }
}

/// Release every boundary-synchronized plate. Occupants are kept, so a plate
/// with someone still on it stays up until they step off and back on.
pub fn force_release_boundary_plates<'a>(
    plates: impl IntoIterator<Item = Mut<'a, PressurePlate>>,
    bus: &mut EventBus,
) -> usize {
    let mut released = 0;
    for mut plate in plates {
        if plate.release() {
            released += 1;
            bus.emit(LoopEvent::PlateReleased {
                plate: plate.id.clone(),
                forced: true,
            });
        }
    }
    released
}

/// Push zone enter/exit transitions of the live actor into the orchestrator
pub fn update_activation_zone(
    zones: Query<&TriggerVolume, With<ActivationZone>>,
    actors: Query<Entity, With<LiveActor>>,
    mut orchestrator: ResMut<LoopOrchestrator>,
) {
    let in_zone = actors
        .iter()
        .any(|actor| zones.iter().any(|zone| zone.is_occupied_by(actor)));

    if in_zone != orchestrator.in_zone() {
        orchestrator.set_in_zone(in_zone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_plate_press_is_idempotent() {
        let mut plate = PressurePlate::new("plate_a");
        assert!(plate.press());
        assert!(!plate.press());
        assert!(plate.is_pressed());

        assert!(plate.release());
        assert!(!plate.release());
        assert!(!plate.is_pressed());
    }

    #[test]
    fn test_volume_contains_edges() {
        let volume = TriggerVolume::new(Vec2::new(10.0, 5.0));
        let center = Vec2::new(100.0, 0.0);
        assert!(volume.contains(center, Vec2::new(110.0, 5.0)));
        assert!(!volume.contains(center, Vec2::new(110.1, 0.0)));
        assert!(!volume.contains(center, Vec2::new(100.0, -5.5)));
    }

    #[test]
    fn test_occupant_transitions() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        let mut volume = TriggerVolume::new(Vec2::ONE);
        assert_eq!(volume.set_occupants(vec![a]), (1, 0));
        assert_eq!(volume.set_occupants(vec![b, a]), (1, 0));
        assert_eq!(volume.set_occupants(vec![a, b]), (0, 0));
        assert_eq!(volume.set_occupants(vec![b]), (0, 1));
        assert!(volume.is_occupied_by(b));
        assert!(!volume.is_occupied_by(a));
    }

    #[test]
    fn test_plate_events_through_system() {
        let mut world = World::new();
        world.insert_resource(EventBus::new());
        let actor = world.spawn((LiveActor, Transform::from_xyz(0.0, 0.0, 0.0))).id();
        world.spawn((
            PressurePlate::new("plate_a"),
            TriggerVolume::new(Vec2::splat(10.0)),
            Transform::default(),
        ));

        world.run_system_once(update_trigger_volumes).unwrap();
        // Still standing there: no second press
        world.run_system_once(update_trigger_volumes).unwrap();

        world.get_mut::<Transform>(actor).unwrap().translation.x = 50.0;
        world.run_system_once(update_trigger_volumes).unwrap();

        let events: Vec<LoopEvent> = world
            .resource_mut::<EventBus>()
            .drain()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(
            events,
            vec![
                LoopEvent::PlatePressed {
                    plate: "plate_a".to_string()
                },
                LoopEvent::PlateReleased {
                    plate: "plate_a".to_string(),
                    forced: false
                },
            ]
        );
    }

    #[test]
    fn test_force_release_only_touches_pressed_plates() {
        let mut world = World::new();
        let mut bus = EventBus::new();
        let pressed = world.spawn((PressurePlate::new("p1"), CycleBoundarySync)).id();
        world.spawn((PressurePlate::new("p2"), CycleBoundarySync));
        world.get_mut::<PressurePlate>(pressed).unwrap().press();

        let mut query = world.query_filtered::<&mut PressurePlate, With<CycleBoundarySync>>();
        let released = force_release_boundary_plates(query.iter_mut(&mut world), &mut bus);

        assert_eq!(released, 1);
        assert_eq!(bus.pending_count(), 1);
        assert!(!world.get::<PressurePlate>(pressed).unwrap().is_pressed());
    }
}
