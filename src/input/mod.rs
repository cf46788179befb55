//! Input module - PlayerInput resource and capture_input system

use bevy::prelude::*;

use crate::constants::*;
use crate::cycle::{CyclePhase, CycleRequest, LoopOrchestrator};

/// Buffered input state for the live actor
#[derive(Resource, Default, Debug, Clone)]
pub struct PlayerInput {
    pub move_dir: Vec2,
    pub run_held: bool,
    pub jump_pressed: bool,     // Accumulates until consumed by movement
    pub interact_pressed: bool, // Accumulates until consumed by movement
    pub loop_pressed: bool,     // Start or stop the cycle
}

/// Runs in Update to capture keyboard and gamepad state.
pub fn capture_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut input: ResMut<PlayerInput>,
) {
    let mut dir = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }

    for gamepad in &gamepads {
        let stick = gamepad.left_stick();
        if stick.length() > MOVE_DEADZONE {
            dir += stick;
        }
    }

    input.move_dir = dir.clamp_length_max(1.0);

    input.run_held = keyboard.pressed(KeyCode::ShiftLeft)
        || keyboard.pressed(KeyCode::ShiftRight)
        || gamepads
            .iter()
            .any(|gp| gp.pressed(GamepadButton::RightTrigger));

    if keyboard.just_pressed(KeyCode::Space)
        || gamepads
            .iter()
            .any(|gp| gp.just_pressed(GamepadButton::South))
    {
        input.jump_pressed = true;
    }

    if keyboard.just_pressed(KeyCode::KeyE)
        || gamepads
            .iter()
            .any(|gp| gp.just_pressed(GamepadButton::West))
    {
        input.interact_pressed = true;
    }

    if keyboard.just_pressed(KeyCode::KeyL)
        || gamepads
            .iter()
            .any(|gp| gp.just_pressed(GamepadButton::North))
    {
        input.loop_pressed = true;
    }
}

/// Turn the loop button into a start or early-stop request
pub fn request_cycle_from_input(
    mut input: ResMut<PlayerInput>,
    orchestrator: Res<LoopOrchestrator>,
    mut requests: MessageWriter<CycleRequest>,
) {
    if !std::mem::take(&mut input.loop_pressed) {
        return;
    }
    match orchestrator.phase() {
        CyclePhase::Idle => {
            requests.write(CycleRequest::Start);
        }
        CyclePhase::Recording => {
            requests.write(CycleRequest::StopEarly);
        }
    }
}
