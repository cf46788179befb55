//! Tunable constants for echoloop
//!
//! Defaults for the loop, the live actor and the demo arena. Runtime values
//! come from `config/loop_settings.json` (see `settings`).

use bevy::prelude::*;

// =============================================================================
// LOOP DEFAULTS
// =============================================================================

pub const DEFAULT_CYCLE_DURATION: f32 = 10.0; // Seconds recorded per cycle
pub const MIN_CYCLE_DURATION: f32 = 0.05; // Floor for playback repetition length

// =============================================================================
// LIVE ACTOR
// =============================================================================

pub const WALK_SPEED: f32 = 200.0;
pub const RUN_SPEED: f32 = 240.0;
pub const INTERACT_RANGE: f32 = 120.0;
pub const INTERACT_CONE_COS: f32 = 0.5; // Targets within ~60 degrees of facing
pub const MOVE_DEADZONE: f32 = 0.1;
pub const ACTOR_SIZE: Vec2 = Vec2::new(32.0, 32.0);

// =============================================================================
// ARENA / DEMO COLORS
// =============================================================================

pub const DEFAULT_BACKGROUND_COLOR: Color = Color::srgb(0.12, 0.12, 0.16);
pub const ACTOR_COLOR: Color = Color::srgb(0.95, 0.9, 0.8);
pub const ECHO_ALPHA: f32 = 0.5;
pub const ZONE_COLOR: Color = Color::srgba(0.3, 0.6, 0.9, 0.15);
pub const PLATE_IDLE_COLOR: Color = Color::srgb(0.35, 0.3, 0.25);
pub const PLATE_PRESSED_COLOR: Color = Color::srgb(0.9, 0.75, 0.4);
pub const GATE_CLOSED_COLOR: Color = Color::srgb(0.6, 0.2, 0.2);
pub const GATE_OPEN_COLOR: Color = Color::srgba(0.2, 0.6, 0.2, 0.3);
pub const LEVER_OFF_COLOR: Color = Color::srgb(0.5, 0.5, 0.55);
pub const LEVER_ON_COLOR: Color = Color::srgb(0.4, 0.9, 0.5);
pub const LEVER_SIZE: Vec2 = Vec2::new(20.0, 20.0);

pub const TEXT_PRIMARY: Color = Color::srgb(0.95, 0.9, 0.8);
pub const TEXT_RECORDING: Color = Color::srgb(1.0, 0.3, 0.3);

// =============================================================================
// FILES
// =============================================================================

pub const SCENE_FILE: &str = "assets/scene.toml";
