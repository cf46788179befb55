//! UI module - HUD and echo visuals

mod echoes;
mod hud;

pub use echoes::*;
pub use hud::*;
