//! Player module - live actor components and the reference motion source

mod components;
mod movement;

pub use components::*;
pub use movement::*;
