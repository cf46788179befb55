//! Scene module - TOML scene description and spawning

mod def;
mod spawn;

pub use def::*;
pub use spawn::spawn_scene;
