//! World objects the live actor and its echoes share
//!
//! Pressure plates and the activation zone react to presence through trigger
//! volumes. Levers react to interaction requests. Gates follow a plate or
//! lever by id.

mod objects;
mod triggers;

pub use objects::*;
pub use triggers::*;
