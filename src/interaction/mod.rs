//! Interaction capability and stable identity
//!
//! Any world object becomes interactable by carrying an [`Interactable`]
//! component with an author-defined [`InteractableId`]. Invoking it means
//! writing an [`InteractionRequest`]; the object's own system decides what
//! that does (see `world::apply_interaction_requests`).

mod registry;

pub use registry::InteractableRegistry;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Author-defined identifier, stable across respawns and scene reloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractableId(pub String);

impl InteractableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InteractableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InteractableId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Marks an entity as exposing the invoke capability.
#[derive(Component, Debug, Clone)]
pub struct Interactable {
    pub id: InteractableId,
}

impl Interactable {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: InteractableId::new(id),
        }
    }
}

/// Who performed an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performer {
    /// The live, player-controlled actor
    Live,
    /// An echo, identified by the cycle that produced it
    Echo { cycle: u32 },
}

impl std::fmt::Display for Performer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Performer::Live => write!(f, "L"),
            Performer::Echo { cycle } => write!(f, "E{}", cycle),
        }
    }
}

/// Request to invoke an interactable. Handled once by the owning object.
#[derive(Message, Debug, Clone)]
pub struct InteractionRequest {
    pub target: Entity,
    pub performer: Performer,
}
