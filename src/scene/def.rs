//! Scene description - TOML parsing and validation

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Whole scene file
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
pub struct SceneDef {
    pub actor: ActorDef,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    #[serde(default)]
    pub plates: Vec<PlateDef>,
    #[serde(default)]
    pub levers: Vec<LeverDef>,
    #[serde(default)]
    pub gates: Vec<GateDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActorDef {
    pub start: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneDef {
    pub position: [f32; 2],
    pub half_extents: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlateDef {
    pub id: String,
    pub position: [f32; 2],
    #[serde(default = "default_plate_extents")]
    pub half_extents: [f32; 2],
    /// Released at every cycle boundary
    #[serde(default)]
    pub boundary_sync: bool,
}

fn default_plate_extents() -> [f32; 2] {
    [24.0, 24.0]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeverDef {
    pub id: String,
    pub position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GateDef {
    pub id: String,
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// Plate or lever id that opens this gate
    pub trigger: String,
}

impl Default for SceneDef {
    /// Small built-in scene: a start zone, one synced plate, one lever and a
    /// gate for each
    fn default() -> Self {
        Self {
            actor: ActorDef {
                start: [-240.0, 0.0],
            },
            zones: vec![ZoneDef {
                position: [-240.0, 0.0],
                half_extents: [80.0, 80.0],
            }],
            plates: vec![PlateDef {
                id: "plate_north".to_string(),
                position: [0.0, 160.0],
                half_extents: default_plate_extents(),
                boundary_sync: true,
            }],
            levers: vec![LeverDef {
                id: "lever_south".to_string(),
                position: [0.0, -160.0],
            }],
            gates: vec![
                GateDef {
                    id: "gate_plate".to_string(),
                    position: [240.0, 80.0],
                    size: [20.0, 140.0],
                    trigger: "plate_north".to_string(),
                },
                GateDef {
                    id: "gate_lever".to_string(),
                    position: [240.0, -80.0],
                    size: [20.0, 140.0],
                    trigger: "lever_south".to_string(),
                },
            ],
        }
    }
}

impl SceneDef {
    /// Parse and validate a scene
    pub fn parse(content: &str) -> Result<Self, String> {
        let scene: SceneDef =
            toml::from_str(content).map_err(|e| format!("Invalid scene: {}", e))?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Load a scene, falling back to the built-in one
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(scene) => {
                info!(
                    "Loaded scene from {} ({} plates, {} levers, {} gates)",
                    path.display(),
                    scene.plates.len(),
                    scene.levers.len(),
                    scene.gates.len()
                );
                scene
            }
            Err(e) => {
                warn!("{}, using built-in scene", e);
                Self::default()
            }
        }
    }

    /// Ids must be unique across plates, levers and gates, and every gate
    /// must point at a plate or lever
    pub fn validate(&self) -> Result<(), String> {
        let mut ids = HashSet::new();
        let all_ids = self
            .plates
            .iter()
            .map(|p| &p.id)
            .chain(self.levers.iter().map(|l| &l.id))
            .chain(self.gates.iter().map(|g| &g.id));
        for id in all_ids {
            if id.is_empty() {
                return Err("empty object id".to_string());
            }
            if !ids.insert(id.as_str()) {
                return Err(format!("duplicate object id '{}'", id));
            }
        }

        for gate in &self.gates {
            let known = self.plates.iter().any(|p| p.id == gate.trigger)
                || self.levers.iter().any(|l| l.id == gate.trigger);
            if !known {
                return Err(format!(
                    "gate '{}' is triggered by unknown id '{}'",
                    gate.id, gate.trigger
                ));
            }
        }
        Ok(())
    }
}
