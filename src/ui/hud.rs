//! HUD components and systems (cycle countdown and echo count)

use bevy::prelude::*;
use bevy::text::Justify;

use crate::constants::*;
use crate::cycle::LoopOrchestrator;

/// Cycle status text component
#[derive(Component)]
pub struct CycleHudText;

/// Spawn the status text above the arena (called from setup)
pub fn spawn_cycle_hud(commands: &mut Commands, y: f32) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 24.0,
            ..default()
        },
        TextLayout::new_with_justify(Justify::Center),
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, y, 10.0),
        CycleHudText,
    ));
}

/// Text shown for the orchestrator's current state
pub fn cycle_hud_line(orchestrator: &LoopOrchestrator) -> String {
    let echoes = orchestrator.active_echo_count();
    match orchestrator.countdown() {
        Some(countdown) => format!(
            "REC {}  |  cycle {}  |  echoes {}",
            countdown.display_number(),
            orchestrator.cycle(),
            echoes
        ),
        None if orchestrator.require_zone() && !orchestrator.in_zone() => {
            format!("Return to the start zone  |  echoes {}", echoes)
        }
        None => format!("Press L to record  |  echoes {}", echoes),
    }
}

/// Update cycle status display
pub fn update_cycle_hud(
    orchestrator: Res<LoopOrchestrator>,
    mut text_query: Query<(&mut Text2d, &mut TextColor), With<CycleHudText>>,
) {
    let Ok((mut text, mut color)) = text_query.single_mut() else {
        return;
    };

    text.0 = cycle_hud_line(&orchestrator);
    *color = TextColor(if orchestrator.is_recording() {
        TEXT_RECORDING
    } else {
        TEXT_PRIMARY
    });
}
