//! Headless simulation runner
//!
//! Plays a fixed script: each cycle the live actor walks out in a new
//! direction, pulls whatever is in reach a quarter of the way in, then stands
//! still until the cycle times out. Every bus event is printed and counted.

use bevy::prelude::*;
use std::path::Path;

use crate::cycle::{CycleRequest, LoopOrchestrator};
use crate::events::{EventBus, EventLogConfig, EventLogger, LoopEvent, serialize_event};
use crate::input::PlayerInput;
use crate::interaction::Performer;
use crate::scene::SceneDef;
use crate::settings::LoopSettings;

use super::app_builder::{HeadlessAppBuilder, step};
use super::config::SimConfig;

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimReport {
    pub cycles_completed: u32,
    pub echoes_alive: usize,
    pub live_interactions: u32,
    pub echo_interactions: u32,
    pub plate_presses: u32,
    pub spawn_failures: u32,
    pub events: u32,
}

impl SimReport {
    fn count(&mut self, event: &LoopEvent) {
        self.events += 1;
        match event {
            LoopEvent::CycleEnded { .. } => self.cycles_completed += 1,
            LoopEvent::Interaction {
                performer: Performer::Live,
                ..
            } => self.live_interactions += 1,
            LoopEvent::Interaction { .. } => self.echo_interactions += 1,
            LoopEvent::PlatePressed { .. } => self.plate_presses += 1,
            LoopEvent::EchoSpawnFailed { .. } => self.spawn_failures += 1,
            _ => {}
        }
    }

    /// Format report for console output
    pub fn format(&self) -> String {
        format!(
            "SIMULATION: {} cycles, {} echoes alive\n  interactions: {} live, {} echo\n  plate presses: {}\n  spawn failures: {}\n  events: {}",
            self.cycles_completed,
            self.echoes_alive,
            self.live_interactions,
            self.echo_interactions,
            self.plate_presses,
            self.spawn_failures,
            self.events
        )
    }
}

const DIRECTIONS: [Vec2; 4] = [Vec2::X, Vec2::Y, Vec2::NEG_Y, Vec2::NEG_X];

/// Input for cycle `cycle` at `t` seconds into it
fn scripted_input(cycle: u32, t_prev: f32, t: f32, duration: f32) -> PlayerInput {
    let walking = t < duration * 0.5;
    let quarter = duration * 0.25;
    PlayerInput {
        move_dir: if walking {
            DIRECTIONS[cycle as usize % DIRECTIONS.len()]
        } else {
            Vec2::ZERO
        },
        run_held: cycle % 2 == 1,
        jump_pressed: t_prev < quarter * 2.0 && t >= quarter * 2.0,
        interact_pressed: t_prev < quarter && t >= quarter,
        loop_pressed: false,
    }
}

struct Drain<'a> {
    report: &'a mut SimReport,
    logger: Option<&'a mut EventLogger>,
    quiet: bool,
}

impl Drain<'_> {
    fn run(&mut self, app: &mut App) {
        let events = app.world_mut().resource_mut::<EventBus>().drain();
        for event in events {
            self.report.count(&event.event);
            if !self.quiet {
                println!("{}", serialize_event(event.time_ms, &event.event));
            }
            if let Some(logger) = self.logger.as_deref_mut() {
                logger.log(event.time_ms, &event.event);
            }
        }
    }
}

/// Run the scripted session and return its totals
pub fn run_simulation(config: SimConfig) -> SimReport {
    let mut settings = LoopSettings::load();
    if let Some(duration) = config.cycle_duration {
        settings.cycle_duration = duration;
    }
    let duration = settings.cycle_duration;
    let scene = SceneDef::load_or_default(Path::new(&config.scene));

    let mut app = HeadlessAppBuilder::new()
        .with_settings(settings)
        .with_scene(scene)
        .build();

    let mut logger = config.log_events.then(|| {
        let mut logger = EventLogger::new(EventLogConfig::default());
        logger.start_session(&chrono::Local::now().to_rfc3339());
        logger
    });

    let mut report = SimReport::default();
    let mut drain = Drain {
        report: &mut report,
        logger: logger.as_mut(),
        quiet: config.quiet,
    };

    // Startup frame spawns the scene
    step(&mut app, config.dt);
    drain.run(&mut app);

    for cycle in 0..config.cycles {
        app.world_mut().write_message(CycleRequest::Start);

        let mut t = 0.0;
        let mut t_prev = -1.0;
        loop {
            *app.world_mut().resource_mut::<PlayerInput>() =
                scripted_input(cycle, t_prev, t, duration);
            step(&mut app, config.dt);
            drain.run(&mut app);

            if !app.world().resource::<LoopOrchestrator>().is_recording() {
                break;
            }
            t_prev = t;
            t += config.dt;
        }
    }

    *app.world_mut().resource_mut::<PlayerInput>() = PlayerInput::default();
    let settle_frames = (config.settle_secs / config.dt).round().max(0.0) as u32;
    for _ in 0..settle_frames {
        step(&mut app, config.dt);
        drain.run(&mut app);
    }

    if let Some(logger) = logger.as_mut() {
        logger.end_session();
    }

    report.echoes_alive = app.world().resource::<LoopOrchestrator>().active_echo_count();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_interacts_once_per_cycle() {
        let dt = 0.25;
        let mut presses = 0;
        let mut t_prev = -1.0;
        let mut t = 0.0;
        while t < 4.0 {
            if scripted_input(0, t_prev, t, 4.0).interact_pressed {
                presses += 1;
            }
            t_prev = t;
            t += dt;
        }
        assert_eq!(presses, 1);
    }

    #[test]
    fn test_report_counts_performers() {
        let mut report = SimReport::default();
        report.count(&LoopEvent::Interaction {
            performer: Performer::Live,
            target: "lever".into(),
        });
        report.count(&LoopEvent::Interaction {
            performer: Performer::Echo { cycle: 1 },
            target: "lever".into(),
        });
        assert_eq!(report.live_interactions, 1);
        assert_eq!(report.echo_interactions, 1);
        assert!(report.format().contains("1 live, 1 echo"));
    }
}
