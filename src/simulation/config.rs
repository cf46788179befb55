//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::constants::SCENE_FILE;

/// Configuration for a scripted headless run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Cycles to record
    pub cycles: u32,
    /// Cycle duration override (None = settings file)
    pub cycle_duration: Option<f32>,
    /// Seconds per frame
    pub dt: f32,
    /// Seconds to keep running after the last cycle
    pub settle_secs: f32,
    /// Scene file
    pub scene: String,
    /// Write an .evlog file under logs/
    pub log_events: bool,
    /// Suppress per-event output
    pub quiet: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cycles: 3,
            cycle_duration: None,
            dt: 1.0 / 60.0,
            settle_secs: 5.0,
            scene: SCENE_FILE.to_string(),
            log_events: false,
            quiet: false,
        }
    }
}

impl SimConfig {
    /// Parse configuration from command line arguments
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::parse_args(&args[1..])
    }

    pub fn parse_args(args: &[String]) -> Self {
        let mut config = Self::default();

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--cycles" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        config.cycles = n;
                    }
                    i += 1;
                }
                "--duration" => {
                    config.cycle_duration = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--dt" => {
                    if let Some(dt) = value.and_then(|v| v.parse::<f32>().ok())
                        && dt > 0.0
                    {
                        config.dt = dt;
                    }
                    i += 1;
                }
                "--settle" => {
                    if let Some(s) = value.and_then(|v| v.parse().ok()) {
                        config.settle_secs = s;
                    }
                    i += 1;
                }
                "--scene" => {
                    if let Some(path) = value {
                        config.scene = path.clone();
                    }
                    i += 1;
                }
                "--log" => config.log_events = true,
                "--quiet" | "-q" => config.quiet = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => eprintln!("Ignoring unknown argument: {}", other),
            }
            i += 1;
        }

        config
    }
}

fn print_help() {
    println!(
        r#"Echo loop simulation - scripted headless run

Usage: simulate [options]

Options:
  --cycles <n>       Cycles to record (default 3)
  --duration <secs>  Cycle duration (default: settings file)
  --dt <secs>        Seconds per frame (default 1/60)
  --settle <secs>    Run time after the last cycle (default 5)
  --scene <path>     Scene file (default assets/scene.toml)
  --log              Write an .evlog file under logs/
  -q, --quiet        Only print the summary
  -h, --help         Show this help"#
    );
}
