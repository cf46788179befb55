//! Echo loop simulation - scripted headless run
//!
//! Records a few cycles without rendering and prints every loop event.
//!
//! Usage:
//!   cargo run --bin simulate -- --help
//!   cargo run --bin simulate -- --cycles 5 --duration 2
//!   cargo run --bin simulate -- --quiet --log

use echoloop::simulation::{SimConfig, run_simulation};

fn main() {
    let config = SimConfig::from_args();
    let report = run_simulation(config);
    println!("{}", report.format());
}
