//! Headless simulation - run the loop without rendering
//!
//! Provides the manually clocked app builder used by tests and a scripted
//! runner that prints every loop event.

pub mod app_builder;
pub mod config;
pub mod runner;

#[cfg(test)]
mod loop_test;

pub use app_builder::{HeadlessAppBuilder, run_for, step};
pub use config::SimConfig;
pub use runner::{SimReport, run_simulation};
