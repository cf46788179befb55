//! Loop event logging
//!
//! Provides a compact text format for logging cycle, echo and world events.
//! The EventBus collects events from every module; the EventLogger drains
//! them to an `.evlog` file.

mod bus;
mod format;
mod logger;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use format::serialize_event;
pub use logger::{EventLogConfig, EventLogger, flush_event_log};
pub use types::LoopEvent;
