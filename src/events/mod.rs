//! Session event log
//!
//! Connection transitions, status changes and shot animation milestones are
//! emitted to the `EventBus` and written to `logs/*.evlog` in a compact text
//! format, one event per line.

mod bus;
mod format;
mod logger;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use format::{parse_event, serialize_event};
pub use logger::{EventLogConfig, EventLogger, close_event_log, write_event_log};
pub use types::ReceiverEvent;
