/*!
 * Scheduler Module
 * Shared scheduler state and the monitor that guards it
 */

pub mod monitor;
pub mod state;

// Re-export public API
pub use monitor::{Monitor, Signal};
pub use state::{SchedulerState, Turn};
