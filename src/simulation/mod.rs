/*!
 * Simulation Module
 * Clock, dispatcher, core executors and blocked waiter around the shared state
 */

pub mod actor;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod executor;
pub mod report;
pub mod stepper;
pub mod waiter;

// Re-export public API
pub use actor::Actor;
pub use config::{Pacing, SimConfig, DEFAULT_CORES, DEFAULT_HORIZON, DEFAULT_QUANTUM};
pub use engine::Simulation;
pub use report::{ProcessReport, ProcessStatus, SimulationReport, Summary};
pub use stepper::Stepper;
