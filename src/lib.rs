/*!
 * Round-Robin Multi-Core Scheduler Simulator
 * Discrete-time simulation of preemptive round-robin scheduling, exposed as a library
 */

pub mod core;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod simulation;
pub mod workload;

// Re-exports
pub use crate::core::{IngestError, SimError};
pub use monitoring::init_tracing;
pub use process::{ProcessSpec, ProcessState};
pub use simulation::{
    Pacing, ProcessReport, ProcessStatus, SimConfig, Simulation, SimulationReport, Stepper, Summary,
};
pub use workload::{load, parse_json, parse_records, Ingest};
