/*!
 * Core Types
 * Common types used across the simulator
 */

/// Discrete simulated time unit
pub type Tick = u64;

/// Index of an execution core (0-based)
pub type CoreId = usize;

/// Registry slot of a process; stable for the whole run
pub type ProcessId = usize;

/// Common result type for simulation operations
pub type SimResult<T> = Result<T, super::errors::SimError>;
