/*!
 * Process Module
 * Process descriptors and lifecycle records
 */

pub mod types;

// Re-export for convenience
pub use types::{Process, ProcessSpec, ProcessState};
