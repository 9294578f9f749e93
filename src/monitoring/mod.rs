/*!
 * Monitoring
 * Structured logging setup and actor tracing spans
 */

mod tracer;

pub use tracer::{init_tracing, ActorSpan};
