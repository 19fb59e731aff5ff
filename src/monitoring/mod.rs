/*!
 * Monitoring
 * Structured tracing for kernel subsystems
 */

mod tracer;

pub use tracer::{init_tracing, next_trace_id, SyscallSpan};
