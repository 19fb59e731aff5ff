/*!
 * Synchronization Primitives
 *
 * Blocking primitives shared by the intersection controller and the
 * process table:
 * - `Monitor`: mutex + condvar with predicate re-check after every wake
 * - `CompletionSignal`: one-shot broadcast event for process termination
 */

mod completion;
mod monitor;

pub use completion::CompletionSignal;
pub use monitor::Monitor;
