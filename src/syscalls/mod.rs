/*!
 * Syscalls Module
 * Process lifecycle system calls over the exit/wait table
 */

mod errors;
mod executor;
mod host;
mod process;
mod traits;

// Re-export public API
pub use errors::{SyscallError, SyscallResult};
pub use executor::SyscallExecutor;
pub use host::{ProcessHost, SimulatedHost};
pub use traits::ProcessSyscalls;
