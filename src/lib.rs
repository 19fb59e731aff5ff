/*!
 * Traffic Kernel Library
 *
 * Two monitor-based coordination subsystems:
 * - Intersection admission control for a simulated four-way intersection
 * - Process exit/wait bookkeeping behind fork, _exit and waitpid
 */

pub mod core;
pub mod monitoring;
pub mod process;
pub mod syscalls;
pub mod traffic;

// Re-exports
pub use crate::core::{ConfigError, KernelConfig, KernelError, KernelResult, Pid, ProcessError};
pub use monitoring::init_tracing;
pub use process::{PidTable, PidTableConfig, WaitStatus};
pub use syscalls::{ProcessHost, ProcessSyscalls, SimulatedHost, SyscallError, SyscallExecutor};
pub use traffic::{
    Direction, Intersection, IntersectionConfig, Simulation, SimulationConfig, SimulationReport,
    Vehicle,
};
