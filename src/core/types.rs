/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// Exit code passed to `_exit` by a terminating process
pub type ExitCode = i32;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
