/*!
 * Syscall Error Types
 * Errors returned to user processes, with their errno values
 */

use crate::core::ProcessError;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Syscall operation errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
#[non_exhaustive]
pub enum SyscallError {
    /// Target process does not exist
    #[error("No such process: {0}")]
    #[diagnostic(code(syscall::esrch))]
    NoSuchProcess(u32),

    /// Caller is not the parent of the target process
    #[error("Process {target} is not a child of {caller}")]
    #[diagnostic(code(syscall::echild), help("Only the parent may wait for a process."))]
    NotChild { caller: u32, target: u32 },

    /// Output pointer is null or invalid
    #[error("Bad address: {0}")]
    #[diagnostic(code(syscall::efault))]
    BadAddress(String),

    /// Unsupported flags or malformed argument
    #[error("Invalid argument: {0}")]
    #[diagnostic(code(syscall::einval))]
    InvalidArgument(String),

    /// Allocation or table capacity exhausted
    #[error("Out of memory: {0}")]
    #[diagnostic(code(syscall::enomem), help("Reap exited children or raise limits."))]
    OutOfMemory(String),
}

impl SyscallError {
    /// Numeric error code handed back to user space
    pub const fn errno(&self) -> i32 {
        match self {
            Self::OutOfMemory(_) => 3,
            Self::BadAddress(_) => 6,
            Self::InvalidArgument(_) => 8,
            Self::NoSuchProcess(_) => 15,
            Self::NotChild { .. } => 16,
        }
    }

    #[inline]
    pub fn bad_address(msg: impl Into<String>) -> Self {
        Self::BadAddress(msg.into())
    }

    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    #[inline]
    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Self::OutOfMemory(msg.into())
    }
}

impl From<ProcessError> for SyscallError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NotFound(pid) => Self::NoSuchProcess(pid),
            ProcessError::ResourceExhausted { .. } => Self::OutOfMemory(err.to_string()),
            ProcessError::AlreadyExited(_) => Self::InvalidArgument(err.to_string()),
        }
    }
}

/// Result type for syscalls
pub type SyscallResult<T> = Result<T, SyscallError>;
