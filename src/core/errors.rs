/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export SyscallError from syscalls module
pub use crate::syscalls::SyscallError;

/// Process table errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have been reaped or never existed. Check PID validity.")
    )]
    NotFound(Pid),

    #[error("Process table exhausted: {in_use} of {capacity} PIDs in use")]
    #[diagnostic(
        code(process::resource_exhausted),
        help("Reap exited processes or raise KERNEL_MAX_PID.")
    )]
    ResourceExhausted { in_use: usize, capacity: usize },

    #[error("Process {0} has already exited")]
    #[diagnostic(
        code(process::already_exited),
        help("A process publishes its exit status exactly once.")
    )]
    AlreadyExited(Pid),
}

/// Configuration errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(
        code(config::io),
        help("Check that KERNEL_CONFIG points at a readable file.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    #[diagnostic(code(config::parse), help("The config file must be valid JSON."))]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    #[diagnostic(code(config::invalid_env), help("Environment overrides must be integers."))]
    InvalidEnv { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(config::invalid), help("Review configuration parameters."))]
    Invalid(String),
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Syscall error: {0}")]
    #[diagnostic(transparent)]
    Syscall(#[from] SyscallError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(
        code(kernel::internal_error),
        help("An unexpected internal error occurred. Please report this issue.")
    )]
    Internal(String),
}

impl From<String> for KernelError {
    fn from(msg: String) -> Self {
        KernelError::Internal(msg)
    }
}

impl From<&str> for KernelError {
    fn from(msg: &str) -> Self {
        KernelError::Internal(msg.to_string())
    }
}
