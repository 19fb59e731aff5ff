/*!
 * Wait Status Encoding
 *
 * Status word written back to a parent by `waitpid`. The low two bits hold
 * the termination kind, the remaining bits the payload (exit code for a
 * normal exit).
 */

use crate::core::types::ExitCode;
use serde::{Deserialize, Serialize};
use std::fmt;

const WAIT_KIND_MASK: i32 = 0b11;
const WAIT_EXITED: i32 = 0;
const WAIT_SIGNALED: i32 = 1;

/// Encoded termination status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitStatus(i32);

impl WaitStatus {
    /// Status for a process that called `_exit(code)`
    #[inline]
    pub const fn exited(code: ExitCode) -> Self {
        Self((code << 2) | WAIT_EXITED)
    }

    /// Status for a process killed by `signal`
    #[inline]
    pub const fn signaled(signal: i32) -> Self {
        Self((signal << 2) | WAIT_SIGNALED)
    }

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_exited(self) -> bool {
        self.0 & WAIT_KIND_MASK == WAIT_EXITED
    }

    #[inline]
    pub const fn is_signaled(self) -> bool {
        self.0 & WAIT_KIND_MASK == WAIT_SIGNALED
    }

    /// Exit code, if the process exited normally
    #[inline]
    pub const fn exit_code(self) -> Option<ExitCode> {
        if self.is_exited() {
            Some(self.0 >> 2)
        } else {
            None
        }
    }
}

impl fmt::Display for WaitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code() {
            Some(code) => write!(f, "exited({code})"),
            None if self.is_signaled() => write!(f, "signaled({})", self.0 >> 2),
            None => write!(f, "status({:#x})", self.0),
        }
    }
}
