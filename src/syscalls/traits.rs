/*!
 * Syscall Traits
 * Syscall execution abstractions
 */

use super::errors::SyscallResult;
use crate::core::types::{ExitCode, Pid};
use crate::process::WaitStatus;

/// Process lifecycle syscalls
///
/// `caller` is the PID of the process issuing the call.
pub trait ProcessSyscalls: Send + Sync {
    /// Duplicate `caller`; returns the child's PID
    fn fork(&self, caller: Pid) -> SyscallResult<Pid>;

    /// Terminate `caller` with `code`
    fn exit(&self, caller: Pid, code: ExitCode) -> SyscallResult<()>;

    /// PID of the calling process
    fn getpid(&self, caller: Pid) -> Pid;

    /// Block until child `target` exits and write its status to `status`
    fn waitpid(
        &self,
        caller: Pid,
        target: Pid,
        status: Option<&mut WaitStatus>,
        options: i32,
    ) -> SyscallResult<Pid>;
}
