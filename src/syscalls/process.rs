/*!
 * Process Syscalls
 * fork, _exit, getpid and waitpid over the process table
 */

use super::errors::{SyscallError, SyscallResult};
use super::executor::SyscallExecutor;
use super::host::ProcessHost;
use super::traits::ProcessSyscalls;
use crate::core::types::{ExitCode, Pid};
use crate::process::WaitStatus;
use tracing::{debug, info, warn};

impl<H: ProcessHost> SyscallExecutor<H> {
    fn ensure_exists(&self, pid: Pid) -> SyscallResult<()> {
        if self.table.exists(pid) {
            Ok(())
        } else {
            Err(SyscallError::NoSuchProcess(pid))
        }
    }

    /// Undo a partially constructed child
    fn abort_fork(&self, child: Pid, had_address_space: bool) {
        if had_address_space {
            self.host.destroy_address_space(child);
        }
        if let Err(e) = self.table.destroy(child) {
            warn!(child, error = %e, "Failed to release PID of aborted fork");
        }
    }

    fn fork_inner(&self, caller: Pid) -> SyscallResult<Pid> {
        self.ensure_exists(caller)?;

        let child = self.table.create().map_err(|e| {
            warn!(caller, error = %e, "fork: PID allocation failed");
            SyscallError::from(e)
        })?;

        if let Err(e) = self.host.copy_address_space(caller, child) {
            warn!(caller, child, error = %e, "fork: address space copy failed");
            self.abort_fork(child, false);
            return Err(e);
        }

        self.table.set_parent(child, caller)?;

        if let Err(e) = self.host.start_thread(child) {
            warn!(caller, child, error = %e, "fork: thread start failed");
            self.abort_fork(child, true);
            return Err(e);
        }

        info!(parent = caller, child, "Process forked");
        Ok(child)
    }

    fn exit_inner(&self, caller: Pid, code: ExitCode) -> SyscallResult<()> {
        self.ensure_exists(caller)?;

        self.host.destroy_address_space(caller);
        self.host.detach_thread(caller);

        let handoff = self.table.reparent_children(caller);
        if !handoff.reaped.is_empty() || !handoff.orphaned.is_empty() {
            debug!(
                pid = caller,
                reaped = ?handoff.reaped,
                orphaned = ?handoff.orphaned,
                "Children handed off"
            );
        }

        // Code, then exited flag, then completion signal
        self.table.publish_exit(caller, code)?;

        // Nobody can wait for a process without a parent
        if matches!(self.table.get_parent(caller), Ok(None)) && self.table.destroy(caller).is_ok()
        {
            debug!(pid = caller, "Parentless process reaped at exit");
        }

        info!(pid = caller, code, "Process exited");
        Ok(())
    }

    fn waitpid_inner(
        &self,
        caller: Pid,
        target: Pid,
        status: Option<&mut WaitStatus>,
        options: i32,
    ) -> SyscallResult<Pid> {
        if options != 0 {
            warn!(caller, target, options, "waitpid: unsupported options");
            return Err(SyscallError::invalid_argument(format!(
                "unsupported waitpid options {options:#x}"
            )));
        }

        self.ensure_exists(target)?;

        if self.table.get_parent(target)? != Some(caller) {
            warn!(caller, target, "waitpid: target is not a child");
            return Err(SyscallError::NotChild { caller, target });
        }

        let Some(status) = status else {
            return Err(SyscallError::bad_address("waitpid status pointer is null"));
        };

        let code = self.table.wait(target)?;
        *status = WaitStatus::exited(code);

        // Only the parent may wait, so the record can go now
        self.table.destroy(target)?;

        debug!(caller, target, %status, "waitpid collected child");
        Ok(target)
    }
}

impl<H: ProcessHost> ProcessSyscalls for SyscallExecutor<H> {
    fn fork(&self, caller: Pid) -> SyscallResult<Pid> {
        self.traced("fork", caller, || self.fork_inner(caller))
    }

    fn exit(&self, caller: Pid, code: ExitCode) -> SyscallResult<()> {
        self.traced("_exit", caller, || self.exit_inner(caller, code))
    }

    fn getpid(&self, caller: Pid) -> Pid {
        caller
    }

    fn waitpid(
        &self,
        caller: Pid,
        target: Pid,
        status: Option<&mut WaitStatus>,
        options: i32,
    ) -> SyscallResult<Pid> {
        self.traced("waitpid", caller, || {
            self.waitpid_inner(caller, target, status, options)
        })
    }
}
