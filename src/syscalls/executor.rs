/*!
 * Syscall Executor
 * Owns the process table and host services used by syscall handlers
 */

use super::errors::SyscallResult;
use super::host::ProcessHost;
use crate::core::types::Pid;
use crate::monitoring::SyscallSpan;
use crate::process::PidTable;
use std::sync::Arc;
use tracing::info;

/// Dispatches process syscalls against a [`PidTable`] and a [`ProcessHost`]
pub struct SyscallExecutor<H: ProcessHost> {
    pub(super) table: Arc<PidTable>,
    pub(super) host: H,
}

impl<H: ProcessHost> SyscallExecutor<H> {
    pub fn new(table: Arc<PidTable>, host: H) -> Self {
        info!(capacity = table.capacity(), "Syscall executor initialized");
        Self { table, host }
    }

    pub fn table(&self) -> &Arc<PidTable> {
        &self.table
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Create the first user process: no parent, empty address space
    pub fn spawn_init(&self) -> SyscallResult<Pid> {
        let pid = self.table.create()?;
        if let Err(e) = self.host.create_address_space(pid) {
            self.table.destroy(pid)?;
            return Err(e);
        }
        info!(pid, "Initial user process created");
        Ok(pid)
    }

    /// Run one syscall inside a timed tracing span
    pub(super) fn traced<T, F>(&self, syscall: &'static str, caller: Pid, f: F) -> SyscallResult<T>
    where
        F: FnOnce() -> SyscallResult<T>,
    {
        let span = SyscallSpan::new(syscall, caller);
        let _entered = span.enter();
        let result = f();
        match &result {
            Ok(_) => span.record_success(),
            Err(e) => span.record_errno(e.errno()),
        }
        result
    }
}
