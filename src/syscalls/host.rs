/*!
 * Process Host
 *
 * Address-space and thread services the process syscalls depend on. The
 * kernel proper supplies these; `SimulatedHost` keeps them as in-memory sets
 * so the syscall layer can run on its own.
 */

use super::errors::{SyscallError, SyscallResult};
use crate::core::types::Pid;
use ahash::AHashSet;
use parking_lot::Mutex;
use tracing::trace;

/// Address-space and thread lifecycle services
#[cfg_attr(test, mockall::automock)]
pub trait ProcessHost: Send + Sync {
    /// Give `pid` a fresh, empty address space
    fn create_address_space(&self, pid: Pid) -> SyscallResult<()>;

    /// Give `child` a copy of `parent`'s address space
    fn copy_address_space(&self, parent: Pid, child: Pid) -> SyscallResult<()>;

    /// Start `child`'s thread, resuming from the parent's trap frame
    fn start_thread(&self, child: Pid) -> SyscallResult<()>;

    /// Detach the thread running `pid`
    fn detach_thread(&self, pid: Pid);

    /// Tear down `pid`'s address space
    fn destroy_address_space(&self, pid: Pid);
}

#[derive(Debug, Default)]
struct HostState {
    address_spaces: AHashSet<Pid>,
    threads: AHashSet<Pid>,
}

/// In-memory host with an optional cap on live address spaces
#[derive(Debug, Default)]
pub struct SimulatedHost {
    state: Mutex<HostState>,
    max_address_spaces: Option<usize>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail address-space allocation once `limit` spaces are live
    #[must_use]
    pub fn with_address_space_limit(limit: usize) -> Self {
        Self {
            state: Mutex::default(),
            max_address_spaces: Some(limit),
        }
    }

    pub fn has_address_space(&self, pid: Pid) -> bool {
        self.state.lock().address_spaces.contains(&pid)
    }

    pub fn has_thread(&self, pid: Pid) -> bool {
        self.state.lock().threads.contains(&pid)
    }

    pub fn live_address_spaces(&self) -> usize {
        self.state.lock().address_spaces.len()
    }

    pub fn live_threads(&self) -> usize {
        self.state.lock().threads.len()
    }

    fn allocate(&self, pid: Pid) -> SyscallResult<()> {
        let mut state = self.state.lock();
        if let Some(limit) = self.max_address_spaces {
            if state.address_spaces.len() >= limit {
                return Err(SyscallError::out_of_memory(format!(
                    "address space limit {limit} reached"
                )));
            }
        }
        state.address_spaces.insert(pid);
        trace!(pid, "Address space allocated");
        Ok(())
    }
}

impl ProcessHost for SimulatedHost {
    fn create_address_space(&self, pid: Pid) -> SyscallResult<()> {
        self.allocate(pid)
    }

    fn copy_address_space(&self, parent: Pid, child: Pid) -> SyscallResult<()> {
        if !self.has_address_space(parent) {
            return Err(SyscallError::bad_address(format!(
                "process {parent} has no address space to copy"
            )));
        }
        self.allocate(child)
    }

    fn start_thread(&self, child: Pid) -> SyscallResult<()> {
        self.state.lock().threads.insert(child);
        Ok(())
    }

    fn detach_thread(&self, pid: Pid) {
        self.state.lock().threads.remove(&pid);
    }

    fn destroy_address_space(&self, pid: Pid) {
        self.state.lock().address_spaces.remove(&pid);
        trace!(pid, "Address space destroyed");
    }
}
