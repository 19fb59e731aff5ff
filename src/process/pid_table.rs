/*!
 * Process Exit/Wait Table
 *
 * Per-PID bookkeeping of parent, exit code, termination flag and the
 * completion signal a parent blocks on in `waitpid`.
 *
 * # Publishing an exit
 *
 * A terminating process stores its exit code, flips `exited`, and only then
 * completes the signal. Code and flag are written under the table lock and
 * read back under it after the signal fires, so a woken waiter always sees
 * the published code. [`PidTable::publish_exit`] performs all three steps.
 *
 * # PID allocation
 *
 * The smallest PID in `[PID_MIN, max_pid]` not currently allocated. A PID is
 * only reused after [`PidTable::destroy`].
 */

use crate::core::limits::{DEFAULT_PID_MAX, PID_MIN};
use crate::core::sync::CompletionSignal;
use crate::core::types::{ExitCode, Pid};
use crate::core::{ConfigError, ProcessError};
use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace};

pub type PidResult<T> = Result<T, ProcessError>;

/// Process table configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidTableConfig {
    /// Largest PID handed out
    pub max_pid: Pid,
}

impl Default for PidTableConfig {
    fn default() -> Self {
        Self {
            max_pid: DEFAULT_PID_MAX,
        }
    }
}

impl PidTableConfig {
    #[inline]
    #[must_use]
    pub fn with_max_pid(max_pid: Pid) -> Self {
        Self { max_pid }
    }

    /// Number of PIDs the table can hold at once
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_pid.saturating_sub(PID_MIN) as usize + 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pid < PID_MIN {
            return Err(ConfigError::Invalid(format!(
                "max_pid must be at least {}, got {}",
                PID_MIN, self.max_pid
            )));
        }
        Ok(())
    }
}

/// Exit bookkeeping for one PID
#[derive(Debug)]
struct ExitRecord {
    parent: Option<Pid>,
    exit_code: ExitCode,
    exited: bool,
    completion: Arc<CompletionSignal>,
}

impl ExitRecord {
    fn new() -> Self {
        Self {
            parent: None,
            exit_code: 0,
            exited: false,
            completion: Arc::new(CompletionSignal::new()),
        }
    }
}

#[derive(Debug)]
struct PidTableState {
    records: AHashMap<Pid, ExitRecord>,
    /// Destroyed PIDs below `next_fresh`, available for reuse
    recycled: BTreeSet<Pid>,
    /// Lowest PID never handed out
    next_fresh: Pid,
}

impl PidTableState {
    fn record(&self, pid: Pid) -> PidResult<&ExitRecord> {
        self.records.get(&pid).ok_or(ProcessError::NotFound(pid))
    }

    fn record_mut(&mut self, pid: Pid) -> PidResult<&mut ExitRecord> {
        self.records.get_mut(&pid).ok_or(ProcessError::NotFound(pid))
    }
}

/// Outcome of handing off an exiting parent's children
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reparented {
    /// Children that had already exited and were destroyed
    pub reaped: Vec<Pid>,
    /// Children still running, now without a parent
    pub orphaned: Vec<Pid>,
}

/// PID → exit record table
pub struct PidTable {
    state: Mutex<PidTableState>,
    config: PidTableConfig,
}

impl PidTable {
    pub fn new(config: PidTableConfig) -> Self {
        Self {
            state: Mutex::new(PidTableState {
                records: AHashMap::new(),
                recycled: BTreeSet::new(),
                next_fresh: PID_MIN,
            }),
            config,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Allocated PIDs
    #[inline]
    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocate a PID with a fresh exit record
    pub fn create(&self) -> PidResult<Pid> {
        let mut state = self.state.lock();

        let pid = if let Some(pid) = state.recycled.pop_first() {
            pid
        } else if state.next_fresh <= self.config.max_pid {
            let pid = state.next_fresh;
            state.next_fresh += 1;
            pid
        } else {
            return Err(ProcessError::ResourceExhausted {
                in_use: state.records.len(),
                capacity: self.config.capacity(),
            });
        };

        state.records.insert(pid, ExitRecord::new());
        debug!(pid, in_use = state.records.len(), "PID allocated");
        Ok(pid)
    }

    /// Release a PID and its completion signal
    ///
    /// Must not be called while a thread may still `wait` on `pid`.
    pub fn destroy(&self, pid: Pid) -> PidResult<()> {
        let mut state = self.state.lock();
        state
            .records
            .remove(&pid)
            .ok_or(ProcessError::NotFound(pid))?;

        // Keep `recycled` limited to PIDs below the fresh watermark
        if pid + 1 == state.next_fresh {
            state.next_fresh = pid;
            while let Some(&top) = state.recycled.last() {
                if top + 1 != state.next_fresh {
                    break;
                }
                state.recycled.pop_last();
                state.next_fresh = top;
            }
        } else {
            state.recycled.insert(pid);
        }

        debug!(pid, in_use = state.records.len(), "PID released");
        Ok(())
    }

    #[inline]
    pub fn exists(&self, pid: Pid) -> bool {
        self.state.lock().records.contains_key(&pid)
    }

    pub fn set_parent(&self, pid: Pid, parent: Pid) -> PidResult<()> {
        self.state.lock().record_mut(pid)?.parent = Some(parent);
        Ok(())
    }

    pub fn get_parent(&self, pid: Pid) -> PidResult<Option<Pid>> {
        Ok(self.state.lock().record(pid)?.parent)
    }

    /// Store the exit code; rejected once the exit has been published
    pub fn set_exit_code(&self, pid: Pid, code: ExitCode) -> PidResult<()> {
        let mut state = self.state.lock();
        let record = state.record_mut(pid)?;
        if record.exited {
            return Err(ProcessError::AlreadyExited(pid));
        }
        record.exit_code = code;
        Ok(())
    }

    /// Exit code last stored for `pid`
    ///
    /// Only meaningful once the caller has observed termination.
    pub fn get_exit_code(&self, pid: Pid) -> PidResult<ExitCode> {
        Ok(self.state.lock().record(pid)?.exit_code)
    }

    /// Mark `pid` terminated; the flag only ever goes false → true
    ///
    /// Waiters are not released until the completion signal fires.
    pub fn set_exited(&self, pid: Pid) -> PidResult<()> {
        let mut state = self.state.lock();
        let record = state.record_mut(pid)?;
        if record.exited {
            return Err(ProcessError::AlreadyExited(pid));
        }
        record.exited = true;
        Ok(())
    }

    pub fn get_exited(&self, pid: Pid) -> PidResult<bool> {
        Ok(self.state.lock().record(pid)?.exited)
    }

    /// Completion signal released when `pid` publishes its exit
    pub fn completion(&self, pid: Pid) -> PidResult<Arc<CompletionSignal>> {
        Ok(Arc::clone(&self.state.lock().record(pid)?.completion))
    }

    /// Store the exit code, mark the process exited, then release waiters
    pub fn publish_exit(&self, pid: Pid, code: ExitCode) -> PidResult<()> {
        let completion = {
            let mut state = self.state.lock();
            let record = state.record_mut(pid)?;
            if record.exited {
                return Err(ProcessError::AlreadyExited(pid));
            }
            record.exit_code = code;
            record.exited = true;
            Arc::clone(&record.completion)
        };

        completion.complete();
        trace!(pid, code, "Exit published");
        Ok(())
    }

    /// Block until `pid` publishes its exit; returns the exit code
    pub fn wait(&self, pid: Pid) -> PidResult<ExitCode> {
        let completion = self.completion(pid)?;
        completion.wait();
        self.get_exit_code(pid)
    }

    /// PIDs whose recorded parent is `parent`
    pub fn children(&self, parent: Pid) -> Vec<Pid> {
        let state = self.state.lock();
        let mut children: Vec<Pid> = state
            .records
            .iter()
            .filter(|(_, record)| record.parent == Some(parent))
            .map(|(pid, _)| *pid)
            .collect();
        children.sort_unstable();
        children
    }

    /// Detach the children of an exiting `parent`
    ///
    /// Exited children can no longer be waited for and are destroyed;
    /// running ones lose their parent and are destroyed when they exit.
    pub fn reparent_children(&self, parent: Pid) -> Reparented {
        let mut outcome = Reparented::default();
        for child in self.children(parent) {
            let exited = {
                let mut state = self.state.lock();
                match state.records.get_mut(&child) {
                    Some(record) if record.parent == Some(parent) => {
                        if !record.exited {
                            record.parent = None;
                        }
                        record.exited
                    }
                    _ => continue,
                }
            };

            if exited {
                if self.destroy(child).is_ok() {
                    outcome.reaped.push(child);
                }
            } else {
                outcome.orphaned.push(child);
            }
        }
        outcome
    }
}

impl Default for PidTable {
    fn default() -> Self {
        Self::new(PidTableConfig::default())
    }
}
