/*!
 * Completion Signal
 *
 * One-shot broadcast event. Any number of threads may wait; a single
 * `complete` releases all of them, and waits issued after completion return
 * immediately.
 */

use super::monitor::Monitor;

#[derive(Debug, Default)]
struct CompletionState {
    done: bool,
    waiters: usize,
}

/// One-shot completion event built on a [`Monitor`]
#[derive(Default)]
pub struct CompletionSignal {
    inner: Monitor<CompletionState>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the event complete and wake every waiter
    ///
    /// Returns false if the event had already completed.
    pub fn complete(&self) -> bool {
        let first = {
            let mut state = self.inner.lock();
            let first = !state.done;
            state.done = true;
            first
        };
        self.inner.notify_all();
        first
    }

    /// Block until the event completes
    pub fn wait(&self) {
        let mut state = self.inner.lock();
        state.waiters += 1;
        self.inner.wait_while(&mut state, |s| !s.done);
        state.waiters -= 1;
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.inner.lock().done
    }

    /// Threads currently parked in [`wait`](Self::wait)
    #[inline]
    pub fn waiters(&self) -> usize {
        self.inner.lock().waiters
    }
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("CompletionSignal")
            .field("done", &state.done)
            .field("waiters", &state.waiters)
            .finish()
    }
}
