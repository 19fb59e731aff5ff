/*!
 * Monitor
 *
 * Lock + condition variable pair over a piece of shared state.
 *
 * Callers lock the state, evaluate a predicate, and park on the condvar while
 * the predicate says they are blocked. Parking atomically releases the lock
 * and reacquires it on wake; the predicate is always re-evaluated afterwards,
 * since a condition that held when the wakeup was issued may no longer hold.
 */

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Shared state guarded by a mutex with an associated condvar
pub struct Monitor<T> {
    state: Mutex<T>,
    cond: Condvar,
}

impl<T> Monitor<T> {
    /// Create a monitor around the initial state
    pub fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
            cond: Condvar::new(),
        }
    }

    /// Acquire the monitor lock
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock()
    }

    /// Park until `blocked` returns false
    ///
    /// `blocked` runs with the lock held, once before parking and again after
    /// every wake. Returns how many times the caller actually parked.
    pub fn wait_while<F>(&self, guard: &mut MutexGuard<'_, T>, mut blocked: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut parked = 0;
        while blocked(&mut *guard) {
            parked += 1;
            self.cond.wait(guard);
        }
        parked
    }

    /// Wake one parked thread
    #[inline]
    pub fn notify_one(&self) -> bool {
        self.cond.notify_one()
    }

    /// Wake every parked thread; returns the number woken
    #[inline]
    pub fn notify_all(&self) -> usize {
        self.cond.notify_all()
    }
}

impl<T: Default> Default for Monitor<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
