/*!
 * Scheduler Monitor
 *
 * One exclusive access domain around the shared state plus two broadcast
 * signals: tick-advanced and queue-changed. Waiting on either signal
 * releases the lock while suspended and reacquires it before the predicate
 * is re-checked (monitor discipline).
 */

use super::state::{SchedulerState, Turn};
use parking_lot::{Condvar, Mutex, MutexGuard};

/// Which broadcast signal a waiter sleeps on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Fired once per tick, after the clock advanced
    TickAdvanced,
    /// Fired on every enqueue, dequeue, state transition or turn hand-off
    QueueChanged,
}

/// Shared scheduler state guarded by a mutex and two condition variables
pub struct Monitor {
    state: Mutex<SchedulerState>,
    tick_advanced: Condvar,
    queue_changed: Condvar,
}

impl Monitor {
    pub fn new(state: SchedulerState) -> Self {
        Self {
            state: Mutex::new(state),
            tick_advanced: Condvar::new(),
            queue_changed: Condvar::new(),
        }
    }

    /// Enter the access domain
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock()
    }

    /// Block on `signal` until `ready` holds
    ///
    /// Spurious wakeups are absorbed by re-checking the predicate under the
    /// lock, so a notification sent before the wait started is never lost.
    pub fn wait_until<F>(&self, guard: &mut MutexGuard<'_, SchedulerState>, signal: Signal, mut ready: F)
    where
        F: FnMut(&SchedulerState) -> bool,
    {
        let condvar = match signal {
            Signal::TickAdvanced => &self.tick_advanced,
            Signal::QueueChanged => &self.queue_changed,
        };
        while !ready(&**guard) {
            condvar.wait(guard);
        }
    }

    /// Wake whoever owns the turn the state was just handed to
    ///
    /// Opening a new tick and terminating broadcast both signals; every
    /// other hand-off is a queue change.
    pub fn notify_turn(&self, state: &SchedulerState) {
        if state.is_terminated() || state.turn() == Turn::Admit {
            self.tick_advanced.notify_all();
        }
        self.queue_changed.notify_all();
    }

    /// Wake every waiter on both signals
    pub fn notify_all(&self) {
        self.tick_advanced.notify_all();
        self.queue_changed.notify_all();
    }

    /// Take the state back once every actor has exited
    pub fn into_inner(self) -> SchedulerState {
        self.state.into_inner()
    }
}
