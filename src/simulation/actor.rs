/*!
 * Simulation Actors
 *
 * Each component of the engine is an actor that owns one or more turns of
 * the tick protocol. The same actors are driven either by dedicated threads
 * through the monitor ([`drive`]) or synchronously by the stepper.
 */

use crate::core::types::SimResult;
use crate::monitoring::ActorSpan;
use crate::scheduler::{Monitor, SchedulerState, Signal, Turn};
use parking_lot::MutexGuard;
use std::thread;
use std::time::Duration;
use tracing::error;

/// A participant in the tick protocol
pub trait Actor: Send {
    /// Name used for the thread and tracing span
    fn name(&self) -> String;

    /// Whether this actor acts on `turn`
    fn owns(&self, turn: Turn) -> bool;

    /// Signal the actor sleeps on while waiting for its turn
    fn signal(&self) -> Signal {
        Signal::QueueChanged
    }

    /// Wall-clock delay taken with the lock released before acting
    fn pace(&self) -> Option<Duration> {
        None
    }

    /// Perform the work of the current turn
    ///
    /// Handing the turn on is the caller's job.
    fn act(&mut self, state: &mut SchedulerState) -> SimResult<()>;
}

/// Run `actor` against the monitor until termination
///
/// A failing turn is recorded as the simulation fault, which raises the
/// termination flag and wakes every other actor.
pub fn drive<A: Actor + ?Sized>(monitor: &Monitor, actor: &mut A) -> SimResult<()> {
    let mut span = ActorSpan::new(&actor.name());
    let _entered = span.entered();
    let mut state = monitor.lock();

    loop {
        let signal = actor.signal();
        monitor.wait_until(&mut state, signal, |s| s.is_terminated() || actor.owns(s.turn()));
        if state.is_terminated() {
            break;
        }

        if let Some(delay) = actor.pace() {
            MutexGuard::unlocked(&mut state, || thread::sleep(delay));
            if state.is_terminated() {
                break;
            }
        }

        if let Err(err) = actor.act(&mut state) {
            error!(actor = %actor.name(), error = %err, "Turn failed; stopping simulation");
            state.fail(err.clone());
            drop(state);
            monitor.notify_all();
            return Err(err);
        }

        state.pass_turn();
        monitor.notify_turn(&state);
        span.record_turn();
    }

    Ok(())
}
