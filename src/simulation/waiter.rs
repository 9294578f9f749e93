/*!
 * Blocked Waiter
 *
 * Once per tick, counts down every blocked process (not only the queue head)
 * and returns the expired ones to the ready tail in blocked-queue order.
 */

use super::actor::Actor;
use crate::core::types::SimResult;
use crate::process::Process;
use crate::scheduler::{SchedulerState, Turn};
use tracing::debug;

#[derive(Debug, Default)]
pub struct BlockedWaiter {
    released: u64,
}

impl BlockedWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes returned to the ready queue so far
    pub fn released(&self) -> u64 {
        self.released
    }
}

impl Actor for BlockedWaiter {
    fn name(&self) -> String {
        "blocked-waiter".to_string()
    }

    fn owns(&self, turn: Turn) -> bool {
        turn == Turn::Unblock
    }

    fn act(&mut self, state: &mut SchedulerState) -> SimResult<()> {
        if state.blocked_len() == 0 {
            return Ok(());
        }

        let tick = state.tick();
        for pid in state.countdown_blocked()? {
            state.enqueue_ready(pid)?;
            self.released += 1;
            debug!(
                process = state.process(pid).map(Process::id).unwrap_or_default(),
                tick,
                "Block expired; back to ready queue"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessSpec, ProcessState};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_blocked_process_advances_each_tick() {
        let specs = vec![
            ProcessSpec::new("A", 0, 1).with_block(2),
            ProcessSpec::new("B", 0, 1).with_block(2),
            ProcessSpec::new("C", 0, 1).with_block(1),
        ];
        let mut state = SchedulerState::new(specs, 10, 3);
        for pid in 0..3 {
            state.admit(pid).unwrap();
        }
        for core in 0..3 {
            let pid = state.dequeue_ready(core).unwrap().unwrap();
            let duration = state.process(pid).unwrap().spec().block_duration;
            state.enqueue_blocked(pid, duration).unwrap();
        }
        state.advance_tick().unwrap();

        let mut waiter = BlockedWaiter::new();
        waiter.act(&mut state).unwrap();
        // The head-only variant would have left B and C untouched
        assert_eq!(
            state.process(1).unwrap().state(),
            ProcessState::Blocked { remaining: 1 }
        );
        assert_eq!(state.ready_queue().collect::<Vec<_>>(), vec![2]);
        assert_eq!(state.blocked_queue().collect::<Vec<_>>(), vec![0, 1]);

        state.advance_tick().unwrap();
        waiter.act(&mut state).unwrap();
        assert_eq!(state.ready_queue().collect::<Vec<_>>(), vec![2, 0, 1]);
        assert_eq!(state.blocked_len(), 0);
        assert_eq!(waiter.released(), 3);
        assert_eq!(
            state.process(0).unwrap().state(),
            ProcessState::Ready { since: 3 }
        );
    }

    #[test]
    fn test_empty_blocked_queue_is_noop() {
        let mut state = SchedulerState::new(vec![ProcessSpec::new("A", 0, 1)], 10, 1);
        let mut waiter = BlockedWaiter::new();
        waiter.act(&mut state).unwrap();
        assert_eq!(waiter.released(), 0);
        assert_eq!(state.ready_len(), 0);
    }
}
