/*!
 * Arrival Dispatcher
 * Admits pending processes into the ready queue once their arrival tick is reached
 */

use super::actor::Actor;
use crate::core::types::{ProcessId, SimResult, Tick};
use crate::process::Process;
use crate::scheduler::{SchedulerState, Signal, Turn};
use std::collections::VecDeque;
use tracing::debug;

pub struct ArrivalDispatcher {
    /// (arrival, slot), ascending by arrival; ties keep input order
    pending: VecDeque<(Tick, ProcessId)>,
}

impl ArrivalDispatcher {
    pub fn new(processes: &[Process]) -> Self {
        let mut pending: Vec<(Tick, ProcessId)> = processes
            .iter()
            .enumerate()
            .map(|(pid, p)| (p.spec().arrival, pid))
            .collect();
        // Stable sort so equal arrivals are admitted in input order
        pending.sort_by_key(|&(arrival, _)| arrival);
        Self {
            pending: pending.into(),
        }
    }

    /// Processes whose arrival tick has not been reached yet
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Arrival tick of the next pending process
    pub fn next_arrival(&self) -> Option<Tick> {
        self.pending.front().map(|&(arrival, _)| arrival)
    }
}

impl Actor for ArrivalDispatcher {
    fn name(&self) -> String {
        "dispatcher".to_string()
    }

    fn owns(&self, turn: Turn) -> bool {
        turn == Turn::Admit
    }

    fn signal(&self) -> Signal {
        Signal::TickAdvanced
    }

    fn act(&mut self, state: &mut SchedulerState) -> SimResult<()> {
        let tick = state.tick();
        while let Some(&(arrival, pid)) = self.pending.front() {
            if arrival > tick {
                break;
            }
            self.pending.pop_front();
            state.admit(pid)?;
            debug!(
                process = state.process(pid).map(Process::id).unwrap_or_default(),
                tick,
                "Process arrived"
            );
        }
        Ok(())
    }
}
