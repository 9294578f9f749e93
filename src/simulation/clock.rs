/*!
 * Clock Driver
 *
 * Sole writer of the global tick. Closes each tick by charging wait time,
 * auditing the shared state, advancing the counter, and declaring
 * termination once the horizon is reached or every process has finished.
 */

use super::actor::Actor;
use super::config::{Pacing, SimConfig};
use crate::core::types::{SimResult, Tick};
use crate::scheduler::{SchedulerState, Turn};
use std::time::Duration;
use tracing::{info, trace};

pub struct ClockDriver {
    horizon: Tick,
    pacing: Pacing,
}

impl ClockDriver {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            horizon: config.horizon,
            pacing: config.pacing,
        }
    }
}

impl Actor for ClockDriver {
    fn name(&self) -> String {
        "clock".to_string()
    }

    fn owns(&self, turn: Turn) -> bool {
        turn == Turn::Advance
    }

    fn pace(&self) -> Option<Duration> {
        match self.pacing {
            Pacing::Lockstep => None,
            Pacing::Interval(interval) => Some(interval),
        }
    }

    /// Close the current tick
    ///
    /// Wait is charged only to processes that were ready for the whole tick
    /// (`Ready { since <= tick }`), not to every process that is ready at
    /// this moment. A process requeued during the tick starts waiting on
    /// the next one.
    fn act(&mut self, state: &mut SchedulerState) -> SimResult<()> {
        let charged = state.charge_waiting();
        state.audit()?;
        let tick = state.advance_tick()?;

        trace!(
            tick,
            charged,
            ready = state.ready_len(),
            blocked = state.blocked_len(),
            "Tick advanced"
        );

        if tick >= self.horizon {
            info!(tick, horizon = self.horizon, "Horizon reached");
            state.terminate();
        } else if state.all_terminated() {
            info!(tick, "Every process terminated");
            state.terminate();
        }
        Ok(())
    }
}
