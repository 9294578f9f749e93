/*!
 * Core Executor
 *
 * One instance per core. On its dispatch turn an idle core pops the ready
 * head; on its execute turn a busy core performs exactly one tick of work
 * and settles the slice:
 *
 * - burst1 draining to zero on a blocking process ends the slice early and
 *   parks the process in the blocked queue, even for a zero block duration
 * - draining the last burst ends the slice early with Terminated
 * - using up the quantum preempts the process to the ready tail
 */

use super::actor::Actor;
use crate::core::types::{CoreId, ProcessId, SimResult, Tick};
use crate::process::Process;
use crate::scheduler::{SchedulerState, Turn};
use tracing::debug;

/// Process currently owned by a core and the ticks it has used so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slice {
    pid: ProcessId,
    used: Tick,
}

/// How one tick of work leaves the current slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceEnd {
    Continue,
    Preempted,
    Blocked { duration: Tick },
    Terminated { completion: Tick },
}

pub struct CoreExecutor {
    core: CoreId,
    quantum: Tick,
    slice: Option<Slice>,
}

impl CoreExecutor {
    pub fn new(core: CoreId, quantum: Tick) -> Self {
        Self {
            core,
            quantum,
            slice: None,
        }
    }

    pub fn core(&self) -> CoreId {
        self.core
    }

    /// Process occupying this core, if any
    pub fn current(&self) -> Option<ProcessId> {
        self.slice.map(|s| s.pid)
    }

    fn dispatch(&mut self, state: &mut SchedulerState) -> SimResult<()> {
        if self.slice.is_some() {
            return Ok(());
        }
        if let Some(pid) = state.dequeue_ready(self.core)? {
            self.slice = Some(Slice { pid, used: 0 });
            debug!(
                core = self.core,
                process = state.process(pid).map(Process::id).unwrap_or_default(),
                tick = state.tick(),
                "Dispatched"
            );
        }
        Ok(())
    }

    fn execute(&mut self, state: &mut SchedulerState) -> SimResult<()> {
        let Some(mut slice) = self.slice else {
            return Ok(());
        };
        let tick = state.tick();
        let process = state.running_mut(slice.pid, self.core)?;

        let end = if process.burst1_remaining() > 0 {
            slice.used += 1;
            let left = process.consume_burst1(tick)?;
            let spec = process.spec();
            if left == 0 && spec.blocks {
                SliceEnd::Blocked {
                    duration: spec.block_duration,
                }
            } else {
                settle(process, slice.used, self.quantum, tick)
            }
        } else if process.burst2_remaining() > 0 {
            slice.used += 1;
            process.consume_burst2(tick)?;
            settle(process, slice.used, self.quantum, tick)
        } else {
            // Nothing left to run: the tick passes without CPU work
            SliceEnd::Terminated { completion: tick + 1 }
        };

        let id = process.id().to_string();
        match end {
            SliceEnd::Continue => {}
            SliceEnd::Preempted => {
                state.enqueue_ready(slice.pid)?;
                debug!(core = self.core, process = %id, tick, used = slice.used, "Quantum expired; preempted");
            }
            SliceEnd::Blocked { duration } => {
                state.enqueue_blocked(slice.pid, duration)?;
                debug!(core = self.core, process = %id, tick, duration, "Blocked");
            }
            SliceEnd::Terminated { completion } => {
                state.finish(slice.pid, completion)?;
                debug!(core = self.core, process = %id, completion, "Terminated");
            }
        }

        self.slice = match end {
            SliceEnd::Continue => Some(slice),
            _ => None,
        };
        Ok(())
    }
}

/// End-of-tick decision after a unit of work that did not block
fn settle(process: &Process, used: Tick, quantum: Tick, tick: Tick) -> SliceEnd {
    if process.work_exhausted() {
        SliceEnd::Terminated { completion: tick + 1 }
    } else if used >= quantum {
        SliceEnd::Preempted
    } else {
        SliceEnd::Continue
    }
}

impl Actor for CoreExecutor {
    fn name(&self) -> String {
        format!("core-{}", self.core)
    }

    fn owns(&self, turn: Turn) -> bool {
        matches!(turn, Turn::Dispatch(core) | Turn::Execute(core) if core == self.core)
    }

    fn act(&mut self, state: &mut SchedulerState) -> SimResult<()> {
        match state.turn() {
            Turn::Dispatch(_) => self.dispatch(state),
            Turn::Execute(_) => self.execute(state),
            _ => Ok(()),
        }
    }
}
