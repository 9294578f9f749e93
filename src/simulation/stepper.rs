/*!
 * Synchronous Stepper
 *
 * Drives the engine's actors on the calling thread, one tick per call, in
 * the same turn order the threaded engine enforces through the monitor.
 * Tests use it to observe the shared state between ticks.
 */

use super::actor::Actor;
use super::clock::ClockDriver;
use super::config::SimConfig;
use super::dispatcher::ArrivalDispatcher;
use super::engine::Assembly;
use super::executor::CoreExecutor;
use super::report::SimulationReport;
use super::waiter::BlockedWaiter;
use crate::core::types::{SimResult, Tick};
use crate::scheduler::{SchedulerState, Turn};
use tracing::error;

pub struct Stepper {
    config: SimConfig,
    state: SchedulerState,
    clock: ClockDriver,
    dispatcher: ArrivalDispatcher,
    waiter: BlockedWaiter,
    executors: Vec<CoreExecutor>,
}

impl Stepper {
    pub(crate) fn new(config: SimConfig, assembly: Assembly) -> Self {
        Self {
            config,
            state: assembly.state,
            clock: assembly.clock,
            dispatcher: assembly.dispatcher,
            waiter: assembly.waiter,
            executors: assembly.executors,
        }
    }

    /// Shared state as of the last completed step
    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn tick(&self) -> Tick {
        self.state.tick()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminated()
    }

    /// Run every turn of the current tick, ending with the clock advance
    ///
    /// Returns `Ok(false)` once the simulation has terminated.
    pub fn step(&mut self) -> SimResult<bool> {
        while !self.state.is_terminated() {
            let turn = self.state.turn();
            let actor: &mut dyn Actor = match turn {
                Turn::Admit => &mut self.dispatcher,
                Turn::Unblock => &mut self.waiter,
                Turn::Advance => &mut self.clock,
                Turn::Dispatch(core) | Turn::Execute(core) => &mut self.executors[core],
            };

            if let Err(err) = actor.act(&mut self.state) {
                error!(turn = ?turn, error = %err, "Turn failed; stopping simulation");
                self.state.fail(err.clone());
                return Err(err);
            }
            self.state.pass_turn();

            if turn == Turn::Advance {
                break;
            }
        }
        Ok(!self.state.is_terminated())
    }

    /// Step until termination and build the report
    pub fn run(mut self) -> SimResult<SimulationReport> {
        while self.step()? {}
        Ok(SimulationReport::from_state(&self.state, &self.config))
    }

    /// Report for the state reached so far
    pub fn report(&self) -> SimulationReport {
        SimulationReport::from_state(&self.state, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessSpec, ProcessState};
    use crate::simulation::Simulation;

    #[test]
    fn test_step_advances_one_tick() {
        let sim = Simulation::new(SimConfig::new(10, 4, 1), vec![ProcessSpec::new("P1", 0, 3)])
            .unwrap();
        let mut stepper = sim.stepper();

        assert!(stepper.step().unwrap());
        assert_eq!(stepper.tick(), 1);
        assert_eq!(stepper.state().turn(), Turn::Admit);
        assert_eq!(
            stepper.state().process(0).unwrap().state(),
            ProcessState::Running { core: 0 }
        );
        assert_eq!(stepper.state().process(0).unwrap().burst1_remaining(), 2);
    }

    #[test]
    fn test_step_after_finish_is_noop() {
        let sim = Simulation::new(SimConfig::new(2, 4, 1), vec![ProcessSpec::new("P1", 0, 5)])
            .unwrap();
        let mut stepper = sim.stepper();
        assert!(stepper.step().unwrap());
        assert!(!stepper.step().unwrap());
        assert!(!stepper.step().unwrap());
        assert_eq!(stepper.tick(), 2);
        assert!(stepper.is_finished());
    }
}
