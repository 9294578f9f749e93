/*!
 * Simulation Engine
 *
 * Spawns one thread per actor (clock, dispatcher, blocked waiter and one
 * executor per core) around a shared monitor and joins them into a report.
 *
 * # Determinism
 *
 * Actors take turns in a fixed order within each tick, so the final report
 * depends only on the workload and configuration, never on thread timing.
 * The same actors driven synchronously by [`Stepper`] yield the same report.
 */

use super::actor::{drive, Actor};
use super::clock::ClockDriver;
use super::config::SimConfig;
use super::dispatcher::ArrivalDispatcher;
use super::executor::CoreExecutor;
use super::report::SimulationReport;
use super::stepper::Stepper;
use super::waiter::BlockedWaiter;
use crate::core::types::SimResult;
use crate::core::SimError;
use crate::process::ProcessSpec;
use crate::scheduler::{Monitor, SchedulerState};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{error, info};

/// Fresh state plus the actors that drive it
pub(crate) struct Assembly {
    pub state: SchedulerState,
    pub clock: ClockDriver,
    pub dispatcher: ArrivalDispatcher,
    pub waiter: BlockedWaiter,
    pub executors: Vec<CoreExecutor>,
}

impl Assembly {
    fn new(config: &SimConfig, workload: &[ProcessSpec]) -> Self {
        let state = SchedulerState::new(workload.to_vec(), config.horizon, config.cores);
        let dispatcher = ArrivalDispatcher::new(state.processes());
        Self {
            clock: ClockDriver::new(config),
            dispatcher,
            waiter: BlockedWaiter::new(),
            executors: (0..config.cores)
                .map(|core| CoreExecutor::new(core, config.quantum))
                .collect(),
            state,
        }
    }
}

/// A validated workload and configuration, ready to run
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    workload: Vec<ProcessSpec>,
}

impl Simulation {
    pub fn new(config: SimConfig, workload: Vec<ProcessSpec>) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config, workload })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn workload(&self) -> &[ProcessSpec] {
        &self.workload
    }

    /// Single-threaded driver over the same actors, one tick per step
    pub fn stepper(&self) -> Stepper {
        Stepper::new(self.config, self.assemble())
    }

    pub(crate) fn assemble(&self) -> Assembly {
        Assembly::new(&self.config, &self.workload)
    }

    /// Run every actor on its own thread until termination
    pub fn run(&self) -> SimResult<SimulationReport> {
        let Assembly {
            state,
            clock,
            dispatcher,
            waiter,
            executors,
        } = self.assemble();

        info!(
            processes = self.workload.len(),
            horizon = self.config.horizon,
            quantum = self.config.quantum,
            cores = self.config.cores,
            "Simulation starting"
        );

        let mut actors: Vec<Box<dyn Actor>> =
            vec![Box::new(clock), Box::new(dispatcher), Box::new(waiter)];
        actors.extend(executors.into_iter().map(|e| Box::new(e) as Box<dyn Actor>));

        let monitor = Monitor::new(state);
        let outcomes: Vec<SimResult<()>> = thread::scope(|scope| {
            let monitor = &monitor;
            let mut handles = Vec::with_capacity(actors.len());

            for mut actor in actors {
                let name = actor.name();
                let spawned = thread::Builder::new()
                    .name(name.clone())
                    .spawn_scoped(scope, move || run_actor(monitor, actor.as_mut()));
                match spawned {
                    Ok(handle) => handles.push((name, handle)),
                    Err(e) => {
                        let err = SimError::Actor {
                            actor: name,
                            reason: format!("spawn failed: {}", e),
                        };
                        error!(error = %err, "Could not start actor thread");
                        monitor.lock().fail(err);
                        monitor.notify_all();
                        break;
                    }
                }
            }

            handles
                .into_iter()
                .map(|(name, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(SimError::Actor {
                            actor: name,
                            reason: "thread panicked".into(),
                        })
                    })
                })
                .collect()
        });

        let state = monitor.into_inner();
        if let Some(fault) = state.fault() {
            return Err(fault.clone());
        }
        if let Some(err) = outcomes.into_iter().find_map(Result::err) {
            return Err(err);
        }

        let report = SimulationReport::from_state(&state, &self.config);
        info!(
            final_tick = report.final_tick,
            completed = report.summary.completed,
            never_started = report.summary.never_started,
            never_completed = report.summary.never_completed,
            "Simulation finished"
        );
        Ok(report)
    }
}

/// Thread body: drive the actor and turn a panic into a simulation fault
///
/// parking_lot locks do not poison, so without this the remaining actors
/// would wait forever for the panicked actor's turn.
fn run_actor(monitor: &Monitor, actor: &mut dyn Actor) -> SimResult<()> {
    let name = actor.name();
    match panic::catch_unwind(AssertUnwindSafe(|| drive(monitor, actor))) {
        Ok(outcome) => outcome,
        Err(_) => {
            let err = SimError::Actor {
                actor: name,
                reason: "panicked".into(),
            };
            error!(error = %err, "Actor panicked; stopping simulation");
            monitor.lock().fail(err.clone());
            monitor.notify_all();
            Err(err)
        }
    }
}
