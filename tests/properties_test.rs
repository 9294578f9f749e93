/*!
 * Property Tests
 * Scheduling invariants over randomly generated workloads
 */

use proptest::prelude::*;
use rr_core_sim::process::ProcessState;
use rr_core_sim::{ProcessSpec, ProcessStatus, SimConfig, Simulation};

fn spec_strategy() -> impl Strategy<Value = (u64, u64, bool, u64, u64)> {
    (0u64..10, 0u64..8, any::<bool>(), 0u64..4, 0u64..6)
}

fn workload_strategy() -> impl Strategy<Value = Vec<ProcessSpec>> {
    prop::collection::vec(spec_strategy(), 0..7).prop_map(|records| {
        records
            .into_iter()
            .enumerate()
            .map(|(i, (arrival, burst1, blocks, block_duration, burst2))| ProcessSpec {
                id: format!("P{}", i),
                arrival,
                burst1,
                blocks,
                block_duration,
                burst2,
            })
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = SimConfig> {
    (0u64..40, 1u64..6, 1usize..4).prop_map(|(horizon, quantum, cores)| {
        SimConfig::new(horizon, quantum, cores)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_state_stays_consistent_every_tick(
        config in config_strategy(),
        workload in workload_strategy(),
    ) {
        let sim = Simulation::new(config, workload).unwrap();
        let mut stepper = sim.stepper();
        let mut previous: Vec<(u64, u64, u32)> = stepper
            .state()
            .processes()
            .iter()
            .map(|p| (p.wait_ticks(), p.cpu_ticks(), p.context_switches()))
            .collect();

        while stepper.step().unwrap() {
            let state = stepper.state();
            prop_assert!(state.audit().is_ok());
            prop_assert!(state.tick() <= config.horizon);

            let running = state
                .processes()
                .iter()
                .filter(|p| matches!(p.state(), ProcessState::Running { .. }))
                .count();
            prop_assert!(running <= config.cores);

            for (p, prev) in state.processes().iter().zip(previous.iter_mut()) {
                let now = (p.wait_ticks(), p.cpu_ticks(), p.context_switches());
                prop_assert!(now.0 >= prev.0 && now.1 >= prev.1 && now.2 >= prev.2);
                prop_assert!(p.cpu_ticks() <= p.spec().total_work());
                prop_assert_eq!(
                    p.burst1_remaining() + p.burst2_remaining() + p.cpu_ticks(),
                    p.spec().total_work()
                );
                if let Some(admitted) = p.admitted_at() {
                    prop_assert!(p.wait_ticks() + p.cpu_ticks() <= state.tick() - admitted);
                } else {
                    prop_assert_eq!(now, (0, 0, 0));
                }
                *prev = now;
            }
        }
        prop_assert!(stepper.is_finished());
    }

    #[test]
    fn prop_completed_processes_account_for_every_tick(
        config in config_strategy(),
        workload in workload_strategy(),
    ) {
        let sim = Simulation::new(config, workload).unwrap();
        let report = sim.stepper().run().unwrap();

        for (entry, spec) in report.processes.iter().zip(sim.workload()) {
            match entry.status {
                ProcessStatus::Completed => {
                    let turnaround = entry.turnaround.unwrap();
                    prop_assert_eq!(entry.cpu_ticks, spec.total_work());
                    // A final dispatch with nothing left to run spends one tick idle
                    let idle = u64::from(spec.burst2 == 0 && (spec.burst1 == 0 || spec.blocks));
                    prop_assert_eq!(
                        turnaround,
                        entry.wait_ticks + entry.cpu_ticks + spec.effective_block() + idle
                    );
                    let min_switches = spec.total_work().div_ceil(config.quantum).max(1);
                    prop_assert!(u64::from(entry.context_switches) >= min_switches);
                    // Only a final dispatch with nothing left to run consumes no tick
                    prop_assert!(u64::from(entry.context_switches) <= entry.cpu_ticks + 1);
                    prop_assert!(entry.completion_tick.unwrap() <= report.final_tick);
                }
                ProcessStatus::NeverStarted => {
                    prop_assert!(spec.arrival >= report.final_tick);
                    prop_assert_eq!(entry.turnaround, None);
                    prop_assert_eq!(entry.cpu_ticks, 0);
                    prop_assert_eq!(entry.wait_ticks, 0);
                }
                ProcessStatus::NeverCompleted => {
                    prop_assert_eq!(entry.turnaround, None);
                    prop_assert_eq!(report.final_tick, config.horizon);
                }
            }
        }
    }

    #[test]
    fn prop_threaded_matches_stepped(
        config in config_strategy(),
        workload in workload_strategy(),
    ) {
        let sim = Simulation::new(config, workload).unwrap();
        prop_assert_eq!(sim.run().unwrap(), sim.stepper().run().unwrap());
    }
}
