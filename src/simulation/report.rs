/*!
 * Simulation Report
 * Per-process outcome records aggregated from the final scheduler state
 */

use super::config::SimConfig;
use crate::core::serde::{is_none, is_zero_u64};
use crate::core::types::Tick;
use crate::process::{Process, ProcessState};
use crate::scheduler::SchedulerState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal report state of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// Reached Terminated before the horizon
    Completed,
    /// Arrival tick never reached; never entered the ready queue
    NeverStarted,
    /// Admitted but still ready, running or blocked at the horizon
    NeverCompleted,
}

impl ProcessStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NeverStarted => "never_started",
            Self::NeverCompleted => "never_completed",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub id: String,
    pub arrival: Tick,
    pub status: ProcessStatus,
    pub wait_ticks: Tick,
    /// completion − arrival; only for completed processes
    #[serde(default, skip_serializing_if = "is_none")]
    pub turnaround: Option<Tick>,
    #[serde(default, skip_serializing_if = "is_none")]
    pub completion_tick: Option<Tick>,
    pub cpu_ticks: Tick,
    pub context_switches: u32,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub burst1_remaining: Tick,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub burst2_remaining: Tick,
}

impl ProcessReport {
    pub fn from_process(process: &Process) -> Self {
        let spec = process.spec();
        let status = match process.state() {
            ProcessState::Terminated { .. } => ProcessStatus::Completed,
            ProcessState::Pending => ProcessStatus::NeverStarted,
            _ => ProcessStatus::NeverCompleted,
        };
        let completion_tick = process.completion();

        Self {
            id: spec.id.clone(),
            arrival: spec.arrival,
            status,
            wait_ticks: process.wait_ticks(),
            turnaround: completion_tick.map(|c| c.saturating_sub(spec.arrival)),
            completion_tick,
            cpu_ticks: process.cpu_ticks(),
            context_switches: process.context_switches(),
            burst1_remaining: process.burst1_remaining(),
            burst2_remaining: process.burst2_remaining(),
        }
    }
}

/// Aggregates over all processes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub completed: usize,
    pub never_started: usize,
    pub never_completed: usize,
    /// Mean over completed processes
    #[serde(default, skip_serializing_if = "is_none")]
    pub mean_wait: Option<f64>,
    #[serde(default, skip_serializing_if = "is_none")]
    pub mean_turnaround: Option<f64>,
}

impl Summary {
    fn from_reports(reports: &[ProcessReport]) -> Self {
        let count = |status: ProcessStatus| reports.iter().filter(|r| r.status == status).count();
        let completed: Vec<&ProcessReport> = reports
            .iter()
            .filter(|r| r.status == ProcessStatus::Completed)
            .collect();
        let mean = |values: Vec<Tick>| {
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<Tick>() as f64 / values.len() as f64)
            }
        };

        Self {
            completed: completed.len(),
            never_started: count(ProcessStatus::NeverStarted),
            never_completed: count(ProcessStatus::NeverCompleted),
            mean_wait: mean(completed.iter().map(|r| r.wait_ticks).collect()),
            mean_turnaround: mean(completed.iter().filter_map(|r| r.turnaround).collect()),
        }
    }
}

/// Final result of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Tick at which termination was declared
    pub final_tick: Tick,
    pub config: SimConfig,
    /// One entry per process, in input order
    pub processes: Vec<ProcessReport>,
    pub summary: Summary,
}

impl SimulationReport {
    pub fn from_state(state: &SchedulerState, config: &SimConfig) -> Self {
        let processes: Vec<ProcessReport> = state
            .processes()
            .iter()
            .map(ProcessReport::from_process)
            .collect();
        let summary = Summary::from_reports(&processes);
        Self {
            final_tick: state.tick(),
            config: *config,
            processes,
            summary,
        }
    }

    /// Report entry for process `id`
    pub fn process(&self, id: &str) -> Option<&ProcessReport> {
        self.processes.iter().find(|p| p.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Final results (tick {}, quantum {}, {} cores) ===",
            self.final_tick, self.config.quantum, self.config.cores
        )?;
        writeln!(
            f,
            "{:<10} {:<16} {:>6} {:>11} {:>6} {:>9}",
            "process", "status", "wait", "turnaround", "cpu", "switches"
        )?;
        for p in &self.processes {
            let turnaround = p
                .turnaround
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:<10} {:<16} {:>6} {:>11} {:>6} {:>9}",
                p.id, p.status, p.wait_ticks, turnaround, p.cpu_ticks, p.context_switches
            )?;
        }
        write!(
            f,
            "completed {}, never started {}, never completed {}",
            self.summary.completed, self.summary.never_started, self.summary.never_completed
        )?;
        if let (Some(wait), Some(turnaround)) = (self.summary.mean_wait, self.summary.mean_turnaround) {
            write!(f, "; mean wait {:.2}, mean turnaround {:.2}", wait, turnaround)?;
        }
        Ok(())
    }
}
