/*!
 * Process Types
 * Process descriptors, lifecycle state, and per-process accounting
 */

use crate::core::serde::flag;
use crate::core::types::{CoreId, SimResult, Tick};
use crate::core::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable process descriptor as handed to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub id: String,
    pub arrival: Tick,
    pub burst1: Tick,
    #[serde(with = "flag", default)]
    pub blocks: bool,
    #[serde(default)]
    pub block_duration: Tick,
    #[serde(default)]
    pub burst2: Tick,
}

impl ProcessSpec {
    /// Single-burst process that never blocks
    pub fn new(id: impl Into<String>, arrival: Tick, burst1: Tick) -> Self {
        Self {
            id: id.into(),
            arrival,
            burst1,
            blocks: false,
            block_duration: 0,
            burst2: 0,
        }
    }

    /// Block for `duration` ticks once burst1 completes
    pub fn with_block(mut self, duration: Tick) -> Self {
        self.blocks = true;
        self.block_duration = duration;
        self
    }

    pub fn with_burst2(mut self, burst2: Tick) -> Self {
        self.burst2 = burst2;
        self
    }

    /// Total CPU ticks the process needs to finish
    pub fn total_work(&self) -> Tick {
        self.burst1 + self.burst2
    }

    /// Ticks the process actually spends blocked on its way to completion
    ///
    /// The block phase is entered only when burst1 drains to zero on a core,
    /// so an empty burst1 never blocks. A zero duration still costs the tick
    /// the waiter needs to release the process.
    pub fn effective_block(&self) -> Tick {
        if self.blocks && self.burst1 > 0 {
            self.block_duration.max(1)
        } else {
            0
        }
    }
}

/// Process lifecycle state; each variant carries only what that state needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProcessState {
    /// Arrival tick not reached yet
    Pending,
    /// Queued for a core since the given tick
    Ready { since: Tick },
    /// Occupying a core
    Running { core: CoreId },
    /// Waiting out its block phase
    Blocked { remaining: Tick },
    /// Finished; absorbing
    Terminated { completion: Tick },
}

impl ProcessState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready { .. } => "ready",
            Self::Running { .. } => "running",
            Self::Blocked { .. } => "blocked",
            Self::Terminated { .. } => "terminated",
        }
    }

    /// Whether moving from `self` to `to` is a legal lifecycle step
    pub fn can_transition(&self, to: &ProcessState) -> bool {
        use ProcessState::*;
        match (self, to) {
            (Pending, Ready { .. }) => true,
            (Ready { .. }, Running { .. }) => true,
            (Running { .. }, Ready { .. } | Blocked { .. } | Terminated { .. }) => true,
            (Blocked { remaining: from }, Blocked { remaining: to }) => to < from,
            (Blocked { remaining: 0 }, Ready { .. }) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready { since } => write!(f, "ready(since {})", since),
            Self::Running { core } => write!(f, "running(core {})", core),
            Self::Blocked { remaining } => write!(f, "blocked({} left)", remaining),
            Self::Terminated { completion } => write!(f, "terminated(at {})", completion),
        }
    }
}

/// Mutable process record held in the scheduler registry
///
/// Only the shared scheduler state hands out `&mut Process`, so every
/// mutation happens under the monitor lock.
#[derive(Debug, Clone)]
pub struct Process {
    spec: ProcessSpec,
    burst1_remaining: Tick,
    burst2_remaining: Tick,
    state: ProcessState,
    wait_ticks: Tick,
    cpu_ticks: Tick,
    context_switches: u32,
    admitted_at: Option<Tick>,
}

impl Process {
    pub fn new(spec: ProcessSpec) -> Self {
        Self {
            burst1_remaining: spec.burst1,
            burst2_remaining: spec.burst2,
            spec,
            state: ProcessState::Pending,
            wait_ticks: 0,
            cpu_ticks: 0,
            context_switches: 0,
            admitted_at: None,
        }
    }

    #[inline]
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.spec.id
    }

    #[inline]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn burst1_remaining(&self) -> Tick {
        self.burst1_remaining
    }

    pub fn burst2_remaining(&self) -> Tick {
        self.burst2_remaining
    }

    pub fn wait_ticks(&self) -> Tick {
        self.wait_ticks
    }

    pub fn cpu_ticks(&self) -> Tick {
        self.cpu_ticks
    }

    pub fn context_switches(&self) -> u32 {
        self.context_switches
    }

    pub fn admitted_at(&self) -> Option<Tick> {
        self.admitted_at
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, ProcessState::Terminated { .. })
    }

    pub fn completion(&self) -> Option<Tick> {
        match self.state {
            ProcessState::Terminated { completion } => Some(completion),
            _ => None,
        }
    }

    /// Both bursts drained
    pub fn work_exhausted(&self) -> bool {
        self.burst1_remaining == 0 && self.burst2_remaining == 0
    }

    /// Move to `to`, rejecting any step outside the lifecycle graph
    pub(crate) fn transition(&mut self, to: ProcessState, tick: Tick) -> SimResult<()> {
        if !self.state.can_transition(&to) {
            return Err(SimError::invariant(
                tick,
                format!(
                    "process {} cannot move from {} to {}",
                    self.spec.id, self.state, to
                ),
            ));
        }
        if matches!(to, ProcessState::Ready { .. }) && self.admitted_at.is_none() {
            self.admitted_at = Some(tick);
        }
        if matches!(to, ProcessState::Running { .. }) {
            self.context_switches += 1;
        }
        self.state = to;
        Ok(())
    }

    /// Spend one tick of burst1; returns what is left
    pub(crate) fn consume_burst1(&mut self, tick: Tick) -> SimResult<Tick> {
        self.burst1_remaining = self.burst1_remaining.checked_sub(1).ok_or_else(|| {
            SimError::invariant(tick, format!("process {} burst1 underflow", self.spec.id))
        })?;
        self.cpu_ticks += 1;
        Ok(self.burst1_remaining)
    }

    /// Spend one tick of burst2; returns what is left
    pub(crate) fn consume_burst2(&mut self, tick: Tick) -> SimResult<Tick> {
        self.burst2_remaining = self.burst2_remaining.checked_sub(1).ok_or_else(|| {
            SimError::invariant(tick, format!("process {} burst2 underflow", self.spec.id))
        })?;
        self.cpu_ticks += 1;
        Ok(self.burst2_remaining)
    }

    #[inline]
    pub(crate) fn record_wait(&mut self) {
        self.wait_ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(p: &mut Process) {
        p.transition(ProcessState::Ready { since: 0 }, 0).unwrap();
        p.transition(ProcessState::Running { core: 0 }, 0).unwrap();
    }

    #[test]
    fn test_new_process_is_pending_with_full_counters() {
        let p = Process::new(ProcessSpec::new("P1", 2, 5).with_burst2(3));
        assert_eq!(p.state(), ProcessState::Pending);
        assert_eq!(p.burst1_remaining(), 5);
        assert_eq!(p.burst2_remaining(), 3);
        assert_eq!(p.admitted_at(), None);
    }

    #[test]
    fn test_dispatch_counts_context_switch() {
        let mut p = Process::new(ProcessSpec::new("P1", 0, 5));
        running(&mut p);
        assert_eq!(p.context_switches(), 1);
        assert_eq!(p.admitted_at(), Some(0));

        p.transition(ProcessState::Ready { since: 4 }, 3).unwrap();
        p.transition(ProcessState::Running { core: 1 }, 4).unwrap();
        assert_eq!(p.context_switches(), 2);
        // Admission tick is the first time the process became ready
        assert_eq!(p.admitted_at(), Some(0));
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let mut p = Process::new(ProcessSpec::new("P1", 0, 1));
        running(&mut p);
        p.transition(ProcessState::Terminated { completion: 1 }, 0)
            .unwrap();

        let err = p
            .transition(ProcessState::Ready { since: 1 }, 1)
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(p.is_terminated());
    }

    #[test]
    fn test_pending_cannot_run_directly() {
        let mut p = Process::new(ProcessSpec::new("P1", 0, 1));
        assert!(p.transition(ProcessState::Running { core: 0 }, 0).is_err());
    }

    #[test]
    fn test_blocked_countdown_only_decreases() {
        let from = ProcessState::Blocked { remaining: 3 };
        assert!(from.can_transition(&ProcessState::Blocked { remaining: 2 }));
        assert!(!from.can_transition(&ProcessState::Blocked { remaining: 3 }));
        assert!(!from.can_transition(&ProcessState::Ready { since: 0 }));
        assert!(ProcessState::Blocked { remaining: 0 }
            .can_transition(&ProcessState::Ready { since: 0 }));
    }

    #[test]
    fn test_burst_underflow_is_invariant_violation() {
        let mut p = Process::new(ProcessSpec::new("P1", 0, 1));
        assert_eq!(p.consume_burst1(0).unwrap(), 0);
        assert_eq!(p.cpu_ticks(), 1);
        assert!(p.consume_burst1(1).is_err());
        assert!(p.consume_burst2(1).is_err());
        assert_eq!(p.cpu_ticks(), 1);
    }

    #[test]
    fn test_effective_block() {
        assert_eq!(ProcessSpec::new("a", 0, 2).with_block(3).effective_block(), 3);
        assert_eq!(ProcessSpec::new("b", 0, 0).with_block(3).effective_block(), 0);
        assert_eq!(ProcessSpec::new("c", 0, 2).effective_block(), 0);
        assert_eq!(ProcessSpec::new("d", 0, 2).with_block(0).effective_block(), 1);
    }
}
