/*!
 * Shared Scheduler State
 * Ready/blocked queues, process registry, global clock, and turn cursor
 *
 * Every field is private; actors mutate the state only through the
 * operations below while holding the monitor lock, so each operation is
 * atomic with respect to every other actor.
 */

use crate::core::types::{CoreId, ProcessId, SimResult, Tick};
use crate::core::SimError;
use crate::process::{Process, ProcessSpec, ProcessState};
use std::collections::VecDeque;

/// Step of the per-tick protocol that currently owns the state
///
/// A tick runs `Admit`, `Dispatch(0..N)`, `Unblock`, `Execute(0..N)`,
/// then `Advance`, which opens the next tick at `Admit` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Admit,
    Dispatch(CoreId),
    Unblock,
    Execute(CoreId),
    Advance,
}

impl Turn {
    /// Turn that follows `self` on a machine with `cores` cores
    pub const fn next(self, cores: usize) -> Turn {
        match self {
            Turn::Admit => Turn::Dispatch(0),
            Turn::Dispatch(core) if core + 1 < cores => Turn::Dispatch(core + 1),
            Turn::Dispatch(_) => Turn::Unblock,
            Turn::Unblock => Turn::Execute(0),
            Turn::Execute(core) if core + 1 < cores => Turn::Execute(core + 1),
            Turn::Execute(_) => Turn::Advance,
            Turn::Advance => Turn::Admit,
        }
    }
}

/// State shared by the clock, dispatcher, waiter and core executors
#[derive(Debug)]
pub struct SchedulerState {
    tick: Tick,
    horizon: Tick,
    cores: usize,
    terminated: bool,
    turn: Turn,
    ready: VecDeque<ProcessId>,
    blocked: VecDeque<ProcessId>,
    registry: Vec<Process>,
    fault: Option<SimError>,
}

impl SchedulerState {
    /// Build the state with every process pending, in input order
    pub fn new(specs: Vec<ProcessSpec>, horizon: Tick, cores: usize) -> Self {
        Self {
            tick: 0,
            horizon,
            cores,
            terminated: horizon == 0,
            turn: Turn::Admit,
            ready: VecDeque::with_capacity(specs.len()),
            blocked: VecDeque::new(),
            registry: specs.into_iter().map(Process::new).collect(),
            fault: None,
        }
    }

    #[inline]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub fn horizon(&self) -> Tick {
        self.horizon
    }

    #[inline]
    pub fn cores(&self) -> usize {
        self.cores
    }

    #[inline]
    pub fn turn(&self) -> Turn {
        self.turn
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn fault(&self) -> Option<&SimError> {
        self.fault.as_ref()
    }

    pub fn processes(&self) -> &[Process] {
        &self.registry
    }

    pub fn process(&self, pid: ProcessId) -> Option<&Process> {
        self.registry.get(pid)
    }

    /// Ready queue contents, head first
    pub fn ready_queue(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.ready.iter().copied()
    }

    /// Blocked queue contents, oldest first
    pub fn blocked_queue(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.blocked.iter().copied()
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn blocked_len(&self) -> usize {
        self.blocked.len()
    }

    /// Every process has reached Terminated
    pub fn all_terminated(&self) -> bool {
        self.registry.iter().all(Process::is_terminated)
    }

    /// Hand the state to the next turn of the protocol
    pub(crate) fn pass_turn(&mut self) {
        self.turn = self.turn.next(self.cores);
    }

    /// Raise the cooperative termination flag
    pub(crate) fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Record a fatal error and stop every actor; the first fault wins
    pub(crate) fn fail(&mut self, err: SimError) {
        if self.fault.is_none() {
            self.fault = Some(err);
        }
        self.terminated = true;
    }

    fn process_mut(&mut self, pid: ProcessId) -> SimResult<&mut Process> {
        let tick = self.tick;
        self.registry
            .get_mut(pid)
            .ok_or_else(|| SimError::invariant(tick, format!("unknown process slot {}", pid)))
    }

    /// Pending -> Ready on arrival; the process joins the ready tail
    pub(crate) fn admit(&mut self, pid: ProcessId) -> SimResult<()> {
        let tick = self.tick;
        self.process_mut(pid)?
            .transition(ProcessState::Ready { since: tick }, tick)?;
        self.ready.push_back(pid);
        Ok(())
    }

    /// Requeue a preempted or unblocked process at the ready tail
    ///
    /// The process becomes eligible for dispatch on the next tick.
    pub(crate) fn enqueue_ready(&mut self, pid: ProcessId) -> SimResult<()> {
        let tick = self.tick;
        self.process_mut(pid)?
            .transition(ProcessState::Ready { since: tick + 1 }, tick)?;
        self.ready.push_back(pid);
        Ok(())
    }

    /// Pop the ready head onto `core`
    pub(crate) fn dequeue_ready(&mut self, core: CoreId) -> SimResult<Option<ProcessId>> {
        let tick = self.tick;
        if core >= self.cores {
            return Err(SimError::invariant(
                tick,
                format!("core {} out of range ({} cores)", core, self.cores),
            ));
        }
        let Some(pid) = self.ready.pop_front() else {
            return Ok(None);
        };
        self.process_mut(pid)?
            .transition(ProcessState::Running { core }, tick)?;
        Ok(Some(pid))
    }

    /// Running -> Blocked for `duration` ticks
    ///
    /// A zero duration still parks the process; the next countdown releases it.
    pub(crate) fn enqueue_blocked(&mut self, pid: ProcessId, duration: Tick) -> SimResult<()> {
        let tick = self.tick;
        self.process_mut(pid)?
            .transition(ProcessState::Blocked { remaining: duration }, tick)?;
        self.blocked.push_back(pid);
        Ok(())
    }

    /// Running -> Terminated at `completion`
    pub(crate) fn finish(&mut self, pid: ProcessId, completion: Tick) -> SimResult<()> {
        let tick = self.tick;
        self.process_mut(pid)?
            .transition(ProcessState::Terminated { completion }, tick)
    }

    /// Mutable access to the process running on `core`
    pub(crate) fn running_mut(&mut self, pid: ProcessId, core: CoreId) -> SimResult<&mut Process> {
        let tick = self.tick;
        let process = self.process_mut(pid)?;
        match process.state() {
            ProcessState::Running { core: owner } if owner == core => Ok(process),
            other => Err(SimError::invariant(
                tick,
                format!(
                    "core {} expected to own process {}, found it {}",
                    core,
                    process.id(),
                    other
                ),
            )),
        }
    }

    /// Decrement every blocked countdown once
    ///
    /// Returns the processes whose countdown reached zero (or was parked at
    /// zero), removed from the blocked queue in their queue order and still
    /// tagged `Blocked { 0 }`.
    pub(crate) fn countdown_blocked(&mut self) -> SimResult<Vec<ProcessId>> {
        let tick = self.tick;
        let mut expired = Vec::new();
        for &pid in &self.blocked {
            let process = self
                .registry
                .get_mut(pid)
                .ok_or_else(|| SimError::invariant(tick, format!("unknown process slot {}", pid)))?;
            let ProcessState::Blocked { remaining } = process.state() else {
                return Err(SimError::invariant(
                    tick,
                    format!("process {} in blocked queue while {}", process.id(), process.state()),
                ));
            };
            if remaining > 0 {
                process.transition(ProcessState::Blocked { remaining: remaining - 1 }, tick)?;
            }
            if remaining <= 1 {
                expired.push(pid);
            }
        }
        self.blocked.retain(|pid| !expired.contains(pid));
        Ok(expired)
    }

    /// Charge one wait tick to every process that sat in the ready queue
    /// for the whole current tick; returns how many were charged
    pub(crate) fn charge_waiting(&mut self) -> usize {
        let tick = self.tick;
        let mut charged = 0;
        for &pid in &self.ready {
            if let Some(process) = self.registry.get_mut(pid) {
                if matches!(process.state(), ProcessState::Ready { since } if since <= tick) {
                    process.record_wait();
                    charged += 1;
                }
            }
        }
        charged
    }

    /// Move the global clock forward by one tick
    pub(crate) fn advance_tick(&mut self) -> SimResult<Tick> {
        self.tick = self
            .tick
            .checked_add(1)
            .ok_or_else(|| SimError::invariant(self.tick, "tick counter overflow"))?;
        Ok(self.tick)
    }

    /// Full consistency check of queues against process states
    pub fn audit(&self) -> SimResult<()> {
        let tick = self.tick;
        let mut seen = vec![false; self.registry.len()];
        let mut core_owner: Vec<Option<ProcessId>> = vec![None; self.cores];

        for (queue, name) in [(&self.ready, "ready"), (&self.blocked, "blocked")] {
            for &pid in queue {
                let process = self.registry.get(pid).ok_or_else(|| {
                    SimError::invariant(tick, format!("{} queue holds unknown slot {}", name, pid))
                })?;
                if std::mem::replace(&mut seen[pid], true) {
                    return Err(SimError::invariant(
                        tick,
                        format!("process {} appears in more than one queue slot", process.id()),
                    ));
                }
                let consistent = match (name, process.state()) {
                    ("ready", ProcessState::Ready { .. }) => true,
                    ("blocked", ProcessState::Blocked { .. }) => true,
                    _ => false,
                };
                if !consistent {
                    return Err(SimError::invariant(
                        tick,
                        format!("process {} in {} queue while {}", process.id(), name, process.state()),
                    ));
                }
            }
        }

        for (pid, process) in self.registry.iter().enumerate() {
            match process.state() {
                ProcessState::Ready { .. } | ProcessState::Blocked { .. } if !seen[pid] => {
                    return Err(SimError::invariant(
                        tick,
                        format!("process {} is {} but not queued", process.id(), process.state()),
                    ));
                }
                ProcessState::Running { core } => {
                    let slot = core_owner.get_mut(core).ok_or_else(|| {
                        SimError::invariant(tick, format!("process {} on unknown core {}", process.id(), core))
                    })?;
                    if let Some(other) = slot.replace(pid) {
                        return Err(SimError::invariant(
                            tick,
                            format!(
                                "core {} runs both {} and {}",
                                core,
                                self.registry[other].id(),
                                process.id()
                            ),
                        ));
                    }
                }
                _ => {}
            }
            let spec = process.spec();
            if process.burst1_remaining() > spec.burst1 || process.burst2_remaining() > spec.burst2 {
                return Err(SimError::invariant(
                    tick,
                    format!("process {} remaining work grew past its descriptor", process.id()),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(specs: Vec<ProcessSpec>) -> SchedulerState {
        SchedulerState::new(specs, 10, 2)
    }

    #[test]
    fn test_turn_sequence() {
        let mut turn = Turn::Admit;
        let mut seen = vec![turn];
        for _ in 0..6 {
            turn = turn.next(2);
            seen.push(turn);
        }
        assert_eq!(
            seen,
            vec![
                Turn::Admit,
                Turn::Dispatch(0),
                Turn::Dispatch(1),
                Turn::Unblock,
                Turn::Execute(0),
                Turn::Execute(1),
                Turn::Advance,
            ]
        );
        assert_eq!(Turn::Advance.next(2), Turn::Admit);
    }

    #[test]
    fn test_ready_queue_is_fifo() {
        let mut s = state(vec![
            ProcessSpec::new("A", 0, 1),
            ProcessSpec::new("B", 0, 1),
            ProcessSpec::new("C", 0, 1),
        ]);
        s.admit(2).unwrap();
        s.admit(0).unwrap();
        s.admit(1).unwrap();
        assert_eq!(s.ready_queue().collect::<Vec<_>>(), vec![2, 0, 1]);

        assert_eq!(s.dequeue_ready(0).unwrap(), Some(2));
        assert_eq!(s.dequeue_ready(1).unwrap(), Some(0));
        assert_eq!(
            s.process(2).unwrap().state(),
            ProcessState::Running { core: 0 }
        );
        s.audit().unwrap();
    }

    #[test]
    fn test_double_admit_is_rejected() {
        let mut s = state(vec![ProcessSpec::new("A", 0, 1)]);
        s.admit(0).unwrap();
        let err = s.admit(0).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(s.ready_len(), 1);
    }

    #[test]
    fn test_dequeue_empty_and_bad_core() {
        let mut s = state(vec![ProcessSpec::new("A", 0, 1)]);
        assert_eq!(s.dequeue_ready(0).unwrap(), None);
        s.admit(0).unwrap();
        assert!(s.dequeue_ready(7).is_err());
    }

    #[test]
    fn test_countdown_decrements_every_blocked_process() {
        let mut s = state(vec![
            ProcessSpec::new("A", 0, 1).with_block(1),
            ProcessSpec::new("B", 0, 1).with_block(3),
        ]);
        for pid in 0..2 {
            s.admit(pid).unwrap();
        }
        let a = s.dequeue_ready(0).unwrap().unwrap();
        let b = s.dequeue_ready(1).unwrap().unwrap();
        s.enqueue_blocked(b, 3).unwrap();
        s.enqueue_blocked(a, 1).unwrap();

        let expired = s.countdown_blocked().unwrap();
        assert_eq!(expired, vec![a]);
        assert_eq!(
            s.process(b).unwrap().state(),
            ProcessState::Blocked { remaining: 2 }
        );
        assert_eq!(s.blocked_queue().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_zero_block_released_on_next_countdown() {
        let mut s = state(vec![ProcessSpec::new("A", 0, 1).with_block(0)]);
        s.admit(0).unwrap();
        s.dequeue_ready(0).unwrap();
        s.enqueue_blocked(0, 0).unwrap();
        assert_eq!(
            s.process(0).unwrap().state(),
            ProcessState::Blocked { remaining: 0 }
        );
        s.audit().unwrap();

        assert_eq!(s.countdown_blocked().unwrap(), vec![0]);
        assert_eq!(s.blocked_len(), 0);
        s.enqueue_ready(0).unwrap();
        s.audit().unwrap();
    }

    #[test]
    fn test_charge_waiting_skips_processes_queued_this_tick() {
        let mut s = state(vec![ProcessSpec::new("A", 0, 3), ProcessSpec::new("B", 0, 3)]);
        s.admit(0).unwrap();
        s.admit(1).unwrap();
        s.dequeue_ready(0).unwrap();
        // Preempted during this tick: ready only from the next one
        s.enqueue_ready(0).unwrap();

        assert_eq!(s.charge_waiting(), 1);
        assert_eq!(s.process(0).unwrap().wait_ticks(), 0);
        assert_eq!(s.process(1).unwrap().wait_ticks(), 1);
    }

    #[test]
    fn test_audit_detects_unqueued_ready_process() {
        let mut s = state(vec![ProcessSpec::new("A", 0, 1)]);
        s.admit(0).unwrap();
        s.ready.clear();
        assert!(s.audit().is_err());
    }

    #[test]
    fn test_horizon_zero_starts_terminated() {
        let s = SchedulerState::new(vec![ProcessSpec::new("A", 0, 1)], 0, 1);
        assert!(s.is_terminated());
    }

    #[test]
    fn test_fail_keeps_first_fault() {
        let mut s = state(vec![]);
        s.fail(SimError::invariant(0, "first"));
        s.fail(SimError::invariant(0, "second"));
        assert!(s.is_terminated());
        assert_eq!(s.fault(), Some(&SimError::invariant(0, "first")));
    }
}
