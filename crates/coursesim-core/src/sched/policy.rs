//! SCHED dispatch policies (spec §4.2).
//!
//! Processes are referred to by index into the simulator's process table,
//! never owned by the policy (spec.md §9 "Arena storage"). `add` takes
//! `&mut [Process]` because PRIO/PREPRIO need to read — and, when it has
//! gone negative, reset — the process's `dynamic_priority` to decide
//! active-vs-expired placement, the way `PRIO::add_process` does in the
//! original scheduler source.

use std::collections::VecDeque;

use super::entities::Process;

/// Quantum sentinel meaning "no quantum" for policies that never preempt on
/// a timer (FCFS/LCFS/SRTF): chosen to match the original's `(int)1e4`, also
/// used to decide whether the summary line prints a quantum suffix.
pub const INFINITE_QUANTUM: i64 = 10_000;

/// Capability surface a scheduling policy exposes to the SCHED simulator.
pub trait SchedPolicy {
    fn name(&self) -> &'static str;
    fn quantum(&self) -> i64;
    fn maxprio(&self) -> i64;

    /// Add a ready process, possibly touching its `dynamic_priority`.
    fn add(&mut self, processes: &mut [Process], pid: usize);

    /// Pop the next process to run, or `None` if nothing is ready.
    fn pop_next(&mut self, processes: &[Process]) -> Option<usize>;

    fn does_preempt(&self) -> bool {
        false
    }
}

/// `F` — FCFS: plain FIFO.
#[derive(Debug, Default)]
pub struct Fcfs {
    queue: VecDeque<usize>,
}

impl SchedPolicy for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }
    fn quantum(&self) -> i64 {
        INFINITE_QUANTUM
    }
    fn maxprio(&self) -> i64 {
        4
    }
    fn add(&mut self, _processes: &mut [Process], pid: usize) {
        self.queue.push_back(pid);
    }
    fn pop_next(&mut self, _processes: &[Process]) -> Option<usize> {
        self.queue.pop_front()
    }
}

/// `L` — LCFS: the most recently readied process runs next.
#[derive(Debug, Default)]
pub struct Lcfs {
    queue: VecDeque<usize>,
}

impl SchedPolicy for Lcfs {
    fn name(&self) -> &'static str {
        "LCFS"
    }
    fn quantum(&self) -> i64 {
        INFINITE_QUANTUM
    }
    fn maxprio(&self) -> i64 {
        4
    }
    fn add(&mut self, _processes: &mut [Process], pid: usize) {
        self.queue.push_back(pid);
    }
    fn pop_next(&mut self, _processes: &[Process]) -> Option<usize> {
        self.queue.pop_back()
    }
}

/// `S` — SRTF: shortest remaining time first, ties by insertion order.
#[derive(Debug, Default)]
pub struct Srtf {
    queue: Vec<usize>,
}

impl SchedPolicy for Srtf {
    fn name(&self) -> &'static str {
        "SRTF"
    }
    fn quantum(&self) -> i64 {
        INFINITE_QUANTUM
    }
    fn maxprio(&self) -> i64 {
        4
    }
    fn add(&mut self, _processes: &mut [Process], pid: usize) {
        self.queue.push(pid);
    }
    fn pop_next(&mut self, processes: &[Process]) -> Option<usize> {
        let best = self
            .queue
            .iter()
            .enumerate()
            .min_by_key(|(pos, &pid)| (processes[pid].remaining_time, *pos))
            .map(|(pos, _)| pos)?;
        Some(self.queue.remove(best))
    }
}

/// `R<q>` — round robin with a fixed quantum.
#[derive(Debug)]
pub struct RoundRobin {
    quantum: i64,
    queue: VecDeque<usize>,
}

impl RoundRobin {
    pub fn new(quantum: i64) -> Self {
        RoundRobin {
            quantum,
            queue: VecDeque::new(),
        }
    }
}

impl SchedPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }
    fn quantum(&self) -> i64 {
        self.quantum
    }
    fn maxprio(&self) -> i64 {
        4
    }
    fn add(&mut self, _processes: &mut [Process], pid: usize) {
        self.queue.push_back(pid);
    }
    fn pop_next(&mut self, _processes: &[Process]) -> Option<usize> {
        self.queue.pop_front()
    }
}

/// Shared active/expired priority-level queues for PRIO and PREPRIO.
#[derive(Debug)]
struct PrioQueues {
    quantum: i64,
    maxprio: i64,
    active: Vec<VecDeque<usize>>,
    expired: Vec<VecDeque<usize>>,
}

impl PrioQueues {
    fn new(quantum: i64, maxprio: i64) -> Self {
        let levels = maxprio.max(1) as usize;
        PrioQueues {
            quantum,
            maxprio,
            active: (0..levels).map(|_| VecDeque::new()).collect(),
            expired: (0..levels).map(|_| VecDeque::new()).collect(),
        }
    }

    fn add(&mut self, processes: &mut [Process], pid: usize) {
        let p = &mut processes[pid];
        if p.dynamic_priority < 0 {
            p.dynamic_priority = p.static_priority - 1;
            self.expired[p.dynamic_priority as usize].push_back(pid);
        } else {
            self.active[p.dynamic_priority as usize].push_back(pid);
        }
    }

    fn pop_next(&mut self) -> Option<usize> {
        if self.active.iter().all(|q| q.is_empty()) {
            if self.expired.iter().all(|q| q.is_empty()) {
                return None;
            }
            std::mem::swap(&mut self.active, &mut self.expired);
        }
        for level in self.active.iter_mut().rev() {
            if let Some(pid) = level.pop_front() {
                return Some(pid);
            }
        }
        None
    }
}

/// `P<q>[:L]` — priority scheduling with active/expired level swapping.
#[derive(Debug)]
pub struct Prio(PrioQueues);

impl Prio {
    pub fn new(quantum: i64, maxprio: i64) -> Self {
        Prio(PrioQueues::new(quantum, maxprio))
    }
}

impl SchedPolicy for Prio {
    fn name(&self) -> &'static str {
        "PRIO"
    }
    fn quantum(&self) -> i64 {
        self.0.quantum
    }
    fn maxprio(&self) -> i64 {
        self.0.maxprio
    }
    fn add(&mut self, processes: &mut [Process], pid: usize) {
        self.0.add(processes, pid);
    }
    fn pop_next(&mut self, _processes: &[Process]) -> Option<usize> {
        self.0.pop_next()
    }
}

/// `E<q>[:L]` — PRIO with preemption on higher-priority arrivals.
#[derive(Debug)]
pub struct Preprio(PrioQueues);

impl Preprio {
    pub fn new(quantum: i64, maxprio: i64) -> Self {
        Preprio(PrioQueues::new(quantum, maxprio))
    }
}

impl SchedPolicy for Preprio {
    fn name(&self) -> &'static str {
        "PREPRIO"
    }
    fn quantum(&self) -> i64 {
        self.0.quantum
    }
    fn maxprio(&self) -> i64 {
        self.0.maxprio
    }
    fn add(&mut self, processes: &mut [Process], pid: usize) {
        self.0.add(processes, pid);
    }
    fn pop_next(&mut self, _processes: &[Process]) -> Option<usize> {
        self.0.pop_next()
    }
    fn does_preempt(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(id: usize, static_priority: i64) -> Process {
        Process::new(id, 0, 100, 10, 10, static_priority)
    }

    #[test]
    fn prio_picks_highest_nonempty_level() {
        let mut procs = vec![proc(0, 2), proc(1, 4)];
        let mut p = Prio::new(INFINITE_QUANTUM, 4);
        p.add(&mut procs, 0); // dynamic_priority = 1
        p.add(&mut procs, 1); // dynamic_priority = 3
        assert_eq!(p.pop_next(&procs), Some(1));
        assert_eq!(p.pop_next(&procs), Some(0));
    }

    #[test]
    fn prio_swaps_active_and_expired_when_active_drains() {
        let mut procs = vec![proc(0, 1)];
        procs[0].dynamic_priority = -1; // simulate a just-decremented process
        let mut p = Prio::new(INFINITE_QUANTUM, 4);
        p.add(&mut procs, 0);
        // reset to static_priority - 1 = 0, placed in expired[0]
        assert_eq!(procs[0].dynamic_priority, 0);
        assert_eq!(p.pop_next(&procs), Some(0));
    }

    #[test]
    fn srtf_orders_by_remaining_time_with_stable_ties() {
        let mut procs = vec![proc(0, 1), proc(1, 1), proc(2, 1)];
        procs[0].remaining_time = 50;
        procs[1].remaining_time = 50;
        procs[2].remaining_time = 10;
        let mut s = Srtf::default();
        s.add(&mut procs, 0);
        s.add(&mut procs, 1);
        s.add(&mut procs, 2);
        assert_eq!(s.pop_next(&procs), Some(2));
        assert_eq!(s.pop_next(&procs), Some(0));
        assert_eq!(s.pop_next(&procs), Some(1));
    }
}
