//! SCHED discrete-event loop (spec §4.2).

use super::entities::{Event, EventQueue, Process, ProcessState, Transition};
use super::policy::SchedPolicy;
use crate::random::RandomSource;

/// Run totals independent of any single process (spec §4.2 summary line).
#[derive(Debug, Clone, PartialEq)]
pub struct SchedSummary {
    pub finish_time: i64,
    pub cpu_util: f64,
    pub io_util: f64,
    pub avg_turnaround: f64,
    pub avg_wait: f64,
    pub throughput: f64,
}

impl std::fmt::Display for SchedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SUM: {} {:.2} {:.2} {:.2} {:.2} {:.3}",
            self.finish_time,
            self.cpu_util,
            self.io_util,
            self.avg_turnaround,
            self.avg_wait,
            self.throughput
        )
    }
}

pub struct SchedSimulator {
    processes: Vec<Process>,
    events: EventQueue,
    policy: Box<dyn SchedPolicy>,
    random: RandomSource,
    current_running: Option<usize>,
    n_io_blocked: i64,
    io_start_time: i64,
    total_io_time: i64,
    verbose: bool,
    trace: Vec<String>,
}

impl SchedSimulator {
    pub fn new(processes: Vec<Process>, random: RandomSource, policy: Box<dyn SchedPolicy>) -> Self {
        let mut events = EventQueue::new();
        for p in &processes {
            events.add(Event {
                clock: p.arrival_time,
                pid: p.id,
                transition: Transition::CreatedToReady,
            });
        }
        SchedSimulator {
            processes,
            events,
            policy,
            random,
            current_running: None,
            n_io_blocked: 0,
            io_start_time: 0,
            total_io_time: 0,
            verbose: false,
            trace: Vec::new(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Drives the event queue to exhaustion and returns the final process
    /// table, the run summary, and (if verbose) a per-transition trace.
    pub fn run(mut self) -> (Vec<Process>, SchedSummary, Vec<String>) {
        while let Some(e) = self.events.pop() {
            let time_in_state = e.clock - self.processes[e.pid].state_entered_at;
            let call_scheduler = self.apply_transition(e, time_in_state);

            if call_scheduler {
                if self.events.next_clock() == Some(e.clock) {
                    continue;
                }
                if self.current_running.is_none() {
                    if let Some(pid) = self.policy.pop_next(&self.processes) {
                        self.events.add(Event {
                            clock: e.clock,
                            pid,
                            transition: Transition::ReadyToRunning,
                        });
                    }
                }
            }
        }

        let summary = self.summarize();
        (self.processes, summary, self.trace)
    }

    fn maybe_preempt(&mut self, arriving_pid: usize, clock: i64) {
        let Some(running_pid) = self.current_running else {
            return;
        };
        if !self.policy.does_preempt() {
            return;
        }
        let arriving_prio = self.processes[arriving_pid].dynamic_priority;
        let running_prio = self.processes[running_pid].dynamic_priority;
        let higher_priority = arriving_prio > running_prio;
        let not_already_due = self.events.next_clock_for(running_pid) != Some(clock);
        if higher_priority && not_already_due {
            self.events.delete_for(running_pid);
            self.processes[running_pid].preempted = true;
            self.events.add(Event {
                clock,
                pid: running_pid,
                transition: Transition::RunningToReady,
            });
        }
    }

    fn apply_transition(&mut self, e: Event, time_in_state: i64) -> bool {
        match e.transition {
            Transition::CreatedToReady => {
                if self.verbose {
                    self.trace.push(format!(
                        "{} {} {}: CREATED -> READY",
                        e.clock, e.pid, time_in_state
                    ));
                }
                self.processes[e.pid].state = ProcessState::Ready;
                self.processes[e.pid].state_entered_at = e.clock;

                self.maybe_preempt(e.pid, e.clock);

                self.policy.add(&mut self.processes, e.pid);
                true
            }
            Transition::ReadyToRunning => {
                let cpu_burst = if self.processes[e.pid].preempted {
                    self.processes[e.pid].current_burst_remaining
                } else {
                    let drawn = self.random.next_one_based(self.processes[e.pid].cpu_burst_max);
                    let clamped = drawn.min(self.processes[e.pid].remaining_time);
                    self.processes[e.pid].current_burst_remaining = clamped;
                    clamped
                };

                if self.verbose {
                    self.trace.push(format!(
                        "{} {} {}: READY -> RUNNG cb={} rem={} prio={}",
                        e.clock,
                        e.pid,
                        time_in_state,
                        cpu_burst,
                        self.processes[e.pid].remaining_time,
                        self.processes[e.pid].dynamic_priority
                    ));
                }

                self.processes[e.pid].state = ProcessState::Running;
                self.processes[e.pid].state_entered_at = e.clock;
                self.current_running = Some(e.pid);
                self.processes[e.pid].waiting_time += time_in_state;
                self.processes[e.pid].preempted = false;

                let quantum = self.policy.quantum();
                if quantum < cpu_burst {
                    self.events.add(Event {
                        clock: e.clock + quantum,
                        pid: e.pid,
                        transition: Transition::RunningToReady,
                    });
                } else if cpu_burst >= self.processes[e.pid].remaining_time {
                    self.events.add(Event {
                        clock: e.clock + cpu_burst,
                        pid: e.pid,
                        transition: Transition::RunningToDone,
                    });
                } else {
                    self.events.add(Event {
                        clock: e.clock + cpu_burst,
                        pid: e.pid,
                        transition: Transition::RunningToBlocked,
                    });
                }
                false
            }
            Transition::RunningToReady => {
                self.processes[e.pid].remaining_time -= time_in_state;
                self.processes[e.pid].current_burst_remaining -= time_in_state;
                self.current_running = None;

                if self.verbose {
                    self.trace.push(format!(
                        "{} {} {}: RUNNG -> READY cb={} rem={} prio={}",
                        e.clock,
                        e.pid,
                        time_in_state,
                        self.processes[e.pid].current_burst_remaining,
                        self.processes[e.pid].remaining_time,
                        self.processes[e.pid].dynamic_priority
                    ));
                }

                self.processes[e.pid].state = ProcessState::Ready;
                self.processes[e.pid].state_entered_at = e.clock;
                self.processes[e.pid].dynamic_priority -= 1;
                self.policy.add(&mut self.processes, e.pid);
                self.processes[e.pid].preempted = true;
                true
            }
            Transition::RunningToBlocked => {
                self.processes[e.pid].remaining_time -= time_in_state;
                self.current_running = None;
                let io_burst = self.random.next_one_based(self.processes[e.pid].io_burst_max);

                if self.n_io_blocked == 0 {
                    self.io_start_time = e.clock;
                }
                self.n_io_blocked += 1;

                if self.verbose {
                    self.trace.push(format!(
                        "{} {} {}: RUNNG -> BLOCK  ib={} rem={}",
                        e.clock, e.pid, time_in_state, io_burst, self.processes[e.pid].remaining_time
                    ));
                }

                self.processes[e.pid].state = ProcessState::Blocked;
                self.processes[e.pid].state_entered_at = e.clock;
                self.events.add(Event {
                    clock: e.clock + io_burst,
                    pid: e.pid,
                    transition: Transition::BlockedToReady,
                });
                true
            }
            Transition::BlockedToReady => {
                self.n_io_blocked -= 1;
                if self.n_io_blocked == 0 {
                    self.total_io_time += e.clock - self.io_start_time;
                }

                self.processes[e.pid].dynamic_priority = self.processes[e.pid].static_priority - 1;
                self.processes[e.pid].io_time += time_in_state;

                if self.verbose {
                    self.trace
                        .push(format!("{} {} {}: BLOCK -> READY", e.clock, e.pid, time_in_state));
                }

                self.processes[e.pid].state = ProcessState::Ready;
                self.processes[e.pid].state_entered_at = e.clock;

                self.maybe_preempt(e.pid, e.clock);

                self.policy.add(&mut self.processes, e.pid);
                true
            }
            Transition::RunningToDone => {
                self.processes[e.pid].remaining_time -= time_in_state;
                self.current_running = None;

                if self.verbose {
                    self.trace.push(format!("{} {} {}: Done", e.clock, e.pid, time_in_state));
                }

                self.processes[e.pid].finish_time = e.clock;
                self.processes[e.pid].turnaround = e.clock - self.processes[e.pid].arrival_time;
                true
            }
        }
    }

    fn summarize(&self) -> SchedSummary {
        let n = self.processes.len().max(1) as f64;
        let mut finish_time = 0;
        let mut cpu_time = 0.0;
        let mut total_tat = 0.0;
        let mut total_wait = 0.0;
        for p in &self.processes {
            cpu_time += p.total_cpu as f64;
            total_tat += p.turnaround as f64;
            total_wait += p.waiting_time as f64;
            finish_time = finish_time.max(p.finish_time);
        }

        let ft = finish_time as f64;
        SchedSummary {
            finish_time,
            cpu_util: if ft > 0.0 { 100.0 * (cpu_time / ft) } else { 0.0 },
            io_util: if ft > 0.0 { 100.0 * (self.total_io_time as f64 / ft) } else { 0.0 },
            avg_turnaround: total_tat / n,
            avg_wait: total_wait / n,
            throughput: if ft > 0.0 { 100.0 * (self.processes.len() as f64 / ft) } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::policy::{Fcfs, RoundRobin};

    fn random(values: Vec<i64>) -> RandomSource {
        RandomSource::new(values)
    }

    #[test]
    fn single_process_runs_to_completion_fcfs() {
        // cb draw clamps to remaining_time (10), so it finishes in one burst.
        let processes = vec![Process::new(0, 0, 10, 10, 10, 1)];
        let sim = SchedSimulator::new(processes, random(vec![1, 100]), Box::new(Fcfs::default()));
        let (procs, summary, _) = sim.run();
        assert_eq!(procs[0].finish_time, 10);
        assert_eq!(procs[0].turnaround, 10);
        assert_eq!(procs[0].waiting_time, 0);
        assert_eq!(summary.finish_time, 10);
    }

    #[test]
    fn round_robin_preempts_on_quantum() {
        // cb draw is large, but RR quantum=2 forces a RUNNING_TO_READY split.
        let processes = vec![Process::new(0, 0, 4, 4, 4, 1)];
        let sim = SchedSimulator::new(
            processes,
            random(vec![4, 100]),
            Box::new(RoundRobin::new(2)),
        );
        let (procs, _summary, _) = sim.run();
        assert_eq!(procs[0].finish_time, 4);
    }

    #[test]
    fn two_processes_share_cpu_in_arrival_order() {
        let processes = vec![
            Process::new(0, 0, 5, 5, 5, 1),
            Process::new(1, 0, 5, 5, 5, 1),
        ];
        let sim = SchedSimulator::new(processes, random(vec![5, 5, 100]), Box::new(Fcfs::default()));
        let (procs, _summary, _) = sim.run();
        assert_eq!(procs[0].finish_time, 5);
        assert_eq!(procs[1].finish_time, 10);
        assert_eq!(procs[1].waiting_time, 5);
    }
}
