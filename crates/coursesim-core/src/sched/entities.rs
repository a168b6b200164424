//! SCHED entities (spec §3.3): process state, events, and the stable
//! event queue that drives the whole simulation.

/// Process lifecycle state (spec §3.3 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Created,
    Ready,
    Running,
    Blocked,
    Done,
}

/// A state-machine transition (spec §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CreatedToReady,
    ReadyToRunning,
    RunningToBlocked,
    BlockedToReady,
    RunningToReady,
    RunningToDone,
}

/// A scheduled process. Scenario fields (`arrival_time`, `total_cpu`,
/// `cpu_burst_max`, `io_burst_max`, `static_priority`) are fixed at
/// creation; everything else mutates over the run.
#[derive(Debug, Clone)]
pub struct Process {
    pub id: usize,
    pub arrival_time: i64,
    pub total_cpu: i64,
    pub cpu_burst_max: i64,
    pub io_burst_max: i64,
    pub static_priority: i64,

    pub dynamic_priority: i64,
    pub remaining_time: i64,
    pub current_burst_remaining: i64,
    pub preempted: bool,
    pub state: ProcessState,
    pub state_entered_at: i64,
    pub finish_time: i64,
    pub turnaround: i64,
    pub io_time: i64,
    pub waiting_time: i64,
}

impl Process {
    pub fn new(
        id: usize,
        arrival_time: i64,
        total_cpu: i64,
        cpu_burst_max: i64,
        io_burst_max: i64,
        static_priority: i64,
    ) -> Self {
        Process {
            id,
            arrival_time,
            total_cpu,
            cpu_burst_max,
            io_burst_max,
            static_priority,
            dynamic_priority: static_priority - 1,
            remaining_time: total_cpu,
            current_burst_remaining: -1,
            preempted: false,
            state: ProcessState::Created,
            state_entered_at: arrival_time,
            finish_time: -1,
            turnaround: -1,
            io_time: 0,
            waiting_time: 0,
        }
    }
}

/// `(clock, process, transition)`.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub clock: i64,
    pub pid: usize,
    pub transition: Transition,
}

/// Time-ordered, insertion-stable event queue: inserting at time `t` places
/// the new event after every pre-existing event at time `t`.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue { events: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn add(&mut self, event: Event) {
        let pos = self.events.iter().position(|e| e.clock > event.clock);
        match pos {
            Some(i) => self.events.insert(i, event),
            None => self.events.push(event),
        }
    }

    /// Pop the earliest event, FIFO among equal clocks.
    pub fn pop(&mut self) -> Option<Event> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.remove(0))
        }
    }

    pub fn next_clock(&self) -> Option<i64> {
        self.events.first().map(|e| e.clock)
    }

    /// Remove the (at most one) pending event for `pid`, returning it.
    pub fn delete_for(&mut self, pid: usize) -> Option<Event> {
        let pos = self.events.iter().position(|e| e.pid == pid)?;
        Some(self.events.remove(pos))
    }

    pub fn next_clock_for(&self, pid: usize) -> Option<i64> {
        self.events.iter().find(|e| e.pid == pid).map(|e| e.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_preserve_insertion_order() {
        let mut q = EventQueue::new();
        q.add(Event {
            clock: 5,
            pid: 0,
            transition: Transition::CreatedToReady,
        });
        q.add(Event {
            clock: 5,
            pid: 1,
            transition: Transition::CreatedToReady,
        });
        q.add(Event {
            clock: 3,
            pid: 2,
            transition: Transition::CreatedToReady,
        });
        let order: Vec<usize> = std::iter::from_fn(|| q.pop()).map(|e| e.pid).collect();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn delete_for_removes_single_pending_event() {
        let mut q = EventQueue::new();
        q.add(Event {
            clock: 10,
            pid: 0,
            transition: Transition::RunningToReady,
        });
        assert!(q.delete_for(0).is_some());
        assert!(q.is_empty());
    }
}
