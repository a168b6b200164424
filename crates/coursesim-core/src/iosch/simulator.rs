//! IOSCH clock-driven simulator (spec §4.1).

use super::entities::Request;
use super::policy::SeekPolicy;

/// Per-run summary: `(total_time, total_head_movement, utilization,
/// avg_turnaround, avg_wait, max_wait)`.
#[derive(Debug, Clone, PartialEq)]
pub struct IoschSummary {
    pub total_time: i64,
    pub total_head_movement: i64,
    pub utilization: f64,
    pub avg_turnaround: f64,
    pub avg_wait: f64,
    pub max_wait: i64,
}

pub struct IoschSimulator {
    requests: Vec<Request>,
    track_head: i64,
    clock: i64,
    active: Option<usize>,
    next_unadmitted: usize,
    policy: Box<dyn SeekPolicy>,
}

impl IoschSimulator {
    /// `requests` must already be ordered by `arrival_time`, matching the
    /// already-parsed input spec.md §6 hands to the core.
    pub fn new(requests: Vec<Request>, policy: Box<dyn SeekPolicy>) -> Self {
        IoschSimulator {
            requests,
            track_head: 0,
            clock: 0,
            active: None,
            next_unadmitted: 0,
            policy,
        }
    }

    /// Drives the simulator to completion and returns the final per-request
    /// state plus the run summary.
    pub fn run(mut self) -> (Vec<Request>, IoschSummary) {
        loop {
            // 1. Admission
            while self.next_unadmitted < self.requests.len()
                && self.requests[self.next_unadmitted].arrival_time == self.clock
            {
                let idx = self.next_unadmitted;
                let track = self.requests[idx].target_track;
                self.policy.add(idx, track);
                self.next_unadmitted += 1;
            }

            // 2. Completion check
            if let Some(idx) = self.active {
                if self.track_head == self.requests[idx].target_track {
                    self.requests[idx].completion_time = self.clock;
                    self.active = None;
                }
            }

            // 3. Dispatch
            let mut terminate = false;
            while self.active.is_none() {
                match self.policy.next(self.track_head) {
                    Some(idx) => {
                        self.requests[idx].start_time = self.clock;
                        if self.requests[idx].target_track == self.track_head {
                            self.requests[idx].completion_time = self.clock;
                        } else {
                            self.active = Some(idx);
                        }
                    }
                    None => {
                        if self.next_unadmitted >= self.requests.len() {
                            terminate = true;
                        }
                        break;
                    }
                }
            }
            if terminate {
                break;
            }

            // 4. Head motion
            if let Some(idx) = self.active {
                let target = self.requests[idx].target_track;
                if target > self.track_head {
                    self.track_head += 1;
                } else if target < self.track_head {
                    self.track_head -= 1;
                }
            }

            // 5. Advance clock
            self.clock += 1;
        }

        let summary = self.summarize();
        (self.requests, summary)
    }

    fn summarize(&self) -> IoschSummary {
        let n = self.requests.len();
        if n == 0 {
            return IoschSummary {
                total_time: self.clock,
                total_head_movement: 0,
                utilization: 0.0,
                avg_turnaround: 0.0,
                avg_wait: 0.0,
                max_wait: 0,
            };
        }

        let total_time = self.clock;
        let movement: i64 = self
            .requests
            .iter()
            .map(|r| (r.completion_time - r.start_time).abs())
            .sum();
        let turnarounds: Vec<i64> = self
            .requests
            .iter()
            .map(|r| r.completion_time - r.arrival_time)
            .collect();
        let waits: Vec<i64> = self
            .requests
            .iter()
            .map(|r| r.start_time - r.arrival_time)
            .collect();

        let avg_turnaround = turnarounds.iter().sum::<i64>() as f64 / n as f64;
        let avg_wait = waits.iter().sum::<i64>() as f64 / n as f64;
        let max_wait = waits.iter().copied().max().unwrap_or(0);
        let utilization = if total_time > 0 {
            movement as f64 / total_time as f64
        } else {
            0.0
        };

        IoschSummary {
            total_time,
            total_head_movement: movement,
            utilization,
            avg_turnaround,
            avg_wait,
            max_wait,
        }
    }
}

impl std::fmt::Display for IoschSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SUM: {} {} {:.4} {:.2} {:.2} {}",
            self.total_time,
            self.total_head_movement,
            self.utilization,
            self.avg_turnaround,
            self.avg_wait,
            self.max_wait
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iosch::policy::{CLook, Fifo, Sstf};

    #[test]
    fn scenario_a_single_request_fifo() {
        let requests = vec![Request::new(0, 42)];
        let sim = IoschSimulator::new(requests, Box::new(Fifo::default()));
        let (reqs, summary) = sim.run();
        assert_eq!(reqs[0].start_time, 0);
        assert_eq!(reqs[0].completion_time, 42);
        assert_eq!(summary.to_string(), "SUM: 42 42 1.0000 42.00 0.00 0");
    }

    #[test]
    fn scenario_b_three_requests_sstf() {
        let requests = vec![Request::new(0, 10), Request::new(1, 20), Request::new(2, 15)];
        let sim = IoschSimulator::new(requests, Box::new(Sstf::default()));
        let (reqs, summary) = sim.run();
        assert_eq!(reqs[0].completion_time, 10);
        assert_eq!(reqs[2].completion_time, 15);
        assert_eq!(reqs[1].completion_time, 20);
        assert_eq!(summary.total_head_movement, 20);
        assert_eq!(summary.total_time, 20);
    }

    #[test]
    fn zero_movement_completes_same_tick() {
        // Request arrives with target equal to the head's starting
        // position: dispatch and completion happen in the same tick.
        let requests = vec![Request::new(0, 0)];
        let sim = IoschSimulator::new(requests, Box::new(Fifo::default()));
        let (reqs, _summary) = sim.run();
        assert_eq!(reqs[0].start_time, 0);
        assert_eq!(reqs[0].completion_time, 0);
    }

    #[test]
    fn clook_wraps_when_servicing_out_of_order_arrivals() {
        let requests = vec![Request::new(0, 50), Request::new(0, 10)];
        let sim = IoschSimulator::new(requests, Box::new(CLook::default()));
        let (reqs, _summary) = sim.run();
        assert!(reqs.iter().all(|r| r.completion_time >= 0));
    }
}
