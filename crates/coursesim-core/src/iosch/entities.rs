//! IOSCH entities (spec §3.2).

/// A disk I/O request. `start_time`/`completion_time` are `-1` until
/// serviced; both are set exactly once over the request's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub arrival_time: i64,
    pub target_track: i64,
    pub start_time: i64,
    pub completion_time: i64,
}

impl Request {
    pub fn new(arrival_time: i64, target_track: i64) -> Self {
        Request {
            arrival_time,
            target_track,
            start_time: -1,
            completion_time: -1,
        }
    }
}
