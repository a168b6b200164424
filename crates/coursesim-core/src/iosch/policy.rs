//! IOSCH arm-scheduling policies (spec §4.1).
//!
//! Requests are referred to by their index into the simulator's request
//! vector, never owned by the policy — the arena-storage discipline spec.md
//! §9 calls out, which also sidesteps the "shadow queue" bug spec.md §9
//! warns about: there is exactly one queue of `(idx, track)` pairs per
//! policy, never a second one that dispatch silently reads from instead of
//! the one `add()` writes to.

use std::collections::VecDeque;

/// Capability surface a seek policy exposes to the IOSCH simulator.
///
/// There is deliberately no `is_empty()`: spec.md §9 notes one IOSCH variant
/// makes that method always return `true`, so the simulator must (and does)
/// rely solely on `next()` returning `None`.
pub trait SeekPolicy {
    /// Register a newly admitted request.
    fn add(&mut self, idx: usize, track: i64);

    /// Pick and remove the next request to service, given the current head
    /// position. Returns `None` if nothing is queued.
    fn next(&mut self, head: i64) -> Option<usize>;

    fn name(&self) -> &'static str;
}

/// `N` — first-in, first-out.
#[derive(Debug, Default)]
pub struct Fifo {
    queue: VecDeque<(usize, i64)>,
}

impl SeekPolicy for Fifo {
    fn add(&mut self, idx: usize, track: i64) {
        self.queue.push_back((idx, track));
    }

    fn next(&mut self, _head: i64) -> Option<usize> {
        self.queue.pop_front().map(|(idx, _)| idx)
    }

    fn name(&self) -> &'static str {
        "FIFO"
    }
}

/// `S` — shortest seek time first.
#[derive(Debug, Default)]
pub struct Sstf {
    queue: Vec<(usize, i64)>,
}

impl SeekPolicy for Sstf {
    fn add(&mut self, idx: usize, track: i64) {
        self.queue.push((idx, track));
    }

    fn next(&mut self, head: i64) -> Option<usize> {
        let best = self
            .queue
            .iter()
            .enumerate()
            .min_by_key(|(pos, (_, track))| ((track - head).abs(), *pos))
            .map(|(pos, _)| pos)?;
        Some(self.queue.remove(best).0)
    }

    fn name(&self) -> &'static str {
        "SSTF"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
}

impl Direction {
    fn flip(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Shared LOOK dispatch: scan `queue` for the nearest request on the current
/// side of `head`, flipping `direction` once if nothing qualifies.
pub(crate) fn look_next(
    queue: &mut Vec<(usize, i64)>,
    head: i64,
    direction: &mut Direction,
) -> Option<usize> {
    for _ in 0..2 {
        let candidate = queue
            .iter()
            .enumerate()
            .filter(|(_, (_, track))| match *direction {
                Direction::Up => *track >= head,
                Direction::Down => *track <= head,
            })
            .min_by_key(|(pos, (_, track))| ((track - head).abs(), *pos))
            .map(|(pos, _)| pos);

        if let Some(pos) = candidate {
            return Some(queue.remove(pos).0);
        }
        *direction = direction.flip();
    }
    None
}

/// `L` — LOOK: sweeps toward the current direction, reversing at the
/// nearest end rather than running to the physical edge of the disk.
#[derive(Debug)]
pub struct Look {
    queue: Vec<(usize, i64)>,
    direction: Direction,
}

impl Default for Look {
    fn default() -> Self {
        Look {
            queue: Vec::new(),
            direction: Direction::Up,
        }
    }
}

impl SeekPolicy for Look {
    fn add(&mut self, idx: usize, track: i64) {
        self.queue.push((idx, track));
    }

    fn next(&mut self, head: i64) -> Option<usize> {
        look_next(&mut self.queue, head, &mut self.direction)
    }

    fn name(&self) -> &'static str {
        "LOOK"
    }
}

/// `C` — CLOOK: one-way sweep toward higher tracks, wrapping to the lowest
/// pending track instead of reversing.
#[derive(Debug, Default)]
pub struct CLook {
    queue: Vec<(usize, i64)>,
}

impl SeekPolicy for CLook {
    fn add(&mut self, idx: usize, track: i64) {
        self.queue.push((idx, track));
    }

    fn next(&mut self, head: i64) -> Option<usize> {
        let forward = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, (_, track))| *track - head >= 0)
            .min_by_key(|(pos, (_, track))| (*track - head, *pos))
            .map(|(pos, _)| pos);

        let chosen = forward.or_else(|| {
            self.queue
                .iter()
                .enumerate()
                .min_by_key(|(pos, (_, track))| (*track, *pos))
                .map(|(pos, _)| pos)
        })?;

        Some(self.queue.remove(chosen).0)
    }

    fn name(&self) -> &'static str {
        "CLOOK"
    }
}

/// `F` — FLOOK: an active queue serviced with LOOK semantics and an add
/// queue that absorbs newly admitted requests; they swap whenever the
/// active queue empties. Direction is shared across the swap.
#[derive(Debug)]
pub struct FLook {
    active: Vec<(usize, i64)>,
    adding: Vec<(usize, i64)>,
    direction: Direction,
}

impl Default for FLook {
    fn default() -> Self {
        FLook {
            active: Vec::new(),
            adding: Vec::new(),
            direction: Direction::Up,
        }
    }
}

impl SeekPolicy for FLook {
    fn add(&mut self, idx: usize, track: i64) {
        self.adding.push((idx, track));
    }

    fn next(&mut self, head: i64) -> Option<usize> {
        if self.active.is_empty() {
            std::mem::swap(&mut self.active, &mut self.adding);
        }
        look_next(&mut self.active, head, &mut self.direction)
    }

    fn name(&self) -> &'static str {
        "FLOOK"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sstf_breaks_ties_by_insertion_order() {
        let mut p = Sstf::default();
        p.add(0, 10);
        p.add(1, 20);
        p.add(2, 15);
        // from head=10: req0 dist0, serviced first trivially
        assert_eq!(p.next(0), Some(0));
        // from head=10 remaining {1@20 (dist 10), 2@15 (dist 5)}
        assert_eq!(p.next(10), Some(2));
        assert_eq!(p.next(10), Some(1));
        assert_eq!(p.next(10), None);
    }

    #[test]
    fn clook_wraps_to_lowest_track() {
        let mut p = CLook::default();
        p.add(0, 5);
        p.add(1, 2);
        // head at 8: nothing ahead, wrap to smallest absolute track (2)
        assert_eq!(p.next(8), Some(1));
        assert_eq!(p.next(8), Some(0));
    }

    #[test]
    fn look_flips_direction_when_exhausted_on_one_side() {
        let mut p = Look::default();
        p.add(0, 3); // below head, direction starts Up
        assert_eq!(p.next(5), Some(0));
    }

    #[test]
    fn flook_swaps_when_active_drains() {
        let mut p = FLook::default();
        p.add(0, 10);
        p.add(1, 20);
        assert_eq!(p.next(0), Some(0));
        // active queue still has req1 until it empties; newly added requests
        // go to the "adding" side and aren't visible yet.
        p.add(2, 1);
        assert_eq!(p.next(10), Some(1));
        // active is now empty; swap brings req2 in.
        assert_eq!(p.next(10), Some(2));
    }
}
