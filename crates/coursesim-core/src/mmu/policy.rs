//! MMU page-replacement policies (spec §4.3).
//!
//! A pager never owns frames or page tables — it borrows the frame table
//! and touches PTE `referenced`/`modified` bits only through [`PteAccess`],
//! keyed by `(owner_pid, virtual_page)` rather than a raw pointer, the same
//! arena-indexing discipline IOSCH and SCHED use.

use super::entities::Frame;
use crate::random::RandomSource;

/// Read/clear access to the PTE bits a pager is allowed to touch, looked up
/// by the `(owner_pid, virtual_page)` coordinates of the frame that holds
/// them. The MMU simulator implements this over its process table.
pub trait PteAccess {
    fn referenced(&self, owner_pid: usize, vpage: i64) -> bool;
    fn modified(&self, owner_pid: usize, vpage: i64) -> bool;
    fn clear_referenced(&mut self, owner_pid: usize, vpage: i64);
}

/// Capability surface a page-replacement policy exposes to the MMU
/// simulator.
pub trait Pager {
    /// Choose a frame to evict. All frames passed in are occupied — the
    /// simulator only calls this when the free list is empty. Takes the
    /// frame table mutably because Aging/WorkingSet update `Frame::age` as
    /// part of the same scan that picks a victim.
    fn select_victim_frame(
        &mut self,
        frames: &mut [Frame],
        ptes: &mut dyn PteAccess,
        instruction_idx: i64,
    ) -> usize;

    /// Called once a frame is (re)bound to a page, so Aging/WorkingSet can
    /// reset their per-frame age. No-op for policies that don't track age.
    fn update_age(&mut self, _frame_idx: usize, _frames: &mut [Frame], _instruction_idx: i64) {}

    fn name(&self) -> &'static str;
}

/// `f` — FIFO: a circular hand, no regard for reference bits.
#[derive(Debug)]
pub struct Fifo {
    hand: usize,
    n_frames: usize,
}

impl Fifo {
    pub fn new(n_frames: usize) -> Self {
        Fifo { hand: 0, n_frames }
    }
}

impl Pager for Fifo {
    fn select_victim_frame(&mut self, _frames: &mut [Frame], _ptes: &mut dyn PteAccess, _ii: i64) -> usize {
        let victim = self.hand;
        self.hand = (self.hand + 1) % self.n_frames;
        victim
    }

    fn name(&self) -> &'static str {
        "FIFO"
    }
}

/// `r` — Random: draws a raw sample from the deterministic random source
/// and reduces it modulo the frame count.
#[derive(Debug)]
pub struct Random {
    n_frames: usize,
    source: RandomSource,
}

impl Random {
    pub fn new(n_frames: usize, source: RandomSource) -> Self {
        Random { n_frames, source }
    }
}

impl Pager for Random {
    fn select_victim_frame(&mut self, _frames: &mut [Frame], _ptes: &mut dyn PteAccess, _ii: i64) -> usize {
        (self.source.next_raw() % self.n_frames as i64) as usize
    }

    fn name(&self) -> &'static str {
        "RAND"
    }
}

/// `c` — Clock: skips referenced frames, clearing the bit as it passes.
#[derive(Debug)]
pub struct Clock {
    hand: usize,
    n_frames: usize,
}

impl Clock {
    pub fn new(n_frames: usize) -> Self {
        Clock { hand: 0, n_frames }
    }
}

impl Pager for Clock {
    fn select_victim_frame(&mut self, frames: &mut [Frame], ptes: &mut dyn PteAccess, _ii: i64) -> usize {
        loop {
            let f = &frames[self.hand];
            let owner = f.owner_pid.expect("victim candidates are always occupied");
            if ptes.referenced(owner, f.virtual_page) {
                ptes.clear_referenced(owner, f.virtual_page);
                self.hand = (self.hand + 1) % self.n_frames;
                continue;
            }
            let victim = self.hand;
            self.hand = (self.hand + 1) % self.n_frames;
            return victim;
        }
    }

    fn name(&self) -> &'static str {
        "CLOCK"
    }
}

/// `e` — NRU (enhanced second-chance): classes `{0,1,2,3}` from
/// `(referenced<<1)|modified`, periodically sweeping `referenced` clear
/// every 50 instructions.
#[derive(Debug)]
pub struct Nru {
    hand: usize,
    n_frames: usize,
    last_reset: i64,
}

impl Nru {
    pub fn new(n_frames: usize) -> Self {
        Nru {
            hand: 0,
            n_frames,
            last_reset: 0,
        }
    }
}

impl Pager for Nru {
    fn select_victim_frame(
        &mut self,
        frames: &mut [Frame],
        ptes: &mut dyn PteAccess,
        instruction_idx: i64,
    ) -> usize {
        let do_reset = instruction_idx - self.last_reset + 1 >= 50;
        if do_reset {
            self.last_reset = instruction_idx;
        }

        let mut first_found: [Option<usize>; 4] = [None; 4];
        for step in 0..self.n_frames {
            let idx = (self.hand + step) % self.n_frames;
            let f = &frames[idx];
            let owner = f.owner_pid.expect("victim candidates are always occupied");

            if do_reset && ptes.referenced(owner, f.virtual_page) {
                ptes.clear_referenced(owner, f.virtual_page);
            }
            let referenced = ptes.referenced(owner, f.virtual_page);
            let modified = ptes.modified(owner, f.virtual_page);
            let class = ((referenced as usize) << 1) | (modified as usize);
            if first_found[class].is_none() {
                first_found[class] = Some(idx);
            }
        }

        let victim = first_found
            .iter()
            .flatten()
            .next()
            .copied()
            .expect("at least one occupied frame was scanned");
        self.hand = (victim + 1) % self.n_frames;
        victim
    }

    fn name(&self) -> &'static str {
        "NRU"
    }
}

/// `a` — Aging: 32-bit age shifted right each scan, MSB set on reference.
#[derive(Debug)]
pub struct Aging {
    hand: usize,
    n_frames: usize,
}

impl Aging {
    pub fn new(n_frames: usize) -> Self {
        Aging { hand: 0, n_frames }
    }
}

impl Pager for Aging {
    fn select_victim_frame(&mut self, frames: &mut [Frame], ptes: &mut dyn PteAccess, _ii: i64) -> usize {
        for step in 0..self.n_frames {
            let idx = (self.hand + step) % self.n_frames;
            let owner = frames[idx]
                .owner_pid
                .expect("victim candidates are always occupied");
            let vpage = frames[idx].virtual_page;
            frames[idx].age >>= 1;
            if ptes.referenced(owner, vpage) {
                frames[idx].age |= 0x8000_0000;
                ptes.clear_referenced(owner, vpage);
            }
        }

        let victim = (0..self.n_frames)
            .map(|step| (self.hand + step) % self.n_frames)
            .min_by_key(|&idx| frames[idx].age)
            .expect("at least one frame");

        self.hand = (victim + 1) % self.n_frames;
        victim
    }

    fn update_age(&mut self, frame_idx: usize, frames: &mut [Frame], _instruction_idx: i64) {
        frames[frame_idx].age = 0;
    }

    fn name(&self) -> &'static str {
        "AGING"
    }
}

/// `w` — WorkingSet(τ=50): evicts the first frame whose age is at least τ
/// instructions stale, else the least-recently-touched frame.
#[derive(Debug)]
pub struct WorkingSet {
    hand: usize,
    n_frames: usize,
    tau: i64,
}

impl WorkingSet {
    pub fn new(n_frames: usize) -> Self {
        WorkingSet {
            hand: 0,
            n_frames,
            tau: 50,
        }
    }
}

impl Pager for WorkingSet {
    fn select_victim_frame(
        &mut self,
        frames: &mut [Frame],
        ptes: &mut dyn PteAccess,
        instruction_idx: i64,
    ) -> usize {
        let mut min_age_idx = self.hand;
        let mut min_age = u32::MAX;
        let mut chosen = None;

        for step in 0..self.n_frames {
            let idx = (self.hand + step) % self.n_frames;
            let owner = frames[idx]
                .owner_pid
                .expect("victim candidates are always occupied");
            let vpage = frames[idx].virtual_page;

            if ptes.referenced(owner, vpage) {
                ptes.clear_referenced(owner, vpage);
                frames[idx].age = instruction_idx as u32;
                continue;
            }

            let age = frames[idx].age;
            if instruction_idx - (age as i64) >= self.tau {
                chosen = Some(idx);
                break;
            }
            if age < min_age {
                min_age = age;
                min_age_idx = idx;
            }
        }

        let victim = chosen.unwrap_or(min_age_idx);
        self.hand = (victim + 1) % self.n_frames;
        victim
    }

    fn update_age(&mut self, frame_idx: usize, frames: &mut [Frame], instruction_idx: i64) {
        frames[frame_idx].age = instruction_idx as u32;
    }

    fn name(&self) -> &'static str {
        "WS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakePtes {
        referenced: HashMap<(usize, i64), bool>,
        modified: HashMap<(usize, i64), bool>,
    }

    impl PteAccess for FakePtes {
        fn referenced(&self, owner_pid: usize, vpage: i64) -> bool {
            *self.referenced.get(&(owner_pid, vpage)).unwrap_or(&false)
        }
        fn modified(&self, owner_pid: usize, vpage: i64) -> bool {
            *self.modified.get(&(owner_pid, vpage)).unwrap_or(&false)
        }
        fn clear_referenced(&mut self, owner_pid: usize, vpage: i64) {
            self.referenced.insert((owner_pid, vpage), false);
        }
    }

    fn occupied_frame(owner: usize, vpage: i64) -> Frame {
        Frame {
            owner_pid: Some(owner),
            virtual_page: vpage,
            age: 0,
        }
    }

    #[test]
    fn fifo_advances_circularly() {
        let mut pager = Fifo::new(3);
        let mut frames = vec![occupied_frame(0, 0), occupied_frame(0, 1), occupied_frame(0, 2)];
        let mut ptes = FakePtes {
            referenced: HashMap::new(),
            modified: HashMap::new(),
        };
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 0), 0);
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 0), 1);
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 0), 2);
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 0), 0);
    }

    #[test]
    fn clock_skips_referenced_frames() {
        let mut pager = Clock::new(3);
        let mut frames = vec![occupied_frame(0, 0), occupied_frame(0, 1), occupied_frame(0, 2)];
        let mut ptes = FakePtes {
            referenced: HashMap::from([((0, 0), true)]),
            modified: HashMap::new(),
        };
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 0), 1);
        assert!(!ptes.referenced(0, 0));
    }

    #[test]
    fn nru_prefers_class_zero() {
        let mut pager = Nru::new(2);
        let mut frames = vec![occupied_frame(0, 0), occupied_frame(0, 1)];
        let mut ptes = FakePtes {
            referenced: HashMap::from([((0, 0), true)]),
            modified: HashMap::new(),
        };
        // frame 0 is class 2 (referenced, unmodified), frame 1 is class 0.
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 0), 1);
    }

    #[test]
    fn aging_prefers_oldest_after_shift() {
        let mut pager = Aging::new(2);
        let mut frames = vec![
            Frame { owner_pid: Some(0), virtual_page: 0, age: 0x8000_0000 },
            Frame { owner_pid: Some(0), virtual_page: 1, age: 0x4000_0000 },
        ];
        let mut ptes = FakePtes {
            referenced: HashMap::new(),
            modified: HashMap::new(),
        };
        // after >>=1: frame0 age=0x4000_0000, frame1 age=0x2000_0000 (smaller)
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 0), 1);
    }

    #[test]
    fn working_set_evicts_past_tau_immediately() {
        let mut pager = WorkingSet::new(2);
        let mut frames = vec![
            Frame { owner_pid: Some(0), virtual_page: 0, age: 0 },
            Frame { owner_pid: Some(0), virtual_page: 1, age: 40 },
        ];
        let mut ptes = FakePtes {
            referenced: HashMap::new(),
            modified: HashMap::new(),
        };
        // instruction 60: frame0's age (0) is 60 old, >= tau(50) -> chosen first
        assert_eq!(pager.select_victim_frame(&mut frames, &mut ptes, 60), 0);
    }
}
