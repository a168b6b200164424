//! MMU — virtual memory simulator (spec §4.3).

pub mod cost;
pub mod entities;
pub mod policy;
pub mod simulator;

pub use entities::{Frame, MmuProcess, Pte, ProcessCounters, Vma, MAX_FRAMES, PAGE_TABLE_SIZE};
pub use policy::{Aging, Clock, Fifo, Nru, Pager, PteAccess, Random, WorkingSet};
pub use simulator::{CostSummary, Instruction, MmuSimulator, TraceOptions};

use crate::error::SimError;
use crate::random::RandomSource;

/// Resolve a `-a` flag value (spec.md §6: `{f|r|c|e|a|w}`) to a fresh pager.
/// `Random` needs its own random source, separate from the random source
/// SCHED draws bursts from; MMU reads exactly one random file.
pub fn pager_from_flag(flag: char, n_frames: usize, random: RandomSource) -> Result<Box<dyn Pager>, SimError> {
    if n_frames > MAX_FRAMES {
        return Err(SimError::TooManyFrames(n_frames));
    }
    match flag {
        'f' => Ok(Box::new(Fifo::new(n_frames))),
        'r' => Ok(Box::new(Random::new(n_frames, random))),
        'c' => Ok(Box::new(Clock::new(n_frames))),
        'e' => Ok(Box::new(Nru::new(n_frames))),
        'a' => Ok(Box::new(Aging::new(n_frames))),
        'w' => Ok(Box::new(WorkingSet::new(n_frames))),
        other => Err(SimError::UnknownPolicy(format!("mmu pager '{other}'"))),
    }
}
