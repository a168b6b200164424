//! IOSCH — disk I/O request scheduler (spec §4.1).

pub mod entities;
pub mod policy;
pub mod simulator;

pub use entities::Request;
pub use policy::{CLook, FLook, Fifo, Look, SeekPolicy, Sstf};
pub use simulator::{IoschSimulator, IoschSummary};

use crate::error::SimError;

/// Resolve a `-s` flag value (spec.md §6: `{N|S|L|C|F}`) to a fresh policy.
pub fn policy_from_flag(flag: char) -> Result<Box<dyn SeekPolicy>, SimError> {
    match flag {
        'N' => Ok(Box::new(Fifo::default())),
        'S' => Ok(Box::new(Sstf::default())),
        'L' => Ok(Box::new(Look::default())),
        'C' => Ok(Box::new(CLook::default())),
        'F' => Ok(Box::new(FLook::default())),
        other => Err(SimError::UnknownPolicy(format!("iosch seek policy '{other}'"))),
    }
}
