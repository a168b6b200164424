//! MMU cost model (spec §4.3 "Cost model (summary)").

pub const COST_UNMAP: u64 = 410;
pub const COST_MAP: u64 = 350;
pub const COST_IN: u64 = 3200;
pub const COST_OUT: u64 = 2750;
pub const COST_FIN: u64 = 2350;
pub const COST_FOUT: u64 = 2800;
pub const COST_ZERO: u64 = 150;
pub const COST_SEGV: u64 = 440;
pub const COST_SEGPROT: u64 = 410;
pub const COST_CONTEXT_SWITCH: u64 = 130;
pub const COST_PROCESS_EXIT: u64 = 1230;
pub const COST_READ_WRITE: u64 = 1;
