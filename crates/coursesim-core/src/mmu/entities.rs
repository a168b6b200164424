//! MMU entities (spec §3.4): frames, virtual memory areas, and page tables.

/// One physical frame. `owner_pid = None` means free.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    pub owner_pid: Option<usize>,
    pub virtual_page: i64,
    pub age: u32,
}

impl Frame {
    pub fn is_free(&self) -> bool {
        self.owner_pid.is_none()
    }
}

/// `(start_vpage, end_vpage)` inclusive, plus the cached protection bits.
#[derive(Debug, Clone, Copy)]
pub struct Vma {
    pub start_vpage: i64,
    pub end_vpage: i64,
    pub write_protected: bool,
    pub file_mapped: bool,
}

impl Vma {
    pub fn contains(&self, vpage: i64) -> bool {
        vpage >= self.start_vpage && vpage <= self.end_vpage
    }
}

/// A page-table entry. Bitfields in spec.md §3.4 are modelled as plain
/// bools/`u32` rather than packed bits — the simulator never serialises
/// this struct, so there is nothing to gain from hand-rolled bit-packing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pte {
    pub frame_number: u32,
    pub valid: bool,
    pub referenced: bool,
    pub modified: bool,
    pub paged_out: bool,
    pub write_protected: bool,
    pub file_mapped: bool,
    pub is_valid_vma: bool,
}

pub const PAGE_TABLE_SIZE: usize = 64;
pub const MAX_FRAMES: usize = 128;

/// Per-process counters credited by the fault handler and `e` instruction
/// (spec §4.3 cost-model accounting).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCounters {
    pub unmaps: u64,
    pub maps: u64,
    pub ins: u64,
    pub outs: u64,
    pub fins: u64,
    pub fouts: u64,
    pub zeros: u64,
    pub segv: u64,
    pub segprot: u64,
}

#[derive(Debug, Clone)]
pub struct MmuProcess {
    pub id: usize,
    pub vmas: Vec<Vma>,
    pub page_table: [Pte; PAGE_TABLE_SIZE],
    pub counters: ProcessCounters,
}

impl MmuProcess {
    pub fn new(id: usize, vmas: Vec<Vma>) -> Self {
        MmuProcess {
            id,
            vmas,
            page_table: [Pte::default(); PAGE_TABLE_SIZE],
            counters: ProcessCounters::default(),
        }
    }

    pub fn find_vma(&self, vpage: i64) -> Option<&Vma> {
        self.vmas.iter().find(|v| v.contains(vpage))
    }
}
