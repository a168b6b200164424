//! MMU instruction-driven simulator (spec §4.3).

use std::collections::VecDeque;

use super::cost::*;
use super::entities::{Frame, MmuProcess, PAGE_TABLE_SIZE};
use super::policy::{Pager, PteAccess};

/// One line of the instruction stream: `c`/`r`/`w`/`e` plus its argument.
#[derive(Debug, Clone, Copy)]
pub enum Instruction {
    Switch(usize),
    Read(i64),
    Write(i64),
    Exit(usize),
}

/// `-o<flags>` trace categories (spec §6): each letter toggles one category
/// of diagnostic output independently of the cost-model accounting, which
/// always runs regardless of tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceOptions {
    pub o: bool,
    pub p: bool,
    pub big_f: bool,
    pub big_s: bool,
    pub x: bool,
    pub y: bool,
    pub small_f: bool,
    pub small_a: bool,
}

impl TraceOptions {
    pub fn any(&self) -> bool {
        self.o || self.p || self.big_f || self.big_s || self.x || self.y || self.small_f || self.small_a
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostSummary {
    pub ctx_switches: u64,
    pub process_exits: u64,
    pub unmaps: u64,
    pub maps: u64,
    pub ins: u64,
    pub outs: u64,
    pub fins: u64,
    pub fouts: u64,
    pub zeros: u64,
    pub segv: u64,
    pub segprot: u64,
    pub reads_writes: u64,
    pub total_cost: u64,
}

impl std::fmt::Display for CostSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SUM: {}", self.total_cost)
    }
}

struct ProcessPteView<'a> {
    processes: &'a mut [MmuProcess],
}

impl<'a> PteAccess for ProcessPteView<'a> {
    fn referenced(&self, owner_pid: usize, vpage: i64) -> bool {
        self.processes[owner_pid].page_table[vpage as usize].referenced
    }
    fn modified(&self, owner_pid: usize, vpage: i64) -> bool {
        self.processes[owner_pid].page_table[vpage as usize].modified
    }
    fn clear_referenced(&mut self, owner_pid: usize, vpage: i64) {
        self.processes[owner_pid].page_table[vpage as usize].referenced = false;
    }
}

pub struct MmuSimulator {
    frames: Vec<Frame>,
    free_list: VecDeque<usize>,
    processes: Vec<MmuProcess>,
    current_pid: Option<usize>,
    pager: Box<dyn Pager>,
    instructions: Vec<Instruction>,
    instruction_idx: i64,
    cost: CostSummary,
    trace_options: TraceOptions,
    trace: Vec<String>,
}

impl MmuSimulator {
    pub fn new(
        processes: Vec<MmuProcess>,
        n_frames: usize,
        pager: Box<dyn Pager>,
        instructions: Vec<Instruction>,
    ) -> Self {
        MmuSimulator {
            frames: vec![Frame::default(); n_frames],
            free_list: (0..n_frames).collect(),
            processes,
            current_pid: None,
            pager,
            instructions,
            instruction_idx: 0,
            cost: CostSummary::default(),
            trace_options: TraceOptions::default(),
            trace: Vec::new(),
        }
    }

    pub fn with_trace_options(mut self, options: TraceOptions) -> Self {
        self.trace_options = options;
        self
    }

    pub fn run(mut self) -> (Vec<MmuProcess>, CostSummary, Vec<String>) {
        let instructions = std::mem::take(&mut self.instructions);
        for (idx, instr) in instructions.into_iter().enumerate() {
            self.instruction_idx = idx as i64;
            self.execute(instr);
        }
        (self.processes, self.cost, self.trace)
    }

    fn execute(&mut self, instr: Instruction) {
        match instr {
            Instruction::Switch(pid) => {
                self.current_pid = Some(pid);
                self.cost.ctx_switches += 1;
                self.cost.total_cost += COST_CONTEXT_SWITCH;
                if self.trace_options.o {
                    self.trace.push(format!("{} == {} ==> c {}", self.instruction_idx, pid, pid));
                }
            }
            Instruction::Read(vpage) => self.reference(vpage, false),
            Instruction::Write(vpage) => self.reference(vpage, true),
            Instruction::Exit(pid) => self.exit_process(pid),
        }
    }

    fn reference(&mut self, vpage: i64, is_write: bool) {
        self.cost.reads_writes += 1;
        self.cost.total_cost += COST_READ_WRITE;
        let pid = self.current_pid.expect("instruction stream references a process before any c");

        if !self.processes[pid].page_table[vpage as usize].valid {
            if self.fault(pid, vpage).is_err() {
                return; // SEGV: skip the access entirely
            }
        }

        self.processes[pid].page_table[vpage as usize].referenced = true;

        if is_write {
            if self.processes[pid].page_table[vpage as usize].write_protected {
                self.processes[pid].counters.segprot += 1;
                self.cost.segprot += 1;
                self.cost.total_cost += COST_SEGPROT;
                if self.trace_options.x {
                    self.trace.push(format!("{}: SEGPROT", self.instruction_idx));
                }
            } else {
                self.processes[pid].page_table[vpage as usize].modified = true;
            }
        }
    }

    /// Returns `Err(())` on SEGV — the caller must skip the memory access.
    fn fault(&mut self, pid: usize, vpage: i64) -> Result<(), ()> {
        let vma = match self.processes[pid].find_vma(vpage) {
            Some(vma) => *vma,
            None => {
                self.processes[pid].counters.segv += 1;
                self.cost.segv += 1;
                self.cost.total_cost += COST_SEGV;
                if self.trace_options.x {
                    self.trace.push(format!("{}: SEGV", self.instruction_idx));
                }
                return Err(());
            }
        };

        {
            let pte = &mut self.processes[pid].page_table[vpage as usize];
            if !pte.is_valid_vma {
                pte.is_valid_vma = true;
                pte.file_mapped = vma.file_mapped;
                pte.write_protected = vma.write_protected;
            }
        }

        let frame_idx = self.get_frame();

        {
            let pte = &mut self.processes[pid].page_table[vpage as usize];
            pte.valid = true;
            pte.referenced = true;
            pte.frame_number = frame_idx as u32;
        }

        self.frames[frame_idx].owner_pid = Some(pid);
        self.frames[frame_idx].virtual_page = vpage;
        self.pager.update_age(frame_idx, &mut self.frames, self.instruction_idx);

        let file_mapped = self.processes[pid].page_table[vpage as usize].file_mapped;
        let paged_out = self.processes[pid].page_table[vpage as usize].paged_out;

        if file_mapped {
            self.processes[pid].counters.fins += 1;
            self.cost.fins += 1;
            self.cost.total_cost += COST_FIN;
        } else if paged_out {
            self.processes[pid].page_table[vpage as usize].paged_out = false;
            self.processes[pid].counters.ins += 1;
            self.cost.ins += 1;
            self.cost.total_cost += COST_IN;
        } else {
            self.processes[pid].counters.zeros += 1;
            self.cost.zeros += 1;
            self.cost.total_cost += COST_ZERO;
        }

        self.processes[pid].counters.maps += 1;
        self.cost.maps += 1;
        self.cost.total_cost += COST_MAP;

        Ok(())
    }

    /// Returns a frame index, evicting a victim through the pager if the
    /// free list is empty.
    fn get_frame(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop_front() {
            return idx;
        }

        let instruction_idx = self.instruction_idx;
        let victim = {
            let mut view = ProcessPteView {
                processes: &mut self.processes,
            };
            self.pager.select_victim_frame(&mut self.frames, &mut view, instruction_idx)
        };

        let owner = self.frames[victim].owner_pid.expect("victim frames are always occupied");
        let vpage = self.frames[victim].virtual_page;

        self.processes[owner].counters.unmaps += 1;
        self.cost.unmaps += 1;
        self.cost.total_cost += COST_UNMAP;

        let (modified, file_mapped) = {
            let pte = &self.processes[owner].page_table[vpage as usize];
            (pte.modified, pte.file_mapped)
        };

        if modified {
            self.processes[owner].page_table[vpage as usize].modified = false;
            if file_mapped {
                self.processes[owner].counters.fouts += 1;
                self.cost.fouts += 1;
                self.cost.total_cost += COST_FOUT;
            } else {
                self.processes[owner].page_table[vpage as usize].paged_out = true;
                self.processes[owner].counters.outs += 1;
                self.cost.outs += 1;
                self.cost.total_cost += COST_OUT;
            }
        }

        self.processes[owner].page_table[vpage as usize].valid = false;
        victim
    }

    fn exit_process(&mut self, pid: usize) {
        self.current_pid = Some(pid);
        self.cost.process_exits += 1;
        self.cost.total_cost += COST_PROCESS_EXIT;

        for vpage in 0..PAGE_TABLE_SIZE {
            if !self.processes[pid].page_table[vpage].valid {
                continue;
            }
            let frame_idx = self.processes[pid].page_table[vpage].frame_number as usize;

            self.processes[pid].counters.unmaps += 1;
            self.cost.unmaps += 1;
            self.cost.total_cost += COST_UNMAP;

            let (modified, file_mapped) = {
                let pte = &self.processes[pid].page_table[vpage];
                (pte.modified, pte.file_mapped)
            };
            if modified && file_mapped {
                self.processes[pid].counters.fouts += 1;
                self.cost.fouts += 1;
                self.cost.total_cost += COST_FOUT;
            }

            self.frames[frame_idx] = Frame::default();
            self.free_list.push_back(frame_idx);
        }

        for pte in self.processes[pid].page_table.iter_mut() {
            pte.valid = false;
            pte.paged_out = false;
        }

        if self.trace_options.o {
            self.trace.push(format!("{}: EXIT", self.instruction_idx));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmu::entities::Vma;
    use crate::mmu::policy::Fifo;

    fn single_process(n_vpages_covered: i64) -> MmuProcess {
        MmuProcess::new(
            0,
            vec![Vma {
                start_vpage: 0,
                end_vpage: n_vpages_covered,
                write_protected: false,
                file_mapped: false,
            }],
        )
    }

    #[test]
    fn first_touch_zero_fills() {
        let sim = MmuSimulator::new(
            vec![single_process(10)],
            4,
            Box::new(Fifo::new(4)),
            vec![Instruction::Switch(0), Instruction::Read(2)],
        );
        let (procs, cost, _) = sim.run();
        assert_eq!(procs[0].counters.zeros, 1);
        assert_eq!(procs[0].counters.maps, 1);
        assert_eq!(cost.zeros, 1);
    }

    #[test]
    fn write_without_fault_sets_modified() {
        let sim = MmuSimulator::new(
            vec![single_process(10)],
            4,
            Box::new(Fifo::new(4)),
            vec![Instruction::Switch(0), Instruction::Write(2)],
        );
        let (procs, _, _) = sim.run();
        assert!(procs[0].page_table[2].modified);
        assert_eq!(procs[0].counters.segprot, 0);
    }

    #[test]
    fn out_of_range_access_is_segv_and_skipped() {
        let sim = MmuSimulator::new(
            vec![single_process(5)],
            4,
            Box::new(Fifo::new(4)),
            vec![Instruction::Switch(0), Instruction::Read(30)],
        );
        let (procs, cost, _) = sim.run();
        assert_eq!(procs[0].counters.segv, 1);
        assert!(!procs[0].page_table[30].valid);
        assert_eq!(cost.segv, 1);
    }

    #[test]
    fn write_protected_page_faults_in_then_segprots() {
        let mut p = MmuProcess::new(
            0,
            vec![Vma {
                start_vpage: 0,
                end_vpage: 10,
                write_protected: true,
                file_mapped: false,
            }],
        );
        p.id = 0;
        let sim = MmuSimulator::new(
            vec![p],
            4,
            Box::new(Fifo::new(4)),
            vec![Instruction::Switch(0), Instruction::Write(1)],
        );
        let (procs, _, _) = sim.run();
        assert!(procs[0].page_table[1].valid);
        assert!(!procs[0].page_table[1].modified);
        assert_eq!(procs[0].counters.segprot, 1);
    }

    #[test]
    fn exit_unmaps_all_valid_pages_and_frees_frames() {
        let sim = MmuSimulator::new(
            vec![single_process(10)],
            4,
            Box::new(Fifo::new(4)),
            vec![
                Instruction::Switch(0),
                Instruction::Read(1),
                Instruction::Read(2),
                Instruction::Exit(0),
            ],
        );
        let (procs, cost, _) = sim.run();
        assert_eq!(procs[0].counters.unmaps, 2);
        assert_eq!(cost.process_exits, 1);
        assert!(procs[0].page_table.iter().all(|pte| !pte.valid));
    }

    #[test]
    fn eviction_pages_out_modified_anonymous_frame() {
        // 1 frame total: second fault must evict the first page.
        let sim = MmuSimulator::new(
            vec![single_process(10)],
            1,
            Box::new(Fifo::new(1)),
            vec![
                Instruction::Switch(0),
                Instruction::Write(1),
                Instruction::Read(2),
            ],
        );
        let (procs, cost, _) = sim.run();
        assert_eq!(procs[0].counters.outs, 1);
        assert_eq!(cost.outs, 1);
        assert!(!procs[0].page_table[1].valid);
        assert!(procs[0].page_table[1].paged_out);
    }
}
