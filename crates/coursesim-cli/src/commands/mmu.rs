use std::path::Path;

use coursesim_core::mmu::{pager_from_flag, Instruction, MmuProcess, MmuSimulator, TraceOptions, Vma};
use coursesim_core::{RandomSource, SimError};

use super::fail;
use crate::scenario::{load_mmu_scenario, load_random_file};

fn parse_trace_options(flags: Option<&str>) -> TraceOptions {
    let mut opts = TraceOptions::default();
    for c in flags.unwrap_or("").chars() {
        match c {
            'O' => opts.o = true,
            'P' => opts.p = true,
            'F' => opts.big_f = true,
            'S' => opts.big_s = true,
            'x' => opts.x = true,
            'y' => opts.y = true,
            'f' => opts.small_f = true,
            'a' => opts.small_a = true,
            _ => {}
        }
    }
    opts
}

fn parse_instruction(op: char, arg: i64) -> Result<Instruction, SimError> {
    match op {
        'c' => Ok(Instruction::Switch(arg as usize)),
        'r' => Ok(Instruction::Read(arg)),
        'w' => Ok(Instruction::Write(arg)),
        'e' => Ok(Instruction::Exit(arg as usize)),
        other => Err(SimError::Scenario(format!("unknown mmu instruction opcode '{other}'"))),
    }
}

pub fn run(n_frames: usize, pager_flag: char, trace_flags: Option<&str>, scenario_path: &Path, randomfile_path: &Path) {
    let raw = match load_mmu_scenario(scenario_path) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    let random_values = match load_random_file(randomfile_path) {
        Ok(v) => v,
        Err(e) => fail(e),
    };
    let random = RandomSource::new(random_values);
    let pager = match pager_from_flag(pager_flag, n_frames, random) {
        Ok(p) => p,
        Err(e) => fail(e),
    };

    log::debug!(
        "mmu: {} processes, {} frames, pager '{}'",
        raw.processes.len(),
        n_frames,
        pager_flag
    );

    let processes: Vec<MmuProcess> = raw
        .processes
        .into_iter()
        .enumerate()
        .map(|(id, vmas)| {
            let vmas = vmas
                .into_iter()
                .map(|(start, end, write_protected, file_mapped)| Vma {
                    start_vpage: start,
                    end_vpage: end,
                    write_protected,
                    file_mapped,
                })
                .collect();
            MmuProcess::new(id, vmas)
        })
        .collect();

    let instructions: Vec<Instruction> = match raw
        .instructions
        .into_iter()
        .map(|(op, arg)| parse_instruction(op, arg))
        .collect::<Result<_, _>>()
    {
        Ok(i) => i,
        Err(e) => fail(e),
    };

    let trace_options = parse_trace_options(trace_flags);
    let simulator = MmuSimulator::new(processes, n_frames, pager, instructions).with_trace_options(trace_options);
    let (processes, cost, trace) = simulator.run();

    if trace_options.any() {
        for line in &trace {
            println!("{line}");
        }
    }
    for p in &processes {
        println!(
            "PID{}: U={} M={} I={} O={} F={} Z={} S={} P={}",
            p.id,
            p.counters.unmaps,
            p.counters.maps,
            p.counters.ins,
            p.counters.outs,
            p.counters.fins + p.counters.fouts,
            p.counters.zeros,
            p.counters.segv,
            p.counters.segprot
        );
    }
    println!("{cost}");
}
