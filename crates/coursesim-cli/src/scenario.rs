//! Line-oriented scenario/random-file loading (spec.md §6). This is the
//! "external collaborator" the core hands typed vectors to; it stays a
//! thin whitespace-split reader rather than routing through the LNK-only
//! tokenizer.

use std::fs;
use std::path::Path;

use coursesim_core::SimError;

fn read_lines(path: &Path) -> Result<Vec<String>, SimError> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn scenario_err(msg: impl Into<String>) -> SimError {
    SimError::Scenario(msg.into())
}

/// Random file: first integer `N`, then `N` signed integers (spec.md §6).
pub fn load_random_file(path: &Path) -> Result<Vec<i64>, SimError> {
    let text = fs::read_to_string(path)?;
    let mut tokens = text.split_whitespace();
    let count: usize = tokens
        .next()
        .ok_or_else(|| scenario_err("random file missing count"))?
        .parse()
        .map_err(|_| scenario_err("random file count is not an integer"))?;
    let values: Vec<i64> = tokens
        .map(|t| t.parse::<i64>().map_err(|_| scenario_err(format!("random file has non-integer value '{t}'"))))
        .collect::<Result<_, _>>()?;
    if values.len() != count {
        return Err(scenario_err(format!(
            "random file declares {count} values but contains {}",
            values.len()
        )));
    }
    Ok(values)
}

/// IOSCH scenario: `"<arrival> <track>"` per line.
pub fn load_iosch_scenario(path: &Path) -> Result<Vec<(i64, i64)>, SimError> {
    let mut requests = Vec::new();
    for line in read_lines(path)? {
        let mut parts = line.split_whitespace();
        let arrival = parts
            .next()
            .ok_or_else(|| scenario_err("iosch scenario line missing arrival"))?
            .parse::<i64>()
            .map_err(|_| scenario_err("iosch scenario arrival is not an integer"))?;
        let track = parts
            .next()
            .ok_or_else(|| scenario_err("iosch scenario line missing track"))?
            .parse::<i64>()
            .map_err(|_| scenario_err("iosch scenario track is not an integer"))?;
        requests.push((arrival, track));
    }
    Ok(requests)
}

/// SCHED scenario: `"<AT> <TC> <CB> <IO>"` per line.
pub fn load_sched_scenario(path: &Path) -> Result<Vec<(i64, i64, i64, i64)>, SimError> {
    let mut rows = Vec::new();
    for line in read_lines(path)? {
        let values: Vec<i64> = line
            .split_whitespace()
            .map(|t| t.parse::<i64>().map_err(|_| scenario_err("sched scenario field is not an integer")))
            .collect::<Result<_, _>>()?;
        if values.len() != 4 {
            return Err(scenario_err("sched scenario line must have 4 fields: AT TC CB IO"));
        }
        rows.push((values[0], values[1], values[2], values[3]));
    }
    Ok(rows)
}

/// MMU scenario: `n_processes`, then per process `n_vmas` followed by
/// `n_vmas` lines `"<start> <end> <wprot> <fmap>"`, then the instruction
/// stream `"<c|r|w|e> <arg>"`.
pub struct RawMmuScenario {
    pub processes: Vec<Vec<(i64, i64, bool, bool)>>,
    pub instructions: Vec<(char, i64)>,
}

pub fn load_mmu_scenario(path: &Path) -> Result<RawMmuScenario, SimError> {
    let lines = read_lines(path)?;
    let mut iter = lines.iter();

    let n_processes: usize = iter
        .next()
        .ok_or_else(|| scenario_err("mmu scenario missing process count"))?
        .parse()
        .map_err(|_| scenario_err("mmu scenario process count is not an integer"))?;

    let mut processes = Vec::with_capacity(n_processes);
    for _ in 0..n_processes {
        let n_vmas: usize = iter
            .next()
            .ok_or_else(|| scenario_err("mmu scenario missing vma count"))?
            .parse()
            .map_err(|_| scenario_err("mmu scenario vma count is not an integer"))?;
        let mut vmas = Vec::with_capacity(n_vmas);
        for _ in 0..n_vmas {
            let line = iter.next().ok_or_else(|| scenario_err("mmu scenario missing vma line"))?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(scenario_err("mmu vma line must have 4 fields: start end wprot fmap"));
            }
            let start: i64 = fields[0].parse().map_err(|_| scenario_err("mmu vma start is not an integer"))?;
            let end: i64 = fields[1].parse().map_err(|_| scenario_err("mmu vma end is not an integer"))?;
            let wprot: i64 = fields[2].parse().map_err(|_| scenario_err("mmu vma wprot is not 0/1"))?;
            let fmap: i64 = fields[3].parse().map_err(|_| scenario_err("mmu vma fmap is not 0/1"))?;
            vmas.push((start, end, wprot != 0, fmap != 0));
        }
        processes.push(vmas);
    }

    let mut instructions = Vec::new();
    for line in iter {
        let mut parts = line.split_whitespace();
        let op = parts
            .next()
            .ok_or_else(|| scenario_err("mmu instruction line missing opcode"))?;
        let op_char = op
            .chars()
            .next()
            .ok_or_else(|| scenario_err("mmu instruction opcode is empty"))?;
        let arg: i64 = parts
            .next()
            .ok_or_else(|| scenario_err("mmu instruction line missing argument"))?
            .parse()
            .map_err(|_| scenario_err("mmu instruction argument is not an integer"))?;
        instructions.push((op_char, arg));
    }

    Ok(RawMmuScenario { processes, instructions })
}
