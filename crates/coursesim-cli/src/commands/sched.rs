use std::path::Path;

use coursesim_core::sched::{policy_from_spec, Process, SchedSimulator, INFINITE_QUANTUM};
use coursesim_core::RandomSource;

use super::fail;
use crate::scenario::{load_random_file, load_sched_scenario};

pub fn run(verbose: bool, policy_spec: &str, scenario_path: &Path, randomfile_path: &Path) {
    let rows = match load_sched_scenario(scenario_path) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    let random_values = match load_random_file(randomfile_path) {
        Ok(v) => v,
        Err(e) => fail(e),
    };
    let policy = match policy_from_spec(policy_spec) {
        Ok(p) => p,
        Err(e) => fail(e),
    };

    log::debug!("sched: {} processes, policy spec '{}'", rows.len(), policy_spec);

    let mut random = RandomSource::new(random_values);
    let maxprio = policy.maxprio();
    let processes: Vec<Process> = rows
        .into_iter()
        .enumerate()
        .map(|(id, (at, tc, cb, io))| {
            let static_priority = random.next_one_based(maxprio);
            Process::new(id, at, tc, cb, io, static_priority)
        })
        .collect();

    if policy.quantum() < INFINITE_QUANTUM {
        println!("{} {}", policy.name(), policy.quantum());
    } else {
        println!("{}", policy.name());
    }

    let simulator = SchedSimulator::new(processes, random, policy).with_verbose(verbose);
    let (processes, summary, trace) = simulator.run();

    if verbose {
        for line in &trace {
            println!("{line}");
        }
    }
    for p in &processes {
        println!(
            "{:04}: {:4} {:4} {:4} {:4} {:1} | {:5} {:5} {:5} {:5}",
            p.id,
            p.arrival_time,
            p.total_cpu,
            p.cpu_burst_max,
            p.io_burst_max,
            p.static_priority,
            p.finish_time,
            p.turnaround,
            p.io_time,
            p.waiting_time
        );
    }
    println!("{summary}");
}
