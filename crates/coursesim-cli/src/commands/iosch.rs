use std::path::Path;

use coursesim_core::iosch::{policy_from_flag, IoschSimulator, Request};

use super::fail;
use crate::scenario::load_iosch_scenario;

pub fn run(policy_flag: char, scenario_path: &Path) {
    let requests = match load_iosch_scenario(scenario_path) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    let policy = match policy_from_flag(policy_flag) {
        Ok(p) => p,
        Err(e) => fail(e),
    };

    log::debug!("iosch: {} requests, policy '{}'", requests.len(), policy_flag);

    let requests: Vec<Request> = requests
        .into_iter()
        .map(|(arrival, track)| Request::new(arrival, track))
        .collect();

    let simulator = IoschSimulator::new(requests, policy);
    let (requests, summary) = simulator.run();

    for (idx, req) in requests.iter().enumerate() {
        println!("{idx}: {} {} {}", req.arrival_time, req.start_time, req.completion_time);
    }
    println!("{summary}");
}
