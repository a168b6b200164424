//! SCHED — preemptive CPU scheduler simulator (spec §4.2).

pub mod entities;
pub mod policy;
pub mod simulator;

pub use entities::{Event, EventQueue, Process, ProcessState, Transition};
pub use policy::{Fcfs, Lcfs, Preprio, Prio, RoundRobin, SchedPolicy, Srtf, INFINITE_QUANTUM};
pub use simulator::{SchedSimulator, SchedSummary};

use crate::error::SimError;

/// Resolve a `-s` flag value (spec.md §6: `{F|L|S|R<q>|P<q>[:L]|E<q>[:L]}`).
pub fn policy_from_spec(spec: &str) -> Result<Box<dyn SchedPolicy>, SimError> {
    let mut chars = spec.chars();
    let kind = chars
        .next()
        .ok_or_else(|| SimError::UnknownPolicy("empty scheduler spec".to_string()))?;
    let rest = chars.as_str();

    match kind {
        'F' => Ok(Box::new(Fcfs::default())),
        'L' => Ok(Box::new(Lcfs::default())),
        'S' => Ok(Box::new(Srtf::default())),
        'R' => {
            let quantum = parse_int(rest, spec)?;
            Ok(Box::new(RoundRobin::new(quantum)))
        }
        'P' => {
            let (quantum, maxprio) = parse_quantum_maxprio(rest, spec)?;
            Ok(Box::new(Prio::new(quantum, maxprio)))
        }
        'E' => {
            let (quantum, maxprio) = parse_quantum_maxprio(rest, spec)?;
            Ok(Box::new(Preprio::new(quantum, maxprio)))
        }
        other => Err(SimError::UnknownPolicy(format!("sched policy '{other}'"))),
    }
}

fn parse_int(text: &str, spec: &str) -> Result<i64, SimError> {
    text.parse()
        .map_err(|_| SimError::UnknownPolicy(format!("malformed scheduler spec '{spec}'")))
}

fn parse_quantum_maxprio(text: &str, spec: &str) -> Result<(i64, i64), SimError> {
    match text.split_once(':') {
        Some((q, l)) => Ok((parse_int(q, spec)?, parse_int(l, spec)?)),
        None => Ok((parse_int(text, spec)?, 4)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_round_robin_quantum() {
        let p = policy_from_spec("R4").unwrap();
        assert_eq!(p.quantum(), 4);
        assert_eq!(p.name(), "RR");
    }

    #[test]
    fn parses_prio_with_explicit_maxprio() {
        let p = policy_from_spec("P2:8").unwrap();
        assert_eq!(p.quantum(), 2);
        assert_eq!(p.maxprio(), 8);
    }

    #[test]
    fn parses_preprio_default_maxprio() {
        let p = policy_from_spec("E5").unwrap();
        assert_eq!(p.maxprio(), 4);
        assert!(p.does_preempt());
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(policy_from_spec("Z").is_err());
    }
}
