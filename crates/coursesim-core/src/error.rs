//! Error taxonomy shared by all four simulators.
//!
//! Scenario/config problems (spec §7) are the only kind that can ever reach
//! a caller as an `Err` — simulated-runtime events (SEGV, SEGPROT, redefined
//! symbols, ...) are accounted as counters/trace lines on the simulator
//! state and never abort a run.

use thiserror::Error;

/// Errors raised while loading a scenario/random file or resolving a policy
/// spec, never while a simulation is actually running.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{0}")]
    Scenario(String),

    #[error("unknown policy spec: {0}")]
    UnknownPolicy(String),

    #[error("frame count {0} exceeds cap of 128")]
    TooManyFrames(usize),

    #[error("parse error at line {line} offset {offset}: {kind}")]
    Parse {
        kind: &'static str,
        line: usize,
        offset: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
