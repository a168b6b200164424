pub mod iosch;
pub mod lnk;
pub mod mmu;
pub mod sched;

use coursesim_core::SimError;

/// Scenario/config errors (spec.md §7) print to stderr and exit non-zero;
/// they never reach a panic.
pub fn fail(err: SimError) -> ! {
    eprintln!("coursesim: {err}");
    std::process::exit(1);
}
