//! CLI front end for the coursesim simulators.

mod commands;
mod scenario;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coursesim")]
#[command(about = "Deterministic IOSCH/SCHED/MMU/LNK coursework simulators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Disk I/O request scheduler
    Iosch {
        /// Seek policy: N (FIFO), S (SSTF), L (LOOK), C (CLOOK), F (FLOOK)
        #[arg(short = 's')]
        policy: char,

        /// Scenario file: lines of "<arrival> <track>"
        scenario: PathBuf,
    },

    /// Preemptive CPU process scheduler
    Sched {
        /// Print the per-transition trace
        #[arg(short = 'v', default_value_t = false)]
        verbose: bool,

        /// Policy spec: F|L|S|R<q>|P<q>[:L]|E<q>[:L]
        #[arg(short = 's')]
        policy: String,

        /// Scenario file: lines of "<AT> <TC> <CB> <IO>"
        scenario: PathBuf,

        /// Random file: leading count, then that many integers
        randomfile: PathBuf,
    },

    /// Virtual memory manager
    Mmu {
        /// Number of physical frames (cap 128)
        #[arg(short = 'f')]
        frames: usize,

        /// Pager: f (FIFO), r (Random), c (Clock), e (NRU), a (Aging), w (WorkingSet)
        #[arg(short = 'a')]
        pager: char,

        /// Trace categories, any subset of OPFSxyfa
        #[arg(short = 'o')]
        trace: Option<String>,

        /// Scenario file: process/VMA declarations then instruction stream
        scenario: PathBuf,

        /// Random file: leading count, then that many integers
        randomfile: PathBuf,
    },

    /// Two-pass relocating linker
    Lnk {
        /// Module file
        module_file: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Iosch { policy, scenario } => commands::iosch::run(policy, &scenario),
        Commands::Sched {
            verbose,
            policy,
            scenario,
            randomfile,
        } => commands::sched::run(verbose, &policy, &scenario, &randomfile),
        Commands::Mmu {
            frames,
            pager,
            trace,
            scenario,
            randomfile,
        } => commands::mmu::run(frames, pager, trace.as_deref(), &scenario, &randomfile),
        Commands::Lnk { module_file } => commands::lnk::run(&module_file),
    }
}
