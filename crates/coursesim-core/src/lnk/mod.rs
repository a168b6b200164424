//! LNK — two-pass module linker (spec §4.4).

pub mod entities;
pub mod linker;
pub mod parser;

pub use entities::{AddressMode, RawInstruction, RawModule, Symbol, MACHINE_SIZE};
pub use linker::{link, LinkResult};
pub use parser::parse_modules;
