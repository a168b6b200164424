use std::fs;
use std::path::Path;

use coursesim_core::lnk::link;

use super::fail;

pub fn run(module_file: &Path) {
    let source = match fs::read_to_string(module_file) {
        Ok(s) => s,
        Err(e) => fail(e.into()),
    };

    let result = match link(&source) {
        Ok(r) => r,
        Err(e) => fail(e),
    };

    for warning in &result.pass1_warnings {
        println!("Warning: {warning}");
    }
    println!("Symbol Table");
    for line in &result.symbol_table_lines {
        println!("{line}");
    }

    println!("\nMemory Map");
    for line in &result.memory_map_lines {
        println!("{line}");
    }
    for warning in &result.pass2_trailing_warnings {
        println!("Warning: {warning}");
    }
}
