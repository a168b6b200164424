//! LNK pass1/pass2 analysis (spec §4.4), operating over already-parsed
//! [`RawModule`]s rather than re-tokenizing the source a second time.

use std::collections::BTreeMap;

use super::entities::{RawModule, Symbol, MACHINE_SIZE};
use super::parser::parse_modules;
use crate::error::SimError;

/// Everything a caller needs to print: warnings in emission order, the
/// symbol table listing, the memory map body, and trailing unused-symbol
/// warnings — mirroring the original's two separately-printed sections.
#[derive(Debug, Clone, Default)]
pub struct LinkResult {
    pub pass1_warnings: Vec<String>,
    pub symbol_table_lines: Vec<String>,
    pub memory_map_lines: Vec<String>,
    pub pass2_trailing_warnings: Vec<String>,
}

pub fn link(source: &str) -> Result<LinkResult, SimError> {
    let modules = parse_modules(source)?;
    let (pass1_warnings, symbol_table_lines, mut symtab) = pass1(&modules);
    let (memory_map_lines, pass2_trailing_warnings) = pass2(&modules, &mut symtab);
    Ok(LinkResult {
        pass1_warnings,
        symbol_table_lines,
        memory_map_lines,
        pass2_trailing_warnings,
    })
}

fn pass1(modules: &[RawModule]) -> (Vec<String>, Vec<String>, BTreeMap<String, Symbol>) {
    let mut symtab: BTreeMap<String, Symbol> = BTreeMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut warnings = Vec::new();
    let mut total_instructions: i64 = 0;

    for (module_idx, module) in modules.iter().enumerate() {
        let module_num = module_idx + 1;
        let base_addr = total_instructions;

        for (name, rel_addr) in &module.defs {
            if let Some(existing) = symtab.get_mut(name) {
                existing.redefined = true;
                warnings.push(format!("Module {module_num}: {name} redefined and ignored"));
            } else {
                symtab.insert(
                    name.clone(),
                    Symbol {
                        name: name.clone(),
                        rel_addr: *rel_addr,
                        abs_addr: base_addr + rel_addr,
                        module_num,
                        used: false,
                        redefined: false,
                    },
                );
                order.push(name.clone());
            }
        }

        let code_count = module.code_count();
        for sym in symtab.values_mut() {
            if sym.module_num == module_num && sym.rel_addr >= code_count {
                warnings.push(format!(
                    "Module {}: {} too big {} (max={}) assume zero relative",
                    module_num,
                    sym.name,
                    sym.rel_addr,
                    code_count - 1
                ));
                sym.rel_addr = 0;
                sym.abs_addr = base_addr;
            }
        }

        total_instructions += code_count;
    }

    let symbol_table_lines = order
        .iter()
        .map(|name| {
            let sym = &symtab[name];
            let suffix = if sym.redefined {
                " Error: This variable is multiple times defined; first value used"
            } else {
                ""
            };
            format!("{}={}{}", sym.name, sym.abs_addr, suffix)
        })
        .collect();

    (warnings, symbol_table_lines, symtab)
}

fn pass2(modules: &[RawModule], symtab: &mut BTreeMap<String, Symbol>) -> (Vec<String>, Vec<String>) {
    use super::entities::AddressMode;

    let mut lines = Vec::new();
    let mut total_instructions: i64 = 0;

    for (module_idx, module) in modules.iter().enumerate() {
        let module_num = module_idx + 1;
        let base_addr = total_instructions;
        let code_count = module.code_count();
        let mut use_list: Vec<(String, bool)> = module.uses.iter().cloned().map(|s| (s, false)).collect();

        for (i, instr) in module.instructions.iter().enumerate() {
            let addr = base_addr + i as i64;
            let opcode = instr.value / 1000;
            let operand = instr.value % 1000;

            let (resolved, error) = match instr.mode {
                AddressMode::Immediate => {
                    if instr.value >= 10000 {
                        (9999, " Error: Illegal immediate value; treated as 9999".to_string())
                    } else {
                        (instr.value, String::new())
                    }
                }
                AddressMode::External => {
                    if opcode >= 10 {
                        (9999, " Error: Illegal opcode; treated as 9999".to_string())
                    } else if operand >= use_list.len() as i64 {
                        (instr.value, " Error: External address exceeds length of uselist; treated as immediate".to_string())
                    } else {
                        let (sym_name, used_flag) = &mut use_list[operand as usize];
                        *used_flag = true;
                        match symtab.get_mut(sym_name) {
                            None => (opcode * 1000, format!(" Error: {sym_name} is not defined; zero used")),
                            Some(sym) => {
                                sym.used = true;
                                (opcode * 1000 + sym.abs_addr, String::new())
                            }
                        }
                    }
                }
                AddressMode::Absolute => {
                    if opcode >= 10 {
                        (9999, " Error: Illegal opcode; treated as 9999".to_string())
                    } else if operand >= MACHINE_SIZE {
                        (opcode * 1000, " Error: Absolute address exceeds machine size; zero used".to_string())
                    } else {
                        (instr.value, String::new())
                    }
                }
                AddressMode::Relative => {
                    if opcode >= 10 {
                        (9999, " Error: Illegal opcode; treated as 9999".to_string())
                    } else if operand >= code_count {
                        (opcode * 1000 + base_addr, " Error: Relative address exceeds module size; zero used".to_string())
                    } else {
                        (opcode * 1000 + base_addr + operand, String::new())
                    }
                }
            };

            lines.push(format!("{addr:03}: {resolved:04}{error}"));
        }

        for (name, used) in &use_list {
            if !used {
                lines.push(format!("Module {module_num}: {name} appeared in the uselist but was not actually used"));
            }
        }

        total_instructions += code_count;
    }

    let trailing_warnings = symtab
        .values()
        .filter(|sym| !sym.used)
        .map(|sym| format!("Module {}: {} was defined but never used", sym.module_num, sym.name))
        .collect();

    (lines, trailing_warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_module_absolute_reference() {
        let src = "1 a 0\n0\n1\nA 2000\n";
        let result = link(src).unwrap();
        assert_eq!(result.symbol_table_lines, vec!["a=0".to_string()]);
        assert_eq!(result.memory_map_lines, vec!["000: 2000".to_string()]);
    }

    #[test]
    fn redefinition_is_flagged_and_first_value_wins() {
        let src = "1 a 0\n0\n0\n1 a 5\n0\n0\n";
        let result = link(src).unwrap();
        assert!(result.pass1_warnings[0].contains("redefined and ignored"));
        assert!(result.symbol_table_lines[0].contains("Error: This variable is multiple times defined"));
    }

    #[test]
    fn external_reference_resolves_through_uselist() {
        let src = "1 a 0\n0\n0\n0 1 a\n1\nE 2000\n";
        let result = link(src).unwrap();
        // module 2 uses "a" defined at absolute 0 in module 1.
        assert_eq!(result.memory_map_lines, vec!["000: 2000".to_string()]);
        assert!(result.pass2_trailing_warnings.is_empty());
    }

    #[test]
    fn unused_definition_is_warned_about() {
        let src = "1 a 0\n0\n0\n";
        let result = link(src).unwrap();
        assert!(result.pass2_trailing_warnings[0].contains("was defined but never used"));
    }

    #[test]
    fn relative_address_exceeding_module_size_zeroes_operand() {
        let src = "0\n0\n1\nR 1005\n";
        let result = link(src).unwrap();
        assert!(result.memory_map_lines[0].contains("Relative address exceeds module size"));
    }
}
