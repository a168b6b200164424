//! LNK module parser (spec §4.4), built on the shared tokenizer contract.

use crate::error::SimError;
use crate::tokenizer::{Token, Tokenizer};

use super::entities::{
    AddressMode, RawInstruction, RawModule, MACHINE_SIZE, MAX_SYMBOLS_PER_MODULE, MAX_SYMBOL_LENGTH,
    MAX_USES_PER_MODULE,
};

fn parse_err(kind: &'static str, token: &Token) -> SimError {
    SimError::Parse {
        kind,
        line: token.line,
        offset: token.offset,
    }
}

/// Pulls the next token, synthesizing an empty one at end-of-file so every
/// reader below has a uniform `(line, offset)` to report errors against.
fn next_or_eof(tokenizer: &mut Tokenizer) -> Token {
    match tokenizer.next_token() {
        Some(t) => t,
        None => {
            let (line, offset) = tokenizer.eof_position();
            Token {
                value: String::new(),
                line,
                offset,
            }
        }
    }
}

fn read_int(tokenizer: &mut Tokenizer) -> Result<i64, SimError> {
    let token = next_or_eof(tokenizer);
    token.value.parse::<i64>().map_err(|_| parse_err("NUM_EXPECTED", &token))
}

fn read_symbol(tokenizer: &mut Tokenizer) -> Result<String, SimError> {
    let token = next_or_eof(tokenizer);
    if token.value.is_empty() {
        return Err(parse_err("SYM_EXPECTED", &token));
    }
    if token.value.len() > MAX_SYMBOL_LENGTH {
        return Err(parse_err("SYM_TOO_LONG", &token));
    }
    let mut chars = token.value.chars();
    let first = chars.next().unwrap();
    if !first.is_alphabetic() {
        return Err(parse_err("SYM_EXPECTED", &token));
    }
    if !chars.all(|c| c.is_alphanumeric()) {
        return Err(parse_err("SYM_EXPECTED", &token));
    }
    Ok(token.value)
}

fn read_address_mode(tokenizer: &mut Tokenizer) -> Result<AddressMode, SimError> {
    let token = next_or_eof(tokenizer);
    if token.value.is_empty() {
        return Err(parse_err("ADDR_EXPECTED", &token));
    }
    AddressMode::from_char(token.value.chars().next().unwrap()).ok_or_else(|| parse_err("ADDR_EXPECTED", &token))
}

/// Parse the full module list. Each module's def/use/code sections are
/// validated syntactically here; `pass1`/`pass2` reason about the already
/// validated structure rather than re-tokenizing the source twice, unlike
/// the original two-pass reader.
pub fn parse_modules(source: &str) -> Result<Vec<RawModule>, SimError> {
    let mut tokenizer = Tokenizer::new(source);
    let mut modules = Vec::new();
    let mut total_instructions: i64 = 0;

    loop {
        let defcount_token = next_or_eof(&mut tokenizer);
        if defcount_token.value.is_empty() {
            break;
        }
        let defcount: i64 = defcount_token
            .value
            .parse()
            .map_err(|_| parse_err("NUM_EXPECTED", &defcount_token))?;
        if defcount < 0 {
            return Err(parse_err("NUM_EXPECTED", &defcount_token));
        }
        if defcount as usize > MAX_SYMBOLS_PER_MODULE {
            return Err(parse_err("TOO_MANY_DEF_IN_MODULE", &defcount_token));
        }

        let mut defs = Vec::with_capacity(defcount as usize);
        for _ in 0..defcount {
            let name = read_symbol(&mut tokenizer)?;
            let rel_addr = read_int(&mut tokenizer)?;
            defs.push((name, rel_addr));
        }

        let usecount_token = next_or_eof(&mut tokenizer);
        let usecount: i64 = usecount_token
            .value
            .parse()
            .map_err(|_| parse_err("NUM_EXPECTED", &usecount_token))?;
        if usecount as usize > MAX_USES_PER_MODULE {
            return Err(parse_err("TOO_MANY_USE_IN_MODULE", &usecount_token));
        }

        let mut uses = Vec::with_capacity(usecount as usize);
        for _ in 0..usecount {
            uses.push(read_symbol(&mut tokenizer)?);
        }

        let codecount_token = next_or_eof(&mut tokenizer);
        let codecount: i64 = codecount_token
            .value
            .parse()
            .map_err(|_| parse_err("NUM_EXPECTED", &codecount_token))?;
        if total_instructions + codecount > MACHINE_SIZE {
            return Err(parse_err("TOO_MANY_INSTR", &codecount_token));
        }

        let mut instructions = Vec::with_capacity(codecount as usize);
        for _ in 0..codecount {
            let mode = read_address_mode(&mut tokenizer)?;
            let value = read_int(&mut tokenizer)?;
            instructions.push(RawInstruction { mode, value });
        }

        total_instructions += codecount;
        modules.push(RawModule { defs, uses, instructions });
    }

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_module() {
        let src = "1 a 0\n1 b\nA 2000\nR 3000\n";
        let modules = parse_modules(src).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].defs, vec![("a".to_string(), 0)]);
        assert_eq!(modules[0].uses, vec!["b".to_string()]);
        assert_eq!(modules[0].instructions.len(), 2);
    }

    #[test]
    fn rejects_oversized_symbol() {
        let src = "1 areallylongsymbolnamehere 0\n0\n0\n";
        let err = parse_modules(src).unwrap_err();
        assert!(matches!(err, SimError::Parse { kind: "SYM_TOO_LONG", .. }));
    }

    #[test]
    fn rejects_bad_address_mode() {
        let src = "0\n0\n1\nZ 1000\n";
        let err = parse_modules(src).unwrap_err();
        assert!(matches!(err, SimError::Parse { kind: "ADDR_EXPECTED", .. }));
    }

    #[test]
    fn rejects_too_many_defs() {
        let src = "17\n";
        let err = parse_modules(src).unwrap_err();
        assert!(matches!(err, SimError::Parse { kind: "TOO_MANY_DEF_IN_MODULE", .. }));
    }
}
