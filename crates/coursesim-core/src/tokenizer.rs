//! Shared substrate: a whitespace tokenizer yielding `(value, line, offset)`
//! triples with precise end-of-file offsets, as used by [`crate::lnk`].
//!
//! Grounded in `getToken()` from the original linker source: tokens are
//! whitespace-delimited, 1-based line and offset, and the end-of-file
//! position is one past the last character of the last line read.

/// A single whitespace-delimited token with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub line: usize,
    pub offset: usize,
}

/// Tokenizes a full in-memory buffer line by line.
pub struct Tokenizer {
    lines: Vec<String>,
    line_idx: usize,
    col: usize,
    had_trailing_newline: bool,
}

impl Tokenizer {
    pub fn new(text: &str) -> Self {
        Tokenizer {
            lines: text.lines().map(|l| l.to_string()).collect(),
            line_idx: 0,
            col: 0,
            had_trailing_newline: text.ends_with('\n'),
        }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            if self.line_idx >= self.lines.len() {
                return None;
            }

            let bytes = self.lines[self.line_idx].as_bytes();
            while self.col < bytes.len() && bytes[self.col].is_ascii_whitespace() {
                self.col += 1;
            }

            if self.col >= bytes.len() {
                self.line_idx += 1;
                self.col = 0;
                continue;
            }

            let start = self.col;
            while self.col < bytes.len() && !bytes[self.col].is_ascii_whitespace() {
                self.col += 1;
            }
            let line = &self.lines[self.line_idx];
            let value = line[start..self.col].to_string();
            return Some(Token {
                value,
                line: self.line_idx + 1,
                offset: start + 1,
            });
        }
    }

    /// The `(line, offset)` position one past the last character consumed,
    /// valid once [`Tokenizer::next_token`] has returned `None`.
    pub fn eof_position(&self) -> (usize, usize) {
        if self.lines.is_empty() {
            return (0, 1);
        }
        let last = self.lines.len();
        let last_len = self.lines[last - 1].len();
        if self.had_trailing_newline {
            (last, last_len + 1)
        } else {
            (last, last_len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_multiline_whitespace() {
        let mut t = Tokenizer::new("3 foo 12\nbar 5\n");
        let toks: Vec<Token> = std::iter::from_fn(|| t.next_token()).collect();
        assert_eq!(toks.len(), 5);
        assert_eq!(
            toks[0],
            Token {
                value: "3".into(),
                line: 1,
                offset: 1
            }
        );
        assert_eq!(
            toks[1],
            Token {
                value: "foo".into(),
                line: 1,
                offset: 3
            }
        );
        assert_eq!(
            toks[2],
            Token {
                value: "12".into(),
                line: 1,
                offset: 7
            }
        );
        assert_eq!(
            toks[3],
            Token {
                value: "bar".into(),
                line: 2,
                offset: 1
            }
        );
        assert_eq!(
            toks[4],
            Token {
                value: "5".into(),
                line: 2,
                offset: 5
            }
        );
    }

    #[test]
    fn eof_position_is_past_last_line() {
        let mut t = Tokenizer::new("a b\n");
        while t.next_token().is_some() {}
        assert_eq!(t.eof_position(), (1, 4));
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        let mut t = Tokenizer::new("");
        assert_eq!(t.next_token(), None);
    }

    #[test]
    fn skips_blank_lines() {
        let mut t = Tokenizer::new("1\n\n\n2\n");
        let toks: Vec<Token> = std::iter::from_fn(|| t.next_token()).collect();
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[1].line, 4);
    }
}
