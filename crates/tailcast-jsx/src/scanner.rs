//! Character cursor over generated source.
//!
//! `Vec<char>` for index-based navigation with rewind support; positions
//! are converted to line/column only when an error is reported.

use crate::error::CompileError;

pub struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end.min(self.chars.len())].iter().collect()
    }

    /// Build an error at the current position.
    pub fn error(&self, message: impl Into<String>) -> CompileError {
        self.error_at(self.pos, message)
    }

    pub fn error_at(&self, pos: usize, message: impl Into<String>) -> CompileError {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..pos.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        CompileError {
            message: message.into(),
            line,
            column,
        }
    }

    // ── Trivia ──────────────────────────────────────────────────

    /// Skip spaces, tabs and newlines. Returns whether a newline was crossed.
    pub fn skip_ws(&mut self) -> bool {
        let mut newline = false;
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            newline |= c == '\n';
            self.pos += 1;
        }
        newline
    }

    /// Skip spaces and tabs only.
    pub fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace() && c != '\n' && c != '\r') {
            self.pos += 1;
        }
    }

    /// Skip whitespace and comments. Returns whether a newline was crossed.
    pub fn skip_trivia(&mut self) -> Result<bool, CompileError> {
        let mut newline = false;
        loop {
            newline |= self.skip_ws();
            if self.starts_with("//") {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if self.starts_with("/*") {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.eof() {
                        return Err(self.error_at(start, "Unterminated comment"));
                    }
                    if self.eat_str("*/") {
                        break;
                    }
                    if self.bump() == Some('\n') {
                        newline = true;
                    }
                }
            } else {
                return Ok(newline);
            }
        }
    }

    // ── Tokens ──────────────────────────────────────────────────

    pub fn at_ident_start(&self) -> bool {
        matches!(self.peek(), Some(c) if is_ident_start(c))
    }

    pub fn read_ident(&mut self) -> Option<String> {
        if !self.at_ident_start() {
            return None;
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.pos += 1;
        }
        Some(self.slice(start, self.pos))
    }

    /// Whether the cursor sits on `word` as a whole word.
    pub fn at_keyword(&self, word: &str) -> bool {
        if !self.starts_with(word) {
            return false;
        }
        if self.pos > 0 && is_ident_char(self.chars[self.pos - 1]) {
            return false;
        }
        !matches!(self.chars.get(self.pos + word.chars().count()), Some(&c) if is_ident_char(c))
    }

    pub fn eat_keyword(&mut self, word: &str) -> bool {
        if self.at_keyword(word) {
            self.pos += word.chars().count();
            true
        } else {
            false
        }
    }

    /// Read a JS string literal starting at the opening quote, decoding escapes.
    pub fn read_string(&mut self) -> Result<String, CompileError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error("Expected string literal"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error_at(start, "Unterminated string constant")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\n') => {}
                    Some(c) => out.push(c),
                    None => return Err(self.error_at(start, "Unterminated string constant")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// Read a JSX attribute string: no escapes, may span lines.
    pub fn read_jsx_string(&mut self) -> Result<String, CompileError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error("Expected string literal"));
        };
        let from = self.pos;
        while let Some(c) = self.bump() {
            if c == quote {
                return Ok(self.slice(from, self.pos - 1));
            }
        }
        Err(self.error_at(start, "Unterminated string constant"))
    }

    /// Read a numeric literal (decimal, with optional fraction/exponent, or hex).
    pub fn read_number(&mut self) -> Option<f64> {
        let start = self.pos;
        if self.eat_str("0x") || self.eat_str("0X") {
            let digits_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit() || c == '_') {
                self.pos += 1;
            }
            let digits: String = self.slice(digits_start, self.pos).replace('_', "");
            return u64::from_str_radix(&digits, 16).ok().map(|v| v as f64);
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '_' || c == '.') {
            self.pos += 1;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.pos += 1;
            self.eat('+');
            self.eat('-');
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text = self.slice(start, self.pos).replace('_', "");
        text.parse::<f64>().ok()
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
