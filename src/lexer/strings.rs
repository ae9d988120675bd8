//! Literal scanning for the VJS lexer
//!
//! String literals come in two flavours with different escape sets: double
//! quotes understand `\n`, `\"` and `\\`; single quotes additionally accept
//! `\a`, `\r`, `\t`, `\'`, two-digit hex (`\xHH`) and three-digit octal
//! escapes. An unknown escape yields the escaped character itself.

use crate::lexer::{is_hexadecimal, is_numeric, Lexer};
use crate::token::TokenKind;

fn hex_value(text: &str) -> u8 {
    let mut value: u32 = 0;
    for ch in text.chars() {
        match ch.to_digit(16) {
            Some(d) => value = value * 16 + d,
            None => break,
        }
    }
    value as u8
}

fn octal_value(text: &str) -> u8 {
    let mut value: u32 = 0;
    for ch in text.chars() {
        match ch.to_digit(8) {
            Some(d) => value = value * 8 + d,
            None => break,
        }
    }
    value as u8
}

impl Lexer {
    /// Scans a string literal. `quote` is the delimiter character, already
    /// positioned under the cursor.
    pub(crate) fn read_string(&mut self, quote: char) {
        self.advance_char();
        while self.curr != '\0' && self.curr != quote {
            if self.curr == '\\' {
                self.advance_char();
                match self.curr {
                    'n' => self.token_str.push('\n'),
                    '"' if quote == '"' => self.token_str.push('"'),
                    'a' if quote == '\'' => self.token_str.push('\u{0007}'),
                    'r' if quote == '\'' => self.token_str.push('\r'),
                    't' if quote == '\'' => self.token_str.push('\t'),
                    '\'' if quote == '\'' => self.token_str.push('\''),
                    '\\' => self.token_str.push('\\'),
                    'x' if quote == '\'' => {
                        let mut digits = String::new();
                        self.advance_char();
                        digits.push(self.curr);
                        self.advance_char();
                        digits.push(self.curr);
                        self.token_str.push(hex_value(&digits) as char);
                    }
                    ch if quote == '\'' && ('0'..='7').contains(&ch) => {
                        let mut digits = String::new();
                        digits.push(ch);
                        self.advance_char();
                        digits.push(self.curr);
                        self.advance_char();
                        digits.push(self.curr);
                        self.token_str.push(octal_value(&digits) as char);
                    }
                    other => self.token_str.push(other),
                }
            } else {
                self.token_str.push(self.curr);
            }
            self.advance_char();
        }
        self.advance_char();
        self.kind = TokenKind::Str;
    }

    /// Scans a numeric literal: decimal or hex integers, and decimal floats
    /// with an optional fraction and exponent.
    pub(crate) fn read_number(&mut self) {
        let mut is_hex = false;
        if self.curr == '0' {
            self.token_str.push(self.curr);
            self.advance_char();
        }
        if self.curr == 'x' {
            is_hex = true;
            self.token_str.push(self.curr);
            self.advance_char();
        }
        self.kind = TokenKind::Int;
        while is_numeric(self.curr) || (is_hex && is_hexadecimal(self.curr)) {
            self.token_str.push(self.curr);
            self.advance_char();
        }
        if !is_hex && self.curr == '.' {
            self.kind = TokenKind::Float;
            self.token_str.push('.');
            self.advance_char();
            while is_numeric(self.curr) {
                self.token_str.push(self.curr);
                self.advance_char();
            }
        }
        if !is_hex && (self.curr == 'e' || self.curr == 'E') {
            self.kind = TokenKind::Float;
            self.token_str.push(self.curr);
            self.advance_char();
            if self.curr == '-' {
                self.token_str.push(self.curr);
                self.advance_char();
            }
            while is_numeric(self.curr) {
                self.token_str.push(self.curr);
                self.advance_char();
            }
        }
    }
}
