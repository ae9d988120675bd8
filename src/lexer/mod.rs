mod operators;
mod strings;

use std::collections::HashMap;
use std::rc::Rc;

use lazy_static::lazy_static;

use crate::error::ScriptError;
use crate::token::TokenKind;

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("do", TokenKind::Do);
        map.insert("while", TokenKind::While);
        map.insert("for", TokenKind::For);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("function", TokenKind::Function);
        map.insert("return", TokenKind::Return);
        map.insert("var", TokenKind::Var);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("null", TokenKind::Null);
        map.insert("undefined", TokenKind::Undefined);
        map.insert("new", TokenKind::New);
        map
    };
}

pub(crate) fn is_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\n' || ch == '\r'
}

pub(crate) fn is_numeric(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub(crate) fn is_hexadecimal(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

pub(crate) fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Streaming lexer for VJS
///
/// Tokens are produced one at a time from a shared character buffer. A
/// sub-lexer is a `[start, end)` view over the same buffer, used to re-scan
/// loop heads, loop bodies, and function bodies without copying the source.
pub struct Lexer {
    source: Rc<Vec<char>>,
    /// Start and end of this lexer's view into the buffer.
    view_start: usize,
    view_end: usize,
    /// Read cursor; runs two characters ahead of `curr`.
    pos: usize,
    curr: char,
    next: char,

    /// Kind of the token we currently have.
    pub kind: TokenKind,
    /// Text payload of the current token (identifiers, literals).
    pub token_str: String,
    /// Offset of the current token's first character.
    pub token_start: usize,
    /// Offset of the current token's last character.
    pub token_end: usize,
    /// Offset of the previous token's last character.
    pub token_last_end: usize,
}

impl Lexer {
    /// Creates a lexer over a private copy of the whole input.
    pub fn new(input: &str) -> Self {
        let source: Rc<Vec<char>> = Rc::new(input.chars().collect());
        let view_end = source.len();
        let mut lexer = Self {
            source,
            view_start: 0,
            view_end,
            pos: 0,
            curr: '\0',
            next: '\0',
            kind: TokenKind::Eof,
            token_str: String::new(),
            token_start: 0,
            token_end: 0,
            token_last_end: 0,
        };
        lexer.reset();
        lexer
    }

    /// Creates a sub-lexer sharing `owner`'s buffer over `[start, end)`.
    fn view_of(owner: &Lexer, start: usize, end: usize) -> Self {
        let mut lexer = Self {
            source: Rc::clone(&owner.source),
            view_start: start,
            view_end: end,
            pos: 0,
            curr: '\0',
            next: '\0',
            kind: TokenKind::Eof,
            token_str: String::new(),
            token_start: 0,
            token_end: 0,
            token_last_end: 0,
        };
        lexer.reset();
        lexer
    }

    /// Rewinds to the start of the view and primes the first token.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.pos = self.view_start;
        self.token_start = 0;
        self.token_end = 0;
        self.token_last_end = 0;
        self.curr = '\0';
        self.next = '\0';
        self.advance_char();
        self.advance_char();
        self.next_token();
    }

    pub(crate) fn advance_char(&mut self) {
        self.curr = self.next;
        self.next = if self.pos < self.view_end {
            self.source[self.pos]
        } else {
            '\0'
        };
        self.pos += 1;
    }

    /// Advances past the current token, failing if it is not `expected`.
    pub fn consume(&mut self, expected: TokenKind) -> Result<(), ScriptError> {
        if self.kind != expected {
            return Err(ScriptError::TokenMismatch {
                expected: expected.to_string(),
                found: self.kind.to_string(),
                position: self.position(self.token_start),
            });
        }
        self.next_token();
        Ok(())
    }

    /// Advances past the current token unconditionally.
    pub fn advance(&mut self) {
        self.next_token();
    }

    /// Scans the next token out of the buffer.
    fn next_token(&mut self) {
        self.kind = TokenKind::Eof;
        self.token_str.clear();
        loop {
            while self.curr != '\0' && is_whitespace(self.curr) {
                self.advance_char();
            }
            if self.curr == '/' && self.next == '/' {
                while self.curr != '\0' && self.curr != '\n' {
                    self.advance_char();
                }
                self.advance_char();
                continue;
            }
            if self.curr == '/' && self.next == '*' {
                while self.curr != '\0' && !(self.curr == '*' && self.next == '/') {
                    self.advance_char();
                }
                self.advance_char();
                self.advance_char();
                continue;
            }
            break;
        }
        // record the beginning of this token
        self.token_start = self.pos.saturating_sub(2);
        if is_alpha(self.curr) {
            while is_alpha(self.curr) || is_numeric(self.curr) {
                self.token_str.push(self.curr);
                self.advance_char();
            }
            self.kind = KEYWORDS
                .get(self.token_str.as_str())
                .copied()
                .unwrap_or(TokenKind::Id);
        } else if is_numeric(self.curr) {
            self.read_number();
        } else if self.curr == '"' || self.curr == '\'' {
            self.read_string(self.curr);
        } else {
            self.read_operator();
        }
        self.token_last_end = self.token_end;
        self.token_end = self.pos.saturating_sub(3);
    }

    /// Text from `from` through the end of the previous token.
    pub fn sub_string(&self, from: usize) -> String {
        let last = (self.token_last_end + 1).min(self.view_end);
        if from >= last {
            return String::new();
        }
        self.source[from..last].iter().collect()
    }

    /// Same range as [`Lexer::sub_string`], as a re-scannable sub-lexer.
    pub fn sub_lexer(&self, from: usize) -> Lexer {
        let last = (self.token_last_end + 1).min(self.view_end);
        Lexer::view_of(self, from, last.max(from))
    }

    /// Line/column text for the character at `pos`.
    pub fn position(&self, pos: usize) -> String {
        let mut line = 1;
        let mut col = 1;
        for i in 0..pos.min(self.source.len()) {
            col += 1;
            if self.source[i] == '\n' {
                line += 1;
                col = 0;
            }
        }
        format!("(line: {}, col: {})", line, col)
    }

    /// Position of the last character consumed.
    pub fn current_position(&self) -> String {
        self.position(self.token_last_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        while lexer.kind != TokenKind::Eof {
            out.push(lexer.kind);
            lexer.advance();
        }
        out
    }

    #[test]
    fn scans_identifiers_and_keywords() {
        assert_eq!(
            kinds("var foo = true;"),
            vec![
                TokenKind::Var,
                TokenKind::Id,
                TokenKind::Punct('='),
                TokenKind::True,
                TokenKind::Punct(';'),
            ]
        );
    }

    #[test]
    fn greedy_multi_char_operators() {
        assert_eq!(
            kinds("=== == = >>> >> >= > <<= << <="),
            vec![
                TokenKind::TypeEqual,
                TokenKind::Equal,
                TokenKind::Punct('='),
                TokenKind::RShiftUnsigned,
                TokenKind::RShift,
                TokenKind::GreaterEqual,
                TokenKind::Punct('>'),
                TokenKind::LShiftAssign,
                TokenKind::LShift,
                TokenKind::LessEqual,
            ]
        );
    }

    #[test]
    fn scans_numbers() {
        let mut lexer = Lexer::new("42 0x1f 3.5 1e-3");
        assert_eq!(lexer.kind, TokenKind::Int);
        assert_eq!(lexer.token_str, "42");
        lexer.advance();
        assert_eq!(lexer.kind, TokenKind::Int);
        assert_eq!(lexer.token_str, "0x1f");
        lexer.advance();
        assert_eq!(lexer.kind, TokenKind::Float);
        assert_eq!(lexer.token_str, "3.5");
        lexer.advance();
        assert_eq!(lexer.kind, TokenKind::Float);
        assert_eq!(lexer.token_str, "1e-3");
    }

    #[test]
    fn skips_comments() {
        assert_eq!(
            kinds("a // line\n /* block \n still */ b"),
            vec![TokenKind::Id, TokenKind::Id]
        );
    }

    #[test]
    fn double_quote_escapes() {
        let lexer = Lexer::new(r#""a\n\"\\b\t""#);
        assert_eq!(lexer.kind, TokenKind::Str);
        // \t is not a double-quote escape; the backslash is dropped and the
        // escaped character kept
        assert_eq!(lexer.token_str, "a\n\"\\bt");
    }

    #[test]
    fn single_quote_escapes() {
        let lexer = Lexer::new(r"'a\t\x41\101'");
        assert_eq!(lexer.kind, TokenKind::Str);
        assert_eq!(lexer.token_str, "a\tAA");
    }

    #[test]
    fn sub_string_captures_up_to_previous_token() {
        let mut lexer = Lexer::new("{ a = 1; } next");
        let start = lexer.token_start;
        while lexer.kind != TokenKind::Id || lexer.token_str != "next" {
            lexer.advance();
        }
        assert_eq!(lexer.sub_string(start), "{ a = 1; }");
    }

    #[test]
    fn sub_lexer_rescans_fragment() {
        let mut lexer = Lexer::new("x + 1; done");
        let start = lexer.token_start;
        while lexer.kind != TokenKind::Id || lexer.token_str != "done" {
            lexer.advance();
        }
        let mut sub = lexer.sub_lexer(start);
        assert_eq!(sub.kind, TokenKind::Id);
        assert_eq!(sub.token_str, "x");
        sub.reset();
        assert_eq!(sub.token_str, "x");
        let mut seen = Vec::new();
        while sub.kind != TokenKind::Eof {
            seen.push(sub.kind);
            sub.advance();
        }
        assert_eq!(
            seen,
            vec![
                TokenKind::Id,
                TokenKind::Punct('+'),
                TokenKind::Int,
                TokenKind::Punct(';'),
            ]
        );
    }

    #[test]
    fn consume_reports_position() {
        let mut lexer = Lexer::new("foo bar");
        let err = lexer.consume(TokenKind::Int).unwrap_err();
        match err {
            ScriptError::TokenMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "INT");
                assert_eq!(found, "ID");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
