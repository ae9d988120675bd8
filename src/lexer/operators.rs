//! Operator scanning for the VJS lexer
//!
//! Single characters stand for themselves; multi-character operators are
//! matched greedily (`>>>` beats `>>` beats `>`, `===` beats `==` beats `=`).

use crate::lexer::Lexer;
use crate::token::TokenKind;

impl Lexer {
    pub(crate) fn read_operator(&mut self) {
        let first = self.curr;
        if first == '\0' {
            self.kind = TokenKind::Eof;
            return;
        }
        self.kind = TokenKind::Punct(first);
        self.advance_char();
        match (first, self.curr) {
            ('=', '=') => {
                self.kind = TokenKind::Equal;
                self.advance_char();
                if self.curr == '=' {
                    self.kind = TokenKind::TypeEqual;
                    self.advance_char();
                }
            }
            ('!', '=') => {
                self.kind = TokenKind::NotEqual;
                self.advance_char();
                if self.curr == '=' {
                    self.kind = TokenKind::NotTypeEqual;
                    self.advance_char();
                }
            }
            ('<', '=') => {
                self.kind = TokenKind::LessEqual;
                self.advance_char();
            }
            ('<', '<') => {
                self.kind = TokenKind::LShift;
                self.advance_char();
                if self.curr == '=' {
                    self.kind = TokenKind::LShiftAssign;
                    self.advance_char();
                }
            }
            ('>', '=') => {
                self.kind = TokenKind::GreaterEqual;
                self.advance_char();
            }
            ('>', '>') => {
                self.kind = TokenKind::RShift;
                self.advance_char();
                if self.curr == '=' {
                    self.kind = TokenKind::RShiftAssign;
                    self.advance_char();
                } else if self.curr == '>' {
                    self.kind = TokenKind::RShiftUnsigned;
                    self.advance_char();
                }
            }
            ('+', '=') => {
                self.kind = TokenKind::PlusAssign;
                self.advance_char();
            }
            ('-', '=') => {
                self.kind = TokenKind::MinusAssign;
                self.advance_char();
            }
            ('+', '+') => {
                self.kind = TokenKind::PlusPlus;
                self.advance_char();
            }
            ('-', '-') => {
                self.kind = TokenKind::MinusMinus;
                self.advance_char();
            }
            ('&', '=') => {
                self.kind = TokenKind::AndAssign;
                self.advance_char();
            }
            ('&', '&') => {
                self.kind = TokenKind::AndAnd;
                self.advance_char();
            }
            ('|', '=') => {
                self.kind = TokenKind::OrAssign;
                self.advance_char();
            }
            ('|', '|') => {
                self.kind = TokenKind::OrOr;
                self.advance_char();
            }
            ('^', '=') => {
                self.kind = TokenKind::XorAssign;
                self.advance_char();
            }
            _ => {}
        }
    }
}
