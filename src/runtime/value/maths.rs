//! Arithmetic and comparison over value nodes
//!
//! Operators are identified by their lexical token. Strict equality compares
//! type tags before contents; undefined pairs short out; numeric operands
//! (null included) use the integer path unless a double is involved; arrays
//! and objects compare by identity; everything else falls through to string
//! coercion. Unsupported combinations raise.

use crate::error::ScriptError;
use crate::token::TokenKind;

use super::Value;

impl Value {
    /// Applies `op` to `self` and `b`, producing a fresh value.
    pub fn maths_op(&self, b: &Value, op: TokenKind) -> Result<Value, ScriptError> {
        let a = self;

        // Type equality checks the tags first, then the contents via `==`.
        if op == TokenKind::TypeEqual || op == TokenKind::NotTypeEqual {
            let mut eql = a.kind() == b.kind();
            if eql {
                eql = a.maths_op(b, TokenKind::Equal)?.get_bool();
            }
            return Ok(Value::from_bool(if op == TokenKind::TypeEqual {
                eql
            } else {
                !eql
            }));
        }

        if a.is_undefined() && b.is_undefined() {
            return Ok(match op {
                TokenKind::Equal => Value::from_bool(true),
                TokenKind::NotEqual => Value::from_bool(false),
                _ => Value::undefined(),
            });
        }

        if (a.is_numeric() || a.is_undefined()) && (b.is_numeric() || b.is_undefined()) {
            if !a.is_double() && !b.is_double() {
                // integer path
                let da = a.get_int();
                let db = b.get_int();
                return match op {
                    TokenKind::Punct('+') => Ok(Value::int(da.wrapping_add(db))),
                    TokenKind::Punct('-') => Ok(Value::int(da.wrapping_sub(db))),
                    TokenKind::Punct('*') => Ok(Value::int(da.wrapping_mul(db))),
                    TokenKind::Punct('/') => {
                        if db == 0 {
                            return Err(ScriptError::DivisionByZero);
                        }
                        Ok(Value::int(da.wrapping_div(db)))
                    }
                    TokenKind::Punct('&') => Ok(Value::int(da & db)),
                    TokenKind::Punct('|') => Ok(Value::int(da | db)),
                    TokenKind::Punct('^') => Ok(Value::int(da ^ db)),
                    TokenKind::Punct('%') => {
                        if db == 0 {
                            return Err(ScriptError::DivisionByZero);
                        }
                        Ok(Value::int(da.wrapping_rem(db)))
                    }
                    TokenKind::Equal => Ok(Value::from_bool(da == db)),
                    TokenKind::NotEqual => Ok(Value::from_bool(da != db)),
                    TokenKind::Punct('<') => Ok(Value::from_bool(da < db)),
                    TokenKind::LessEqual => Ok(Value::from_bool(da <= db)),
                    TokenKind::Punct('>') => Ok(Value::from_bool(da > db)),
                    TokenKind::GreaterEqual => Ok(Value::from_bool(da >= db)),
                    _ => Err(ScriptError::UnsupportedOperation {
                        op: op.to_string(),
                        datatype: "Int".to_string(),
                    }),
                };
            }
            // double path: no bitwise ops, no modulo
            let da = a.get_double();
            let db = b.get_double();
            return match op {
                TokenKind::Punct('+') => Ok(Value::double(da + db)),
                TokenKind::Punct('-') => Ok(Value::double(da - db)),
                TokenKind::Punct('*') => Ok(Value::double(da * db)),
                TokenKind::Punct('/') => Ok(Value::double(da / db)),
                TokenKind::Equal => Ok(Value::from_bool(da == db)),
                TokenKind::NotEqual => Ok(Value::from_bool(da != db)),
                TokenKind::Punct('<') => Ok(Value::from_bool(da < db)),
                TokenKind::LessEqual => Ok(Value::from_bool(da <= db)),
                TokenKind::Punct('>') => Ok(Value::from_bool(da > db)),
                TokenKind::GreaterEqual => Ok(Value::from_bool(da >= db)),
                _ => Err(ScriptError::UnsupportedOperation {
                    op: op.to_string(),
                    datatype: "Double".to_string(),
                }),
            };
        }

        if a.is_array() || a.is_object() {
            // identity only
            let same = std::ptr::eq(a as *const Value, b as *const Value);
            return match op {
                TokenKind::Equal => Ok(Value::from_bool(same)),
                TokenKind::NotEqual => Ok(Value::from_bool(!same)),
                _ => Err(ScriptError::UnsupportedOperation {
                    op: op.to_string(),
                    datatype: a.kind().datatype_name().to_string(),
                }),
            };
        }

        // string path
        let da = a.get_string();
        let db = b.get_string();
        match op {
            TokenKind::Punct('+') => Ok(Value::string(da + &db)),
            TokenKind::Equal => Ok(Value::from_bool(da == db)),
            TokenKind::NotEqual => Ok(Value::from_bool(da != db)),
            TokenKind::Punct('<') => Ok(Value::from_bool(da < db)),
            TokenKind::LessEqual => Ok(Value::from_bool(da <= db)),
            TokenKind::Punct('>') => Ok(Value::from_bool(da > db)),
            TokenKind::GreaterEqual => Ok(Value::from_bool(da >= db)),
            _ => Err(ScriptError::UnsupportedOperation {
                op: op.to_string(),
                datatype: "string".to_string(),
            }),
        }
    }
}
