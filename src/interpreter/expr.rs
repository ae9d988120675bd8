//! Expression evaluation
//!
//! One method per precedence level, lowest binding first:
//! `base` (assignment) -> `ternary` -> `logic` -> `condition` (comparison)
//! -> `shift` -> `expression` (additive, postfix ++/--) -> `term`
//! (multiplicative) -> `unary` (!) -> `factor`.

use std::rc::Rc;

use log::warn;

use crate::error::ScriptError;
use crate::runtime::value::{Kind, Slot, Value, ValueRef, PROTOTYPE_CLASS};
use crate::token::TokenKind;

use super::Interpreter;

impl Interpreter {
    /// Literals, identifiers with their member chains, initializers,
    /// function definitions, and `new`.
    pub(crate) fn factor(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        match self.lex.kind {
            TokenKind::Punct('(') => {
                self.lex.consume(TokenKind::Punct('('))?;
                let a = self.base(execute)?;
                self.lex.consume(TokenKind::Punct(')'))?;
                Ok(a)
            }
            TokenKind::True => {
                self.lex.advance();
                Ok(Slot::unowned(Value::from_bool(true).into_ref()))
            }
            TokenKind::False => {
                self.lex.advance();
                Ok(Slot::unowned(Value::from_bool(false).into_ref()))
            }
            TokenKind::Null => {
                self.lex.advance();
                Ok(Slot::unowned(Value::null().into_ref()))
            }
            TokenKind::Undefined => {
                self.lex.advance();
                Ok(Slot::unowned(Value::undefined().into_ref()))
            }
            TokenKind::Id => self.factor_identifier(execute),
            TokenKind::Int | TokenKind::Float => {
                let value = Value::from_number_literal(
                    &self.lex.token_str,
                    self.lex.kind == TokenKind::Float,
                );
                self.lex.advance();
                Ok(Slot::unowned(value.into_ref()))
            }
            TokenKind::Str => {
                let value = Value::string(self.lex.token_str.clone());
                self.lex.advance();
                Ok(Slot::unowned(value.into_ref()))
            }
            TokenKind::Punct('{') => self.factor_object_literal(execute),
            TokenKind::Punct('[') => self.factor_array_literal(execute),
            TokenKind::Function => {
                let func = self.parse_function_definition()?;
                if !func.name.is_empty() {
                    warn!("functions used as expressions are not meant to have a name");
                }
                Ok(func)
            }
            TokenKind::New => self.factor_new(execute),
            // nothing we understand; only the end of input is acceptable here
            _ => {
                self.lex.consume(TokenKind::Eof)?;
                Ok(Slot::default())
            }
        }
    }

    /// An identifier followed by any mix of calls, `.name` accesses, and
    /// `[...]` subscripts.
    fn factor_identifier(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let name = self.lex.token_str.clone();
        self.lex.consume(TokenKind::Id)?;
        let mut a = if *execute {
            match self.find_in_scopes(&name) {
                Some(slot) => slot,
                // not declared yet: a named transient, so that an assignment
                // can hoist it into the root scope
                None => Slot::named(name, Value::undefined().into_ref()),
            }
        } else {
            Slot::default()
        };
        // receiver of the pending method call, when there is one
        let mut parent: Option<ValueRef> = None;
        loop {
            match self.lex.kind {
                TokenKind::Punct('(') => {
                    a = self.function_call(execute, a, parent.clone())?;
                }
                TokenKind::Punct('.') => {
                    self.lex.consume(TokenKind::Punct('.'))?;
                    if *execute {
                        let member = self.lex.token_str.clone();
                        let receiver = a.get();
                        a = self.member_access(&receiver, &member);
                        parent = Some(receiver);
                    }
                    self.lex.consume(TokenKind::Id)?;
                }
                TokenKind::Punct('[') => {
                    self.lex.consume(TokenKind::Punct('['))?;
                    let index = self.base(execute)?;
                    self.lex.consume(TokenKind::Punct(']'))?;
                    if *execute {
                        let receiver = a.get();
                        let key = {
                            let idx = index.get();
                            let text = idx.borrow().get_string();
                            text
                        };
                        let child = receiver
                            .borrow_mut()
                            .find_child_or_create(&key, Kind::Undefined);
                        a = Slot::owned(Rc::clone(&receiver), key, child);
                        parent = Some(receiver);
                    }
                }
                _ => break,
            }
        }
        Ok(a)
    }

    /// `.name` lookup: own children, then the prototype chain and built-in
    /// classes, then the virtual `length`, and finally an empty child
    /// materialised on the receiver.
    fn member_access(&self, receiver: &ValueRef, name: &str) -> Slot {
        let direct = receiver
            .borrow()
            .find_child(name)
            .map(|target| Slot::owned(Rc::clone(receiver), name, target));
        if let Some(slot) = direct {
            return slot;
        }
        if let Some(slot) = self.find_in_parent_classes(receiver, name) {
            return slot;
        }
        let (is_array, is_string) = {
            let r = receiver.borrow();
            (r.is_array(), r.is_string())
        };
        if is_array && name == "length" {
            let length = receiver.borrow().get_array_length();
            return Slot::unowned(Value::int(length).into_ref());
        }
        if is_string && name == "length" {
            let length = receiver.borrow().get_string().len() as i64;
            return Slot::unowned(Value::int(length).into_ref());
        }
        let child = receiver
            .borrow_mut()
            .add_child(name, Value::undefined().into_ref());
        Slot::owned(Rc::clone(receiver), name, child)
    }

    /// `{ key: value, ... }`
    fn factor_object_literal(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let contents = Value::object().into_ref();
        self.lex.consume(TokenKind::Punct('{'))?;
        while self.lex.kind != TokenKind::Punct('}') {
            let id = self.lex.token_str.clone();
            // only strings and identifiers may name an entry
            if self.lex.kind == TokenKind::Str {
                self.lex.consume(TokenKind::Str)?;
            } else {
                self.lex.consume(TokenKind::Id)?;
            }
            self.lex.consume(TokenKind::Punct(':'))?;
            let value = self.base(execute)?;
            if *execute {
                contents.borrow_mut().add_child(&id, value.get());
            }
            if self.lex.kind != TokenKind::Punct('}') {
                self.lex.consume(TokenKind::Punct(','))?;
            }
        }
        self.lex.consume(TokenKind::Punct('}'))?;
        Ok(Slot::unowned(contents))
    }

    /// `[ value, ... ]`
    fn factor_array_literal(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let contents = Value::array().into_ref();
        self.lex.consume(TokenKind::Punct('['))?;
        let mut index = 0;
        while self.lex.kind != TokenKind::Punct(']') {
            let value = self.base(execute)?;
            if *execute {
                contents
                    .borrow_mut()
                    .add_child(&index.to_string(), value.get());
            }
            if self.lex.kind != TokenKind::Punct(']') {
                self.lex.consume(TokenKind::Punct(','))?;
            }
            index += 1;
        }
        self.lex.consume(TokenKind::Punct(']'))?;
        Ok(Slot::unowned(contents))
    }

    /// `new Name` makes an object. A function name is run as a constructor
    /// with the fresh object as `this`; any other name becomes the object's
    /// prototype, with an optional empty `()` suffix.
    fn factor_new(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        self.lex.consume(TokenKind::New)?;
        let class_name = self.lex.token_str.clone();
        self.lex.consume(TokenKind::Id)?;
        if !*execute {
            if self.lex.kind == TokenKind::Punct('(') {
                self.lex.consume(TokenKind::Punct('('))?;
                while self.lex.kind != TokenKind::Punct(')') && self.lex.kind != TokenKind::Eof {
                    self.base(execute)?;
                    if self.lex.kind != TokenKind::Punct(')') {
                        self.lex.consume(TokenKind::Punct(','))?;
                    }
                }
                self.lex.consume(TokenKind::Punct(')'))?;
            }
            return Ok(Slot::default());
        }
        let class_slot = match self.find_in_scopes(&class_name) {
            Some(slot) => slot,
            None => {
                warn!("{} is not a valid class name", class_name);
                return Ok(Slot::default());
            }
        };
        let obj = Value::object().into_ref();
        if class_slot.get().borrow().is_function() {
            self.function_call(execute, class_slot, Some(Rc::clone(&obj)))?;
        } else {
            obj.borrow_mut()
                .add_child(PROTOTYPE_CLASS, class_slot.get());
            if self.lex.kind == TokenKind::Punct('(') {
                self.lex.consume(TokenKind::Punct('('))?;
                self.lex.consume(TokenKind::Punct(')'))?;
            }
        }
        Ok(Slot::unowned(obj))
    }

    /// `!`
    pub(crate) fn unary(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        if self.lex.kind != TokenKind::Punct('!') {
            return self.factor(execute);
        }
        self.lex.consume(TokenKind::Punct('!'))?;
        let mut a = self.factor(execute)?;
        if *execute {
            let zero = Value::int(0);
            let av = a.get();
            let result = av.borrow().maths_op(&zero, TokenKind::Equal)?;
            a.assign_result(result.into_ref());
        }
        Ok(a)
    }

    /// `*`, `/`, `%`
    pub(crate) fn term(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let mut a = self.unary(execute)?;
        while matches!(
            self.lex.kind,
            TokenKind::Punct('*') | TokenKind::Punct('/') | TokenKind::Punct('%')
        ) {
            let op = self.lex.kind;
            self.lex.advance();
            let b = self.unary(execute)?;
            if *execute {
                let av = a.get();
                let bv = b.get();
                let result = av.borrow().maths_op(&bv.borrow(), op)?;
                a.assign_result(result.into_ref());
            }
        }
        Ok(a)
    }

    /// `+`, `-`, prefix `-`, and postfix `++`/`--` (which update in place
    /// and yield the updated value).
    pub(crate) fn expression(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let negate = if self.lex.kind == TokenKind::Punct('-') {
            self.lex.consume(TokenKind::Punct('-'))?;
            true
        } else {
            false
        };
        let mut a = self.term(execute)?;
        if negate && *execute {
            let zero = Value::int(0);
            let av = a.get();
            let result = zero.maths_op(&av.borrow(), TokenKind::Punct('-'))?;
            a.assign_result(result.into_ref());
        }
        while matches!(
            self.lex.kind,
            TokenKind::Punct('+')
                | TokenKind::Punct('-')
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        ) {
            let op = self.lex.kind;
            self.lex.advance();
            if op == TokenKind::PlusPlus || op == TokenKind::MinusMinus {
                if *execute {
                    let one = Value::int(1);
                    let delta = if op == TokenKind::PlusPlus {
                        TokenKind::Punct('+')
                    } else {
                        TokenKind::Punct('-')
                    };
                    let av = a.get();
                    let result = av.borrow().maths_op(&one, delta)?;
                    let result = result.into_ref();
                    a.replace_with(&result);
                }
            } else {
                let b = self.term(execute)?;
                if *execute {
                    let av = a.get();
                    let bv = b.get();
                    let result = av.borrow().maths_op(&bv.borrow(), op)?;
                    a.assign_result(result.into_ref());
                }
            }
        }
        Ok(a)
    }

    /// `<<`, `>>`, `>>>`; the left operand's node is updated in place.
    pub(crate) fn shift(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let a = self.expression(execute)?;
        if matches!(
            self.lex.kind,
            TokenKind::LShift | TokenKind::RShift | TokenKind::RShiftUnsigned
        ) {
            let op = self.lex.kind;
            self.lex.advance();
            let b = self.base(execute)?;
            if *execute {
                let amount = {
                    let bv = b.get();
                    let n = bv.borrow().get_int();
                    n
                };
                let av = a.get();
                let current = av.borrow().get_int();
                let shifted = match op {
                    TokenKind::LShift => current.wrapping_shl(amount as u32),
                    TokenKind::RShift => current.wrapping_shr(amount as u32),
                    _ => ((current as u64).wrapping_shr(amount as u32)) as i64,
                };
                av.borrow_mut().set_int(shifted);
            }
        }
        Ok(a)
    }

    /// `==`, `!=`, `===`, `!==`, `<`, `<=`, `>`, `>=`
    pub(crate) fn condition(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let mut a = self.shift(execute)?;
        while matches!(
            self.lex.kind,
            TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::TypeEqual
                | TokenKind::NotTypeEqual
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
                | TokenKind::Punct('<')
                | TokenKind::Punct('>')
        ) {
            let op = self.lex.kind;
            self.lex.advance();
            let b = self.shift(execute)?;
            if *execute {
                let av = a.get();
                let bv = b.get();
                let result = av.borrow().maths_op(&bv.borrow(), op)?;
                a.assign_result(result.into_ref());
            }
        }
        Ok(a)
    }

    /// `&`, `|`, `^`, `&&`, `||`. The logical forms short-circuit by scanning
    /// the right operand with execution off, and coerce both sides to
    /// booleans before applying the bitwise operator.
    pub(crate) fn logic(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let mut a = self.condition(execute)?;
        while matches!(
            self.lex.kind,
            TokenKind::Punct('&')
                | TokenKind::Punct('|')
                | TokenKind::Punct('^')
                | TokenKind::AndAnd
                | TokenKind::OrOr
        ) {
            let mut no_execute = false;
            let tok = self.lex.kind;
            self.lex.advance();
            let mut op = tok;
            let mut short_circuit = false;
            let mut boolean = false;
            if tok == TokenKind::AndAnd {
                op = TokenKind::Punct('&');
                short_circuit = !{
                    let av = a.get();
                    let truthy = av.borrow().get_bool();
                    truthy
                };
                boolean = true;
            } else if tok == TokenKind::OrOr {
                op = TokenKind::Punct('|');
                short_circuit = {
                    let av = a.get();
                    let truthy = av.borrow().get_bool();
                    truthy
                };
                boolean = true;
            }
            let b = self.condition(if short_circuit {
                &mut no_execute
            } else {
                &mut *execute
            })?;
            if *execute && !short_circuit {
                let (av, bv) = if boolean {
                    let left = {
                        let v = a.get();
                        let truthy = v.borrow().get_bool();
                        truthy
                    };
                    let right = {
                        let v = b.get();
                        let truthy = v.borrow().get_bool();
                        truthy
                    };
                    (
                        Value::from_bool(left).into_ref(),
                        Value::from_bool(right).into_ref(),
                    )
                } else {
                    (a.get(), b.get())
                };
                let result = av.borrow().maths_op(&bv.borrow(), op)?;
                a.assign_result(result.into_ref());
            }
        }
        Ok(a)
    }

    /// `cond ? a : b` - exactly one branch runs.
    pub(crate) fn ternary(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let mut lhs = self.logic(execute)?;
        if self.lex.kind != TokenKind::Punct('?') {
            return Ok(lhs);
        }
        self.lex.consume(TokenKind::Punct('?'))?;
        let mut no_execute = false;
        if !*execute {
            self.base(&mut no_execute)?;
            self.lex.consume(TokenKind::Punct(':'))?;
            self.base(&mut no_execute)?;
            lhs = Slot::default();
        } else {
            let first = {
                let c = lhs.get();
                let truthy = c.borrow().get_bool();
                truthy
            };
            if first {
                lhs = self.base(execute)?;
                self.lex.consume(TokenKind::Punct(':'))?;
                self.base(&mut no_execute)?;
            } else {
                self.base(&mut no_execute)?;
                self.lex.consume(TokenKind::Punct(':'))?;
                lhs = self.base(execute)?;
            }
        }
        Ok(lhs)
    }

    /// Assignment: `=`, `+=`, `-=`. Assigning to an undeclared name hoists it
    /// into the root scope.
    pub(crate) fn base(&mut self, execute: &mut bool) -> Result<Slot, ScriptError> {
        let mut lhs = self.ternary(execute)?;
        if !matches!(
            self.lex.kind,
            TokenKind::Punct('=') | TokenKind::PlusAssign | TokenKind::MinusAssign
        ) {
            return Ok(lhs);
        }
        if *execute && !lhs.is_owned() {
            if !lhs.name.is_empty() {
                let root = self.root_ref();
                let target = root.borrow_mut().add_child_no_duplicate(&lhs.name, lhs.get());
                lhs = Slot::owned(root, lhs.name.clone(), target);
            } else {
                warn!("trying to assign to an un-named expression");
            }
        }
        let op = self.lex.kind;
        self.lex.advance();
        let rhs = self.base(execute)?;
        if *execute {
            match op {
                TokenKind::Punct('=') => lhs.replace_with(&rhs.get()),
                TokenKind::PlusAssign => {
                    let lv = lhs.get();
                    let rv = rhs.get();
                    let result = lv.borrow().maths_op(&rv.borrow(), TokenKind::Punct('+'))?;
                    lhs.replace_with(&result.into_ref());
                }
                TokenKind::MinusAssign => {
                    let lv = lhs.get();
                    let rv = rhs.get();
                    let result = lv.borrow().maths_op(&rv.borrow(), TokenKind::Punct('-'))?;
                    lhs.replace_with(&result.into_ref());
                }
                _ => {}
            }
        }
        Ok(lhs)
    }
}
