//! Function definition and calls
//!
//! A function definition parses its name and parameter list, skips the body,
//! and stores the body's raw source text on the function value. A call builds
//! a fresh call-frame value holding `this`, the bound parameters, and a
//! `return` slot, pushes it on the scope stack, and either invokes the native
//! callback or re-lexes the stored body.

use std::rc::Rc;

use crate::error::ScriptError;
use crate::lexer::Lexer;
use crate::runtime::value::{Slot, Value, ValueRef, RETURN_VAR};
use crate::token::TokenKind;

use super::Interpreter;

impl Interpreter {
    /// Parses `(name, name, ...)` into empty children of `func`.
    pub(crate) fn parse_function_arguments(&mut self, func: &ValueRef) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::Punct('('))?;
        while self.lex.kind != TokenKind::Punct(')') {
            let param = self.lex.token_str.clone();
            func.borrow_mut()
                .add_child_no_duplicate(&param, Value::undefined().into_ref());
            self.lex.consume(TokenKind::Id)?;
            if self.lex.kind != TokenKind::Punct(')') {
                self.lex.consume(TokenKind::Punct(','))?;
            }
        }
        self.lex.consume(TokenKind::Punct(')'))
    }

    /// Parses a (possibly anonymous) function definition, capturing the body
    /// text from its opening `{` through the matching `}`.
    pub(crate) fn parse_function_definition(&mut self) -> Result<Slot, ScriptError> {
        self.lex.consume(TokenKind::Function)?;
        let mut name = String::new();
        if self.lex.kind == TokenKind::Id {
            name = self.lex.token_str.clone();
            self.lex.consume(TokenKind::Id)?;
        }
        let func = Value::function().into_ref();
        self.parse_function_arguments(&func)?;
        let body_start = self.lex.token_start;
        let mut no_execute = false;
        self.block(&mut no_execute)?;
        let body = self.lex.sub_string(body_start);
        func.borrow_mut().set_function_body(body);
        Ok(Slot::named(name, func))
    }

    /// Runs a call. `parent` is the receiver when this is a method call; it
    /// becomes `this` in the frame. With execution off, the argument list is
    /// scanned and the function handle passed back untouched.
    pub(crate) fn function_call(
        &mut self,
        execute: &mut bool,
        function: Slot,
        parent: Option<ValueRef>,
    ) -> Result<Slot, ScriptError> {
        if !*execute {
            self.lex.consume(TokenKind::Punct('('))?;
            while self.lex.kind != TokenKind::Punct(')') && self.lex.kind != TokenKind::Eof {
                self.base(execute)?;
                if self.lex.kind != TokenKind::Punct(')') {
                    self.lex.consume(TokenKind::Punct(','))?;
                }
            }
            self.lex.consume(TokenKind::Punct(')'))?;
            return Ok(function);
        }
        if !function.get().borrow().is_function() {
            return Err(ScriptError::NotAFunction(function.name.clone()));
        }
        self.lex.consume(TokenKind::Punct('('))?;
        let frame = Value::function().into_ref();
        if let Some(this) = &parent {
            frame
                .borrow_mut()
                .add_child_no_duplicate("this", Rc::clone(this));
        }
        // bind arguments to the formal parameter names, in order
        let params = {
            let f = function.get();
            let names = f.borrow().child_names();
            names
        };
        for param in &params {
            let argument = self.base(execute)?;
            if *execute {
                let target = argument.get();
                let passed = if target.borrow().is_basic() {
                    // pass by value
                    target.borrow().deep_copy()
                } else {
                    // pass by reference
                    Rc::clone(&target)
                };
                frame.borrow_mut().add_child(param, passed);
            }
            if self.lex.kind != TokenKind::Punct(')') {
                self.lex.consume(TokenKind::Punct(','))?;
            }
        }
        self.lex.consume(TokenKind::Punct(')'))?;
        frame
            .borrow_mut()
            .add_child(RETURN_VAR, Value::undefined().into_ref());
        self.scopes.push(Rc::clone(&frame));
        self.call_stack
            .push(format!("{} from {}", function.name, self.lex.current_position()));

        let native = {
            let f = function.get();
            let callback = f.borrow().native_fn();
            callback
        };
        let outcome = if let Some(callback) = native {
            callback(self, &frame)
        } else {
            let body = {
                let f = function.get();
                let text = f.borrow().get_string();
                text
            };
            let old_lex = std::mem::replace(&mut self.lex, Lexer::new(&body));
            let result = self.block(execute);
            self.lex = old_lex;
            // `return` clears the flag; restore it for our caller
            *execute = true;
            result
        };

        self.call_stack.pop();
        self.scopes.pop();
        let returned = frame.borrow_mut().remove_child_named(RETURN_VAR);
        outcome?;
        Ok(Slot::unowned(
            returned.unwrap_or_else(|| Value::undefined().into_ref()),
        ))
    }
}
