//! Statement execution
//!
//! Statements mutate scopes and return nothing. Loops are run by capturing
//! sub-lexers over the condition/iterator/body ranges and re-scanning them
//! each iteration, bounded by [`super::LOOP_MAX_ITERATIONS`].

use log::warn;

use crate::error::ScriptError;
use crate::runtime::value::{Kind, Slot, Value, RETURN_VAR};
use crate::token::TokenKind;

use super::{Interpreter, LOOP_MAX_ITERATIONS};

impl Interpreter {
    /// `{ ... }`. With execution off, the body is skipped by tracking brace
    /// depth only - no values are created and no scopes touched.
    pub(crate) fn block(&mut self, execute: &mut bool) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::Punct('{'))?;
        if *execute {
            while self.lex.kind != TokenKind::Eof && self.lex.kind != TokenKind::Punct('}') {
                self.statement(execute)?;
            }
            self.lex.consume(TokenKind::Punct('}'))?;
        } else {
            let mut brackets = 1;
            while self.lex.kind != TokenKind::Eof && brackets > 0 {
                if self.lex.kind == TokenKind::Punct('{') {
                    brackets += 1;
                }
                if self.lex.kind == TokenKind::Punct('}') {
                    brackets -= 1;
                }
                self.lex.advance();
            }
        }
        Ok(())
    }

    pub(crate) fn statement(&mut self, execute: &mut bool) -> Result<(), ScriptError> {
        match self.lex.kind {
            TokenKind::Id
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Str
            | TokenKind::Punct('-') => {
                // an expression statement
                self.base(execute)?;
                self.lex.consume(TokenKind::Punct(';'))
            }
            TokenKind::Punct('{') => self.block(execute),
            // empty statements are allowed
            TokenKind::Punct(';') => self.lex.consume(TokenKind::Punct(';')),
            TokenKind::Var => self.statement_var(execute),
            TokenKind::If => self.statement_if(execute),
            TokenKind::While => self.statement_while(execute),
            TokenKind::For => self.statement_for(execute),
            TokenKind::Return => self.statement_return(execute),
            TokenKind::Function => {
                let func = self.parse_function_definition()?;
                if *execute {
                    if func.name.is_empty() {
                        warn!("functions defined at statement level are meant to have a name");
                    } else if let Some(scope) = self.scopes.last() {
                        scope
                            .borrow_mut()
                            .add_child_no_duplicate(&func.name, func.get());
                    }
                }
                Ok(())
            }
            _ => self.lex.consume(TokenKind::Eof),
        }
    }

    /// `var name [= expr][, name [= expr]]*;` - names are created in the
    /// current scope. Dotted follow-ups create nested children.
    fn statement_var(&mut self, execute: &mut bool) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::Var)?;
        while self.lex.kind != TokenKind::Punct(';') {
            let mut slot: Option<Slot> = None;
            if *execute {
                let name = self.lex.token_str.clone();
                let scope = self
                    .scopes
                    .last()
                    .cloned()
                    .unwrap_or_else(|| self.root_ref());
                let target = scope
                    .borrow_mut()
                    .find_child_or_create(&name, Kind::Undefined);
                slot = Some(Slot::owned(scope, name, target));
            }
            self.lex.consume(TokenKind::Id)?;
            while self.lex.kind == TokenKind::Punct('.') {
                self.lex.consume(TokenKind::Punct('.'))?;
                if *execute {
                    let name = self.lex.token_str.clone();
                    if let Some(previous) = slot.take() {
                        let parent = previous.get();
                        let target = parent
                            .borrow_mut()
                            .find_child_or_create(&name, Kind::Undefined);
                        slot = Some(Slot::owned(parent, name, target));
                    }
                }
                self.lex.consume(TokenKind::Id)?;
            }
            if self.lex.kind == TokenKind::Punct('=') {
                self.lex.consume(TokenKind::Punct('='))?;
                let value = self.base(execute)?;
                if *execute {
                    if let Some(slot) = &mut slot {
                        slot.replace_with(&value.get());
                    }
                }
            }
            if self.lex.kind != TokenKind::Punct(';') {
                self.lex.consume(TokenKind::Punct(','))?;
            }
        }
        self.lex.consume(TokenKind::Punct(';'))
    }

    fn statement_if(&mut self, execute: &mut bool) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::If)?;
        self.lex.consume(TokenKind::Punct('('))?;
        let cond = self.base(execute)?;
        self.lex.consume(TokenKind::Punct(')'))?;
        let taken = *execute && {
            let c = cond.get();
            let truthy = c.borrow().get_bool();
            truthy
        };
        let mut no_execute = false;
        self.statement(if taken { &mut *execute } else { &mut no_execute })?;
        if self.lex.kind == TokenKind::Else {
            self.lex.consume(TokenKind::Else)?;
            self.statement(if taken { &mut no_execute } else { &mut *execute })?;
        }
        Ok(())
    }

    /// `while (cond) body` - the condition and body ranges are captured once,
    /// then re-lexed for every further iteration.
    fn statement_while(&mut self, execute: &mut bool) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::While)?;
        self.lex.consume(TokenKind::Punct('('))?;
        let cond_start = self.lex.token_start;
        let cond = self.base(execute)?;
        let mut loop_cond = *execute && {
            let c = cond.get();
            let truthy = c.borrow().get_bool();
            truthy
        };
        let mut while_cond = self.lex.sub_lexer(cond_start);
        self.lex.consume(TokenKind::Punct(')'))?;
        let body_start = self.lex.token_start;
        let mut no_execute = false;
        self.statement(if loop_cond { &mut *execute } else { &mut no_execute })?;
        let mut while_body = self.lex.sub_lexer(body_start);

        let mut loop_count = LOOP_MAX_ITERATIONS;
        while loop_cond {
            if loop_count <= 0 {
                warn!(
                    "while loop exceeded {} iterations at {}",
                    LOOP_MAX_ITERATIONS,
                    self.lex.current_position()
                );
                return Err(ScriptError::LoopLimit);
            }
            loop_count -= 1;
            while_cond.reset();
            std::mem::swap(&mut self.lex, &mut while_cond);
            let cond = self.base(execute);
            std::mem::swap(&mut self.lex, &mut while_cond);
            let cond = cond?;
            loop_cond = *execute && {
                let c = cond.get();
                let truthy = c.borrow().get_bool();
                truthy
            };
            if loop_cond {
                while_body.reset();
                std::mem::swap(&mut self.lex, &mut while_body);
                let ran = self.statement(execute);
                std::mem::swap(&mut self.lex, &mut while_body);
                ran?;
            }
        }
        Ok(())
    }

    /// `for (init; cond; iter) body` - as `while`, with the iterator range
    /// re-run between iterations.
    fn statement_for(&mut self, execute: &mut bool) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::For)?;
        self.lex.consume(TokenKind::Punct('('))?;
        // initialisation runs once through the normal statement path
        self.statement(execute)?;
        let cond_start = self.lex.token_start;
        let cond = self.base(execute)?;
        let mut loop_cond = *execute && {
            let c = cond.get();
            let truthy = c.borrow().get_bool();
            truthy
        };
        let mut for_cond = self.lex.sub_lexer(cond_start);
        self.lex.consume(TokenKind::Punct(';'))?;
        let iter_start = self.lex.token_start;
        let mut no_execute = false;
        self.base(&mut no_execute)?;
        let mut for_iter = self.lex.sub_lexer(iter_start);
        self.lex.consume(TokenKind::Punct(')'))?;
        let body_start = self.lex.token_start;
        self.statement(if loop_cond { &mut *execute } else { &mut no_execute })?;
        let mut for_body = self.lex.sub_lexer(body_start);

        if loop_cond {
            for_iter.reset();
            std::mem::swap(&mut self.lex, &mut for_iter);
            let ran = self.base(execute);
            std::mem::swap(&mut self.lex, &mut for_iter);
            ran?;
        }
        let mut loop_count = LOOP_MAX_ITERATIONS;
        while *execute && loop_cond {
            if loop_count <= 0 {
                warn!(
                    "for loop exceeded {} iterations at {}",
                    LOOP_MAX_ITERATIONS,
                    self.lex.current_position()
                );
                return Err(ScriptError::LoopLimit);
            }
            loop_count -= 1;
            for_cond.reset();
            std::mem::swap(&mut self.lex, &mut for_cond);
            let cond = self.base(execute);
            std::mem::swap(&mut self.lex, &mut for_cond);
            let cond = cond?;
            loop_cond = {
                let c = cond.get();
                let truthy = c.borrow().get_bool();
                truthy
            };
            if *execute && loop_cond {
                for_body.reset();
                std::mem::swap(&mut self.lex, &mut for_body);
                let ran = self.statement(execute);
                std::mem::swap(&mut self.lex, &mut for_body);
                ran?;
            }
            if *execute && loop_cond {
                for_iter.reset();
                std::mem::swap(&mut self.lex, &mut for_iter);
                let ran = self.base(execute);
                std::mem::swap(&mut self.lex, &mut for_iter);
                ran?;
            }
        }
        Ok(())
    }

    /// `return [expr];` - writes the result into the current frame's return
    /// slot and turns execution off for the rest of the body.
    fn statement_return(&mut self, execute: &mut bool) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::Return)?;
        let result = if self.lex.kind != TokenKind::Punct(';') {
            Some(self.base(execute)?)
        } else {
            None
        };
        if *execute {
            let value = result
                .map(|slot| slot.get())
                .unwrap_or_else(|| Value::undefined().into_ref());
            let installed = self
                .scopes
                .last()
                .map(|scope| scope.borrow_mut().replace_child(RETURN_VAR, value))
                .unwrap_or(false);
            if !installed {
                warn!("return statement outside of a function");
            }
            *execute = false;
        }
        self.lex.consume(TokenKind::Punct(';'))
    }
}
