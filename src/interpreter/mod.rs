//! Tree-walking evaluator for VJS
//!
//! The evaluator is a recursive-descent parser that performs each
//! production's effect as it parses it. A mutable `execute` flag is threaded
//! through every level: when false, the parser still advances through tokens
//! (keeping positions correct) but creates no values and touches no scopes.
//! Loops re-scan captured source ranges through sub-lexers; function bodies
//! are captured as text at definition time and re-lexed on every call.

mod expr;
mod functions;
mod stmt;

use std::rc::Rc;

use crate::error::ScriptError;
use crate::lexer::Lexer;
use crate::runtime::value::{NativeFn, Slot, Value, ValueRef, PROTOTYPE_CLASS};
use crate::token::TokenKind;

/// Hard cap on re-scans of a single loop head.
pub const LOOP_MAX_ITERATIONS: i32 = 8192;

pub struct Interpreter {
    pub(crate) lex: Lexer,
    /// Stack of call scopes; identifier lookups search top-down before
    /// reaching the root.
    pub(crate) scopes: Vec<ValueRef>,
    /// Call-site descriptions accumulated for error reporting.
    pub(crate) call_stack: Vec<String>,
    root: ValueRef,
    string_class: ValueRef,
    array_class: ValueRef,
    object_class: ValueRef,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        let root = Value::object().into_ref();
        let string_class = Value::object().into_ref();
        let array_class = Value::object().into_ref();
        let object_class = Value::object().into_ref();
        root.borrow_mut()
            .add_child("String", Rc::clone(&string_class));
        root.borrow_mut().add_child("Array", Rc::clone(&array_class));
        root.borrow_mut()
            .add_child("Object", Rc::clone(&object_class));
        Interpreter {
            lex: Lexer::new(""),
            scopes: Vec::new(),
            call_stack: Vec::new(),
            root,
            string_class,
            array_class,
            object_class,
        }
    }

    /// The root of the symbol table.
    pub fn root(&self) -> &ValueRef {
        &self.root
    }

    pub(crate) fn root_ref(&self) -> ValueRef {
        Rc::clone(&self.root)
    }

    /// Runs zero or more statements.
    pub fn execute(&mut self, code: &str) -> Result<(), ScriptError> {
        let old_lex = std::mem::replace(&mut self.lex, Lexer::new(code));
        let old_scopes = std::mem::take(&mut self.scopes);
        let old_stack = std::mem::take(&mut self.call_stack);
        self.scopes.push(Rc::clone(&self.root));

        let mut execute = true;
        let mut outcome = Ok(());
        while self.lex.kind != TokenKind::Eof {
            if let Err(inner) = self.statement(&mut execute) {
                outcome = Err(self.compose_error(inner));
                break;
            }
        }

        self.lex = old_lex;
        self.scopes = old_scopes;
        self.call_stack = old_stack;
        outcome
    }

    /// Runs one or more `;`-separated expressions and hands back the last
    /// result as a value handle.
    pub fn evaluate_complex(&mut self, code: &str) -> Result<Slot, ScriptError> {
        let old_lex = std::mem::replace(&mut self.lex, Lexer::new(code));
        let old_scopes = std::mem::take(&mut self.scopes);
        let old_stack = std::mem::take(&mut self.call_stack);
        self.scopes.push(Rc::clone(&self.root));

        let mut execute = true;
        let mut result = Slot::default();
        let mut outcome = Ok(());
        loop {
            // statements are allowed between expressions; the value of the
            // whole evaluation is the last expression's
            let step = match self.lex.kind {
                TokenKind::Var
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Function
                | TokenKind::Punct(';') => self.statement(&mut execute),
                _ => self.base(&mut execute).and_then(|slot| {
                    result = slot;
                    if self.lex.kind != TokenKind::Eof {
                        self.lex.consume(TokenKind::Punct(';'))?;
                    }
                    Ok(())
                }),
            };
            if let Err(inner) = step {
                outcome = Err(self.compose_error(inner));
                break;
            }
            if self.lex.kind == TokenKind::Eof {
                break;
            }
        }

        self.lex = old_lex;
        self.scopes = old_scopes;
        self.call_stack = old_stack;
        outcome.map(|_| result)
    }

    /// Runs expressions and returns the textual form of the last result.
    pub fn evaluate(&mut self, code: &str) -> Result<String, ScriptError> {
        let slot = self.evaluate_complex(code)?;
        let value = slot.get();
        let text = value.borrow().get_string();
        Ok(text)
    }

    /// Installs a host function described by
    /// `function Qualified.path.name(arg1, arg2)`. The dotted prefix is
    /// created as nested plain objects under the root as needed.
    pub fn add_native<F>(&mut self, descriptor: &str, callback: F) -> Result<(), ScriptError>
    where
        F: Fn(&mut Interpreter, &ValueRef) -> Result<(), ScriptError> + 'static,
    {
        let callback: NativeFn = Rc::new(callback);
        let old_lex = std::mem::replace(&mut self.lex, Lexer::new(descriptor));
        let outcome = self.register_native(callback);
        self.lex = old_lex;
        outcome
    }

    fn register_native(&mut self, callback: NativeFn) -> Result<(), ScriptError> {
        self.lex.consume(TokenKind::Function)?;
        let mut base = Rc::clone(&self.root);
        let mut name = self.lex.token_str.clone();
        self.lex.consume(TokenKind::Id)?;
        while self.lex.kind == TokenKind::Punct('.') {
            self.lex.consume(TokenKind::Punct('.'))?;
            let existing = base.borrow().find_child(&name);
            let next = match existing {
                Some(target) => target,
                None => base
                    .borrow_mut()
                    .add_child(&name, Value::object().into_ref()),
            };
            base = next;
            name = self.lex.token_str.clone();
            self.lex.consume(TokenKind::Id)?;
        }
        let func = Value::native_function(callback).into_ref();
        self.parse_function_arguments(&func)?;
        base.borrow_mut().add_child(&name, func);
        Ok(())
    }

    /// Fetches the value at a dotted path, if it exists.
    pub fn script_variable(&self, path: &str) -> Option<ValueRef> {
        let mut var = Rc::clone(&self.root);
        for part in path.split('.') {
            let next = var.borrow().find_child(part)?;
            var = next;
        }
        Some(var)
    }

    /// Textual form of the value at a dotted path, if it exists.
    pub fn variable_string(&self, path: &str) -> Option<String> {
        self.script_variable(path)
            .map(|var| var.borrow().get_string())
    }

    /// Sets an existing variable from text, keeping its current type.
    /// Returns false if the path does not resolve.
    pub fn set_variable(&mut self, path: &str, data: &str) -> bool {
        match self.script_variable(path) {
            Some(var) => {
                let mut value = var.borrow_mut();
                if value.is_int() {
                    let parsed = Value::from_number_literal(data.trim(), false).get_int();
                    value.set_int(parsed);
                } else if value.is_double() {
                    value.set_double(data.trim().parse().unwrap_or(0.0));
                } else {
                    value.set_string(data);
                }
                true
            }
            None => false,
        }
    }

    /// Dumps the whole symbol table through the `log` facade.
    pub fn trace(&self) {
        self.root.borrow().trace("", "");
    }

    /// Composes the final host-level error: inner message, call trace,
    /// position.
    fn compose_error(&self, inner: ScriptError) -> ScriptError {
        let mut message = format!("Error {}", inner);
        for (depth, frame) in self.call_stack.iter().enumerate().rev() {
            message.push_str(&format!("\n{}: {}", depth, frame));
        }
        message.push_str(&format!(" at {}", self.lex.current_position()));
        ScriptError::Aborted(message)
    }

    /// Finds a child by searching the scope stack top-down.
    pub(crate) fn find_in_scopes(&self, name: &str) -> Option<Slot> {
        for scope in self.scopes.iter().rev() {
            if let Some(target) = scope.borrow().find_child(name) {
                return Some(Slot::owned(Rc::clone(scope), name, target));
            }
        }
        None
    }

    /// Looks a member up along the prototype chain, then on the built-in
    /// String/Array classes (by receiver type), then on the Object class.
    pub(crate) fn find_in_parent_classes(&self, object: &ValueRef, name: &str) -> Option<Slot> {
        let mut parent_class = object.borrow().find_child(PROTOTYPE_CLASS);
        while let Some(class) = parent_class {
            if let Some(target) = class.borrow().find_child(name) {
                return Some(Slot::owned(Rc::clone(&class), name, target));
            }
            let next = class.borrow().find_child(PROTOTYPE_CLASS);
            parent_class = next;
        }
        if object.borrow().is_string() {
            if let Some(target) = self.string_class.borrow().find_child(name) {
                return Some(Slot::owned(Rc::clone(&self.string_class), name, target));
            }
        }
        if object.borrow().is_array() {
            if let Some(target) = self.array_class.borrow().find_child(name) {
                return Some(Slot::owned(Rc::clone(&self.array_class), name, target));
            }
        }
        self.object_class
            .borrow()
            .find_child(name)
            .map(|target| Slot::owned(Rc::clone(&self.object_class), name, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_carries_builtin_classes() {
        let interpreter = Interpreter::new();
        let root = interpreter.root().borrow();
        assert!(root.find_child("String").is_some());
        assert!(root.find_child("Array").is_some());
        assert!(root.find_child("Object").is_some());
    }

    #[test]
    fn script_variable_walks_dotted_paths() {
        let mut interpreter = Interpreter::new();
        interpreter.execute("var a = { b: { c: 12 } };").unwrap();
        assert_eq!(
            interpreter.variable_string("a.b.c"),
            Some("12".to_string())
        );
        assert_eq!(interpreter.variable_string("a.b.missing"), None);
    }

    #[test]
    fn set_variable_keeps_the_current_type() {
        let mut interpreter = Interpreter::new();
        interpreter.execute("var n = 1; var s = 'x';").unwrap();
        assert!(interpreter.set_variable("n", "42"));
        assert!(interpreter.set_variable("s", "hello"));
        assert!(!interpreter.set_variable("missing", "1"));
        assert_eq!(interpreter.evaluate("n + 1").unwrap(), "43");
        assert_eq!(interpreter.evaluate("s").unwrap(), "hello");
    }

    #[test]
    fn errors_compose_position_and_trace() {
        let mut interpreter = Interpreter::new();
        let err = interpreter.execute("var x = ;").unwrap_err();
        match err {
            ScriptError::Aborted(message) => {
                assert!(message.starts_with("Error "), "{message}");
                assert!(message.contains("line"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
