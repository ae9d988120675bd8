//! VJS: Vibe-coded JavaScript
//!
//! A small embeddable interpreter for a dynamically-typed, curly-brace
//! scripting language whose surface syntax is a subset of JavaScript. It is
//! meant to be linked into a host program to run short scripts that compute
//! values, manipulate structured data, and call functions the host provides.
//!
//! Three pieces make up the engine:
//!
//! - a streaming [`Lexer`] whose sub-range views let source fragments be
//!   re-scanned without copying;
//! - a value graph ([`Value`]) in which objects, arrays, functions and call
//!   scopes are all the same reference-counted node type, connected by named
//!   child links;
//! - a recursive-descent [`Interpreter`] that evaluates while it parses,
//!   skips dead branches with an execute flag, and runs loops by re-lexing
//!   captured source ranges.
//!
//! ```
//! use vjs::Interpreter;
//!
//! let mut js = Interpreter::new();
//! js.execute("var a = [10, 20, 30];").unwrap();
//! assert_eq!(js.evaluate("a.length + a[1]").unwrap(), "23");
//! ```
//!
//! Host functions are registered with a descriptor and a closure:
//!
//! ```
//! use vjs::Interpreter;
//!
//! let mut js = Interpreter::new();
//! js.add_native("function Math.square(x)", |_js, frame| {
//!     let x = frame.borrow_mut().get_parameter("x");
//!     let squared = { let v = x.borrow(); v.get_int() * v.get_int() };
//!     frame.borrow_mut().get_return_var().borrow_mut().set_int(squared);
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(js.evaluate("Math.square(7)").unwrap(), "49");
//! ```

mod error;
mod interpreter;
mod lexer;
mod runtime;
mod token;

pub use error::ScriptError;
pub use interpreter::{Interpreter, LOOP_MAX_ITERATIONS};
pub use lexer::Lexer;
pub use runtime::value::json::quote_string;
pub use runtime::value::{Kind, Link, NativeFn, Slot, Value, ValueRef, PROTOTYPE_CLASS, RETURN_VAR};
pub use token::TokenKind;
