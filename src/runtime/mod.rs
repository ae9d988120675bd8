//! Runtime value graph for VJS
//!
//! Every runtime datum - primitives, objects, arrays, functions, and the
//! scopes of running calls - is the same [`value::Value`] node type, linked
//! to named children and shared through reference counting.

pub mod value;

pub use value::{Kind, Link, NativeFn, Slot, Value, ValueRef};
