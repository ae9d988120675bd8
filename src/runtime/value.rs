pub mod handle;
pub mod json;
pub mod maths;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::ScriptError;
use crate::interpreter::Interpreter;

pub use handle::Slot;

/// Child name designating an object's parent class.
pub const PROTOTYPE_CLASS: &str = "prototype";
/// Child name designating a call frame's return slot.
pub const RETURN_VAR: &str = "return";

/// Shared handle onto a value node.
pub type ValueRef = Rc<RefCell<Value>>;

/// Callback backing a native function. It receives the interpreter (so it may
/// re-enter evaluation) and the call frame carrying `this`, the parameters,
/// and the return slot.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, &ValueRef) -> Result<(), ScriptError>>;

/// Type tag of a value node. Exactly one applies at a time; a Function may
/// additionally be native, which is recorded by the presence of its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Undefined,
    Null,
    Int,
    Double,
    Str,
    Object,
    Array,
    Function,
}

impl Kind {
    /// Name used in unsupported-operation messages.
    pub fn datatype_name(self) -> &'static str {
        match self {
            Kind::Undefined => "undefined",
            Kind::Null => "null",
            Kind::Int => "Int",
            Kind::Double => "Double",
            Kind::Str => "string",
            Kind::Object => "Object",
            Kind::Array => "Array",
            Kind::Function => "Function",
        }
    }
}

/// A named edge from a parent value to a child value. Links live in their
/// parent's child list; each holds one strong reference on its target.
#[derive(Debug, Clone)]
pub struct Link {
    pub name: String,
    pub target: ValueRef,
}

/// A node in the runtime data graph: a type tag, scalar payload fields (the
/// one matching the tag is authoritative; the string field doubles as the
/// captured body of script functions), an optional native callback, and an
/// insertion-ordered list of named child links.
pub struct Value {
    kind: Kind,
    int_data: i64,
    double_data: f64,
    string_data: String,
    native: Option<NativeFn>,
    children: Vec<Link>,
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("kind", &self.kind)
            .field("data", &self.get_string())
            .field("native", &self.native.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl Value {
    fn blank(kind: Kind) -> Value {
        Value {
            kind,
            int_data: 0,
            double_data: 0.0,
            string_data: String::new(),
            native: None,
            children: Vec::new(),
        }
    }

    pub fn undefined() -> Value {
        Value::blank(Kind::Undefined)
    }

    pub fn null() -> Value {
        Value::blank(Kind::Null)
    }

    pub fn int(value: i64) -> Value {
        let mut v = Value::blank(Kind::Int);
        v.int_data = value;
        v
    }

    /// Booleans are integers, 1 or 0, with their keyword form cached in the
    /// string field so they print as `true`/`false`.
    pub fn from_bool(value: bool) -> Value {
        let mut v = Value::int(if value { 1 } else { 0 });
        v.string_data = if value { "true" } else { "false" }.to_string();
        v
    }

    pub fn double(value: f64) -> Value {
        let mut v = Value::blank(Kind::Double);
        v.double_data = value;
        v
    }

    pub fn string(value: impl Into<String>) -> Value {
        let mut v = Value::blank(Kind::Str);
        v.string_data = value.into();
        v
    }

    pub fn object() -> Value {
        Value::blank(Kind::Object)
    }

    pub fn array() -> Value {
        Value::blank(Kind::Array)
    }

    pub fn function() -> Value {
        Value::blank(Kind::Function)
    }

    pub fn native_function(callback: NativeFn) -> Value {
        let mut v = Value::blank(Kind::Function);
        v.native = Some(callback);
        v
    }

    /// Builds a number from its lexeme. Hex integers use base 16, everything
    /// else is decimal; malformed text falls back to zero.
    pub fn from_number_literal(text: &str, is_float: bool) -> Value {
        if is_float {
            Value::double(text.parse().unwrap_or(0.0))
        } else if let Some(hex) = text.strip_prefix("0x") {
            Value::int(i64::from_str_radix(hex, 16).unwrap_or(0))
        } else {
            Value::int(text.parse().unwrap_or(0))
        }
    }

    pub fn into_ref(self) -> ValueRef {
        Rc::new(RefCell::new(self))
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_undefined(&self) -> bool {
        self.kind == Kind::Undefined
    }

    pub fn is_null(&self) -> bool {
        self.kind == Kind::Null
    }

    pub fn is_int(&self) -> bool {
        self.kind == Kind::Int
    }

    pub fn is_double(&self) -> bool {
        self.kind == Kind::Double
    }

    /// Null counts as numeric: it behaves as zero in arithmetic.
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, Kind::Int | Kind::Double | Kind::Null)
    }

    pub fn is_string(&self) -> bool {
        self.kind == Kind::Str
    }

    pub fn is_object(&self) -> bool {
        self.kind == Kind::Object
    }

    pub fn is_array(&self) -> bool {
        self.kind == Kind::Array
    }

    pub fn is_function(&self) -> bool {
        self.kind == Kind::Function
    }

    pub fn is_native(&self) -> bool {
        self.native.is_some()
    }

    /// Basic values are passed to functions by copy; objects, arrays and
    /// functions are passed by reference.
    pub fn is_basic(&self) -> bool {
        !matches!(self.kind, Kind::Object | Kind::Array | Kind::Function)
    }

    pub fn native_fn(&self) -> Option<NativeFn> {
        self.native.clone()
    }

    pub fn set_callback(&mut self, callback: NativeFn) {
        self.native = Some(callback);
    }

    // ----------------------------------------------------------------- scalars

    pub fn get_int(&self) -> i64 {
        match self.kind {
            Kind::Int => self.int_data,
            Kind::Double => self.double_data as i64,
            _ => 0,
        }
    }

    pub fn get_bool(&self) -> bool {
        self.get_int() != 0
    }

    pub fn get_double(&self) -> f64 {
        match self.kind {
            Kind::Double => self.double_data,
            Kind::Int => self.int_data as f64,
            _ => 0.0,
        }
    }

    pub fn get_string(&self) -> String {
        match self.kind {
            Kind::Int if self.string_data.is_empty() => self.int_data.to_string(),
            Kind::Int => self.string_data.clone(),
            Kind::Double => format!("{:.6}", self.double_data),
            Kind::Null => "null".to_string(),
            Kind::Undefined => "undefined".to_string(),
            _ => self.string_data.clone(),
        }
    }

    pub fn set_int(&mut self, value: i64) {
        self.kind = Kind::Int;
        self.int_data = value;
        self.double_data = 0.0;
        self.string_data.clear();
    }

    pub fn set_double(&mut self, value: f64) {
        self.kind = Kind::Double;
        self.double_data = value;
        self.int_data = 0;
        self.string_data.clear();
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        self.kind = Kind::Str;
        self.string_data = value.into();
        self.int_data = 0;
        self.double_data = 0.0;
    }

    pub fn set_undefined(&mut self) {
        self.kind = Kind::Undefined;
        self.int_data = 0;
        self.double_data = 0.0;
        self.string_data.clear();
        self.children.clear();
    }

    pub fn set_array(&mut self) {
        self.kind = Kind::Array;
        self.int_data = 0;
        self.double_data = 0.0;
        self.string_data.clear();
        self.children.clear();
    }

    /// Stores the captured source text of a script function body.
    pub fn set_function_body(&mut self, body: String) {
        self.string_data = body;
    }

    // ---------------------------------------------------------------- children

    pub fn links(&self) -> &[Link] {
        &self.children
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.iter().map(|l| l.name.clone()).collect()
    }

    pub fn get_children(&self) -> usize {
        self.children.len()
    }

    /// Linear scan of the child list.
    pub fn find_child(&self, name: &str) -> Option<ValueRef> {
        self.children
            .iter()
            .find(|l| l.name == name)
            .map(|l| Rc::clone(&l.target))
    }

    pub fn find_child_or_create(&mut self, name: &str, kind: Kind) -> ValueRef {
        if let Some(existing) = self.find_child(name) {
            return existing;
        }
        self.add_child(name, Value::blank(kind).into_ref())
    }

    /// Walks a dotted path, creating intermediate objects as needed.
    pub fn find_child_or_create_by_path(&mut self, path: &str) -> ValueRef {
        match path.split_once('.') {
            None => self.find_child_or_create(path, Kind::Undefined),
            Some((head, tail)) => {
                let child = self.find_child_or_create(head, Kind::Object);
                let result = child.borrow_mut().find_child_or_create_by_path(tail);
                result
            }
        }
    }

    /// Appends an owned link. An undefined receiver is promoted to an object
    /// by gaining its first child.
    pub fn add_child(&mut self, name: &str, target: ValueRef) -> ValueRef {
        if self.kind == Kind::Undefined {
            self.kind = Kind::Object;
        }
        self.children.push(Link {
            name: name.to_string(),
            target: Rc::clone(&target),
        });
        target
    }

    /// Adds a child, replacing the target of any existing link with that name.
    pub fn add_child_no_duplicate(&mut self, name: &str, target: ValueRef) -> ValueRef {
        if let Some(link) = self.children.iter_mut().find(|l| l.name == name) {
            link.target = Rc::clone(&target);
            return target;
        }
        self.add_child(name, target)
    }

    /// Replaces the target of an existing link. Returns false if no child has
    /// that name.
    pub fn replace_child(&mut self, name: &str, target: ValueRef) -> bool {
        match self.children.iter_mut().find(|l| l.name == name) {
            Some(link) => {
                link.target = target;
                true
            }
            None => false,
        }
    }

    /// Unlinks the first child whose target is `child`.
    pub fn remove_child(&mut self, child: &ValueRef) {
        if let Some(pos) = self
            .children
            .iter()
            .position(|l| Rc::ptr_eq(&l.target, child))
        {
            self.children.remove(pos);
        }
    }

    /// Unlinks the first child with the given name and returns its target.
    pub fn remove_child_named(&mut self, name: &str) -> Option<ValueRef> {
        let pos = self.children.iter().position(|l| l.name == name)?;
        Some(self.children.remove(pos).target)
    }

    pub fn remove_all_children(&mut self) {
        self.children.clear();
    }

    // ------------------------------------------------------------------ arrays

    /// The value at an array index; missing entries read as null.
    pub fn get_array_index(&self, index: i64) -> ValueRef {
        match self.find_child(&index.to_string()) {
            Some(target) => target,
            None => Value::null().into_ref(),
        }
    }

    /// Sets the value at an array index; storing undefined removes the slot.
    pub fn set_array_index(&mut self, index: i64, value: ValueRef) {
        let name = index.to_string();
        let undefined = value.borrow().is_undefined();
        match self.children.iter().position(|l| l.name == name) {
            Some(pos) => {
                if undefined {
                    self.children.remove(pos);
                } else {
                    self.children[pos].target = value;
                }
            }
            None => {
                if !undefined {
                    self.add_child(&name, value);
                }
            }
        }
    }

    /// One greater than the largest numeric child name, or 0 when this is not
    /// an array (or has no numeric children).
    pub fn get_array_length(&self) -> i64 {
        if self.kind != Kind::Array {
            return 0;
        }
        let mut highest: i64 = -1;
        for link in &self.children {
            if !link.name.is_empty() && link.name.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(index) = link.name.parse::<i64>() {
                    highest = highest.max(index);
                }
            }
        }
        highest + 1
    }

    // ----------------------------------------------------------------- copying

    fn copy_simple(&mut self, src: &Value) {
        self.kind = src.kind;
        self.int_data = src.int_data;
        self.double_data = src.double_data;
        self.string_data = src.string_data.clone();
    }

    /// Recursive copy of this node. The `prototype` child is shared, not
    /// cloned: the parent class is common to every copy.
    pub fn deep_copy(&self) -> ValueRef {
        let mut copy = Value::undefined();
        copy.copy_simple(self);
        for link in &self.children {
            let target = if link.name == PROTOTYPE_CLASS {
                Rc::clone(&link.target)
            } else {
                link.target.borrow().deep_copy()
            };
            copy.add_child(&link.name, target);
        }
        copy.into_ref()
    }

    /// Copies `src` into this node, replacing its children.
    pub fn copy_value(&mut self, src: &Value) {
        self.copy_simple(src);
        self.children.clear();
        for link in &src.children {
            let target = if link.name == PROTOTYPE_CLASS {
                Rc::clone(&link.target)
            } else {
                link.target.borrow().deep_copy()
            };
            self.add_child(&link.name, target);
        }
    }

    /// Loose equality, as the `==` operator defines it.
    pub fn equals(&self, other: &Value) -> bool {
        self.maths_op(other, crate::token::TokenKind::Equal)
            .map(|v| v.get_bool())
            .unwrap_or(false)
    }

    // -------------------------------------------------- native call convention

    /// Fetches (creating if needed) a parameter of a call frame.
    pub fn get_parameter(&mut self, name: &str) -> ValueRef {
        self.find_child_or_create(name, Kind::Undefined)
    }

    /// The return slot of a call frame, for mutating in place.
    pub fn get_return_var(&mut self) -> ValueRef {
        self.find_child_or_create(RETURN_VAR, Kind::Undefined)
    }

    /// Installs a new value in the return slot, avoiding a deep copy.
    pub fn set_return_var(&mut self, value: ValueRef) {
        self.add_child_no_duplicate(RETURN_VAR, value);
    }

    /// Dumps this subtree through the `log` facade.
    pub fn trace(&self, indent: &str, name: &str) {
        log::trace!("{}'{}' = '{}' {:?}", indent, name, self.get_string(), self.kind);
        let deeper = format!("{} ", indent);
        for link in &self.children {
            link.target.borrow().trace(&deeper, &link.name);
        }
    }
}
