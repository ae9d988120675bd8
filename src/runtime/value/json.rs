//! Printable forms of value trees
//!
//! `get_parsable_string` emits a source-reconstitutable form of a single
//! value; `get_json` pretty-prints a whole tree, JSON style, quoting child
//! names and clamping huge arrays so output stays bounded.

use super::Value;

/// Quotes a string for script consumption: known control characters by name,
/// anything else non-printable as a `\xHH` escape.
pub fn quote_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\u{0007}' => quoted.push_str("\\a"),
            '"' => quoted.push_str("\\\""),
            _ => {
                let code = ch as u32;
                if !(32..=127).contains(&code) {
                    quoted.push_str(&format!("\\x{:02X}", code & 0xFF));
                } else {
                    quoted.push(ch);
                }
            }
        }
    }
    quoted.push('"');
    quoted
}

/// Arrays longer than this print only their leading entries.
const MAX_JSON_ARRAY_ENTRIES: i64 = 10000;

impl Value {
    /// A form that evaluates back to this value: numbers bare, strings
    /// quoted, functions with their parameter list and body, null and
    /// undefined as keywords.
    pub fn get_parsable_string(&self) -> String {
        if self.is_numeric() && !self.is_null() {
            return self.get_string();
        }
        if self.is_function() {
            let params = self.child_names().join(",");
            return format!("function ({}) {}", params, self.get_string());
        }
        if self.is_string() {
            return quote_string(&self.get_string());
        }
        if self.is_null() {
            return "null".to_string();
        }
        "undefined".to_string()
    }

    /// Pretty-printed JSON-ish rendition of this subtree.
    pub fn get_json(&self, destination: &mut String, line_prefix: &str) {
        if self.is_object() {
            let indented = format!("{}  ", line_prefix);
            destination.push_str("{ \n");
            let mut first = true;
            for link in self.links() {
                if !first {
                    destination.push_str(",\n");
                }
                first = false;
                destination.push_str(&indented);
                destination.push_str(&quote_string(&link.name));
                destination.push_str(" : ");
                link.target.borrow().get_json(destination, &indented);
            }
            destination.push('\n');
            destination.push_str(line_prefix);
            destination.push('}');
        } else if self.is_array() {
            let indented = format!("{}  ", line_prefix);
            destination.push_str("[\n");
            let len = self.get_array_length().min(MAX_JSON_ARRAY_ENTRIES);
            for i in 0..len {
                let item = self.get_array_index(i);
                item.borrow().get_json(destination, &indented);
                if i < len - 1 {
                    destination.push_str(",\n");
                }
            }
            destination.push('\n');
            destination.push_str(line_prefix);
            destination.push(']');
        } else {
            destination.push_str(&self.get_parsable_string());
        }
    }
}
