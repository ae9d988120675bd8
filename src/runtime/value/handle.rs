//! Expression handles
//!
//! Expression evaluation hands values around as [`Slot`]s. An *owned* slot
//! aliases a named child link inside some parent value, so assigning through
//! it rewrites that parent's link. An *unowned* slot is a transient holding a
//! freshly produced value (or a fabricated handle for an identifier that does
//! not exist yet); it is simply dropped once the consumer is done with it.

use std::rc::Rc;

use super::{Value, ValueRef};

pub struct Slot {
    /// Name this slot was reached by; empty for anonymous results.
    pub name: String,
    target: ValueRef,
    owner: Option<ValueRef>,
}

impl Slot {
    /// Transient result with no name.
    pub fn unowned(target: ValueRef) -> Slot {
        Slot {
            name: String::new(),
            target,
            owner: None,
        }
    }

    /// Transient result that remembers the name it was looked up by, so a
    /// later assignment can hoist it into the root scope.
    pub fn named(name: impl Into<String>, target: ValueRef) -> Slot {
        Slot {
            name: name.into(),
            target,
            owner: None,
        }
    }

    /// Handle onto the child `name` of `owner`.
    pub fn owned(owner: ValueRef, name: impl Into<String>, target: ValueRef) -> Slot {
        Slot {
            name: name.into(),
            target,
            owner: Some(owner),
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    pub fn get(&self) -> ValueRef {
        Rc::clone(&self.target)
    }

    /// Replaces the value this slot designates. For an owned slot the parent's
    /// link is retargeted; for a transient the slot itself is updated.
    pub fn replace_with(&mut self, value: &ValueRef) {
        if let Some(owner) = &self.owner {
            owner
                .borrow_mut()
                .add_child_no_duplicate(&self.name, Rc::clone(value));
        }
        self.target = Rc::clone(value);
    }

    /// Rebinds this slot to a freshly computed result. An unowned slot is
    /// reused (keeping its lookup name); an owned one must not be disturbed,
    /// so the slot degrades to an anonymous transient.
    pub fn assign_result(&mut self, value: ValueRef) {
        if self.owner.is_some() {
            *self = Slot::unowned(value);
        } else {
            self.target = value;
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Slot::unowned(Value::undefined().into_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_through_owned_slot_rewrites_the_parent() {
        let parent = Value::object().into_ref();
        let child = parent
            .borrow_mut()
            .add_child("x", Value::int(1).into_ref());
        let mut slot = Slot::owned(Rc::clone(&parent), "x", child);
        slot.replace_with(&Value::int(9).into_ref());
        assert_eq!(
            parent.borrow().find_child("x").unwrap().borrow().get_int(),
            9
        );
        assert_eq!(slot.get().borrow().get_int(), 9);
    }

    #[test]
    fn replace_through_unowned_slot_is_local() {
        let mut slot = Slot::named("ghost", Value::undefined().into_ref());
        slot.replace_with(&Value::int(5).into_ref());
        assert_eq!(slot.get().borrow().get_int(), 5);
        assert!(!slot.is_owned());
        assert_eq!(slot.name, "ghost");
    }

    #[test]
    fn assign_result_keeps_name_on_transients() {
        let mut slot = Slot::named("x", Value::int(1).into_ref());
        slot.assign_result(Value::int(2).into_ref());
        assert_eq!(slot.name, "x");

        let parent = Value::object().into_ref();
        let child = parent.borrow_mut().add_child("y", Value::int(1).into_ref());
        let mut owned = Slot::owned(parent, "y", child);
        owned.assign_result(Value::int(2).into_ref());
        assert!(!owned.is_owned());
        assert!(owned.name.is_empty());
    }
}
