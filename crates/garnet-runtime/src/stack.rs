//! Evaluation stack
//!
//! A flat buffer of slots addressed by index. Callers (the binder included)
//! hold indices, never references into the buffer, so the stack can grow
//! while a call is being set up.
//!
//! ## Call Layout
//!
//! ```text
//! [..caller..][receiver][arg0][arg1]...[argN-1]
//!              ^         ^
//!              receiver  argument window base (receiver + 1)
//! ```

use crate::value::Value;

/// Value stack shared by all frames of one VM thread
#[derive(Debug, Clone, Default)]
pub struct Stack {
    slots: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.slots.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.slots.pop()
    }

    /// Read the slot at `index`, if it exists
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    /// Index of the next slot to be pushed
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every slot at or above `len`
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.slots
    }
}

impl FromIterator<Value> for Stack {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
