//! Values held in stack slots and frame locals
//!
//! A `Value` is a handle: cloning one bumps a refcount for strings and
//! arrays, so binding an argument never copies the object behind it.

use crate::vm::BindError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared array storage; splat parameters receive one of these
#[derive(Clone, Debug, Default)]
pub struct ValueArray(Arc<Vec<Value>>);

impl ValueArray {
    pub fn new() -> Self {
        ValueArray(Arc::new(Vec::new()))
    }

    pub fn from_vec(v: Vec<Value>) -> Self {
        ValueArray(Arc::new(v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Copy-on-write push: clones the backing vector if it is shared.
    pub fn push(&mut self, value: Value) {
        Arc::make_mut(&mut self.0).push(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl PartialEq for ValueArray {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(Arc<String>),
    Bool(bool),
    Null,
    Array(ValueArray),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ValueArray::from_vec(values))
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bool(_) => "Boolean",
            Value::Null => "Null",
            Value::Array(_) => "Array",
        }
    }

    /// Borrow the elements if this is an array
    pub fn as_array(&self) -> Option<&ValueArray> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "nil"),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, elem) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Errors surfaced by the VM to the running program
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Argument binding failed at a call site
    #[error("ArgumentError: {source} (line {line})")]
    ArgumentError {
        #[source]
        source: BindError,
        line: usize,
    },
    /// Call nesting exceeded the configured depth
    #[error("Stack overflow: call depth {depth} exceeded (line {line})")]
    StackOverflow { depth: usize, line: usize },
    /// Pop or return with nothing to pop
    #[error("Stack underflow")]
    StackUnderflow,
    /// Receiver index does not name a stack slot
    #[error("Invalid receiver slot {index}")]
    InvalidReceiver { index: usize },
}
