//! Garnet Runtime - method invocation core
//!
//! This library provides the part of the Garnet virtual machine that runs at
//! every method call:
//! - Parameter and argument shape descriptors
//! - The evaluation stack and call frames
//! - Argument binding (positional, optioned, keyword, and splat)
//! - A call stack driver that binds, pushes and pops frames

/// Garnet runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod method;
pub mod shape;
pub mod stack;
pub mod value;
pub mod vm;

// Re-export commonly used types
pub use method::{InstructionSet, MethodObject};
pub use shape::{ParamKind, ShapeDescriptor, ShapeEntry, ShapeError};
pub use stack::Stack;
pub use value::{RuntimeError, Value, ValueArray};
pub use vm::{BindError, BindMode, CallBinder, CallFrame, CallSite, VM};
