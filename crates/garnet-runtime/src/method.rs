//! Method objects and their instruction sequences
//!
//! The instruction encoding itself belongs to the compiler; a call frame only
//! needs to hold on to the sequence it will execute and the parameter shape
//! the method was defined with.

use crate::shape::ShapeDescriptor;
use std::sync::Arc;

/// Compiled body of a method
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionSet {
    /// Method or block label
    pub name: String,
    /// Source file the method was defined in
    pub file_name: String,
    /// Declared parameters
    pub params: ShapeDescriptor,
    /// Encoded instructions, opaque to the binder
    pub instructions: Vec<u8>,
}

impl InstructionSet {
    pub fn new(name: impl Into<String>, file_name: impl Into<String>, params: ShapeDescriptor) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            params,
            instructions: Vec::new(),
        }
    }

    /// Attach the encoded body
    pub fn with_instructions(mut self, instructions: Vec<u8>) -> Self {
        self.instructions = instructions;
        self
    }
}

/// A callable method. Cheap to clone; every frame running it shares one
/// instruction set.
#[derive(Debug, Clone)]
pub struct MethodObject {
    pub name: String,
    pub instruction_set: Arc<InstructionSet>,
}

impl MethodObject {
    pub fn new(name: impl Into<String>, instruction_set: InstructionSet) -> Self {
        Self {
            name: name.into(),
            instruction_set: Arc::new(instruction_set),
        }
    }

    /// Method whose instruction set is named after it and has no body,
    /// enough for binding
    pub fn with_params(name: &str, params: ShapeDescriptor) -> Self {
        Self::new(name, InstructionSet::new(name, "<main>", params))
    }

    pub fn params(&self) -> &ShapeDescriptor {
        &self.instruction_set.params
    }

    /// Whether the last declared parameter collects remaining arguments
    pub fn has_splat_param(&self) -> bool {
        self.params().last_kind() == Some(crate::shape::ParamKind::Splat)
    }
}
