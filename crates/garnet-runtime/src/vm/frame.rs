//! Call frame implementation for method calls

use crate::method::InstructionSet;
use crate::value::Value;
use std::sync::{Arc, Weak};

/// Call frame for a method invocation
///
/// Each call creates a new frame that tracks:
/// - The local variable slots, indexed by parameter position first
/// - The instruction set being executed (shared with the method object)
/// - The receiver (`self`)
/// - An optional link to the frame a block was created in
///
/// ## Local Layout Example
///
/// ```text
/// def f(a, b = 2, *rest, k:)
///
/// locals: [a][b][rest][k][...body locals]
///          0  1   2    3
/// ```
///
/// A slot the binder did not write stays `None`; default-value code in the
/// method body fills those in.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Instruction set this frame executes
    pub instruction_set: Arc<InstructionSet>,
    /// Receiver of the call
    pub receiver: Value,
    /// Enclosing frame, for blocks that read outer locals
    block_frame: Option<Weak<CallFrame>>,
    /// Local variable slots
    locals: Vec<Option<Value>>,
    /// Source line of the call site
    pub source_line: usize,
}

impl CallFrame {
    /// Create an empty frame with one unset slot per declared parameter
    pub fn new(instruction_set: Arc<InstructionSet>, receiver: Value, source_line: usize) -> Self {
        let param_count = instruction_set.params.len();
        Self {
            instruction_set,
            receiver,
            block_frame: None,
            locals: vec![None; param_count],
            source_line,
        }
    }

    /// Link the frame a block was created in
    pub fn set_block_frame(&mut self, frame: Option<&Arc<CallFrame>>) {
        self.block_frame = frame.map(Arc::downgrade);
    }

    /// Enclosing frame, if it is still alive
    pub fn block_frame(&self) -> Option<Arc<CallFrame>> {
        self.block_frame.as_ref().and_then(Weak::upgrade)
    }

    pub fn method_name(&self) -> &str {
        &self.instruction_set.name
    }

    pub fn file_name(&self) -> &str {
        &self.instruction_set.file_name
    }

    /// Write a local slot, growing the slot array if needed
    pub fn set_local(&mut self, index: usize, value: Value) {
        if index >= self.locals.len() {
            self.locals.resize(index + 1, None);
        }
        self.locals[index] = Some(value);
    }

    /// Read a local slot of this frame
    pub fn local(&self, index: usize) -> Option<&Value> {
        self.locals.get(index).and_then(Option::as_ref)
    }

    /// Read a local `depth` block frames out (0 = this frame)
    pub fn lookup_local(&self, index: usize, depth: usize) -> Option<Value> {
        if depth == 0 {
            return self.local(index).cloned();
        }
        self.block_frame()?.lookup_local(index, depth - 1)
    }

    pub fn locals(&self) -> &[Option<Value>] {
        &self.locals
    }
}
