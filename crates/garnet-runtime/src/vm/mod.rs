//! Call stack driver
//!
//! Owns the evaluation stack and the chain of active frames for one VM
//! thread. At a call it builds a [`CallBinder`] over the argument window,
//! binds, and pushes the resulting frame; on return it pops the frame and
//! drops the receiver and argument slots.

pub mod arity;
mod binder;
mod error;
mod frame;

pub use binder::{BindMode, CallBinder, CallSite};
pub use error::BindError;
pub use frame::CallFrame;

use crate::method::MethodObject;
use crate::shape::ShapeDescriptor;
use crate::stack::Stack;
use crate::value::{RuntimeError, Value};
use garnet_config::RuntimeConfig;
use std::sync::Arc;

/// A frame on the call stack plus where its receiver sat
#[derive(Debug, Clone)]
struct Activation {
    frame: Arc<CallFrame>,
    receiver_index: usize,
}

/// Virtual machine state
pub struct VM {
    /// Value stack
    stack: Stack,
    /// Active frames, innermost last
    frames: Vec<Activation>,
    config: RuntimeConfig,
}

impl VM {
    /// Create a new VM
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            stack: Stack::with_capacity(config.stack_capacity),
            frames: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Number of active frames
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Innermost active frame
    pub fn current_frame(&self) -> Option<&Arc<CallFrame>> {
        self.frames.last().map(|a| &a.frame)
    }

    /// Invoke `method` on the receiver sitting below the top `arg_count` slots
    ///
    /// The receiver and arguments stay on the stack until
    /// [`VM::return_from_method`].
    pub fn call_method(
        &mut self,
        method: &MethodObject,
        arg_count: usize,
        arg_shape: Option<&ShapeDescriptor>,
        block_frame: Option<&Arc<CallFrame>>,
        line: usize,
    ) -> Result<Arc<CallFrame>, RuntimeError> {
        if self.frames.len() >= self.config.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                depth: self.config.max_call_depth,
                line,
            });
        }

        let receiver_index = self
            .stack
            .len()
            .checked_sub(arg_count + 1)
            .ok_or(RuntimeError::StackUnderflow)?;
        let receiver = self
            .stack
            .get(receiver_index)
            .cloned()
            .ok_or(RuntimeError::InvalidReceiver {
                index: receiver_index,
            })?;

        let mut site = CallSite::new(receiver_index, arg_count).at_line(line);
        if let Some(shape) = arg_shape {
            site = site.with_shape(shape);
        }
        let binder = CallBinder::new(receiver, method, site, block_frame);

        if self.config.strict_arity {
            arity::check(&binder).map_err(|source| RuntimeError::ArgumentError { source, line })?;
        }

        let frame = Arc::new(
            binder
                .bind(&self.stack)
                .map_err(|source| RuntimeError::ArgumentError { source, line })?,
        );

        tracing::debug!(
            method = %method.name,
            depth = self.frames.len() + 1,
            line,
            "push frame"
        );
        self.frames.push(Activation {
            frame: frame.clone(),
            receiver_index,
        });
        Ok(frame)
    }

    /// Pop the innermost frame and leave `return_value` where its receiver was
    pub fn return_from_method(&mut self, return_value: Value) -> Result<Arc<CallFrame>, RuntimeError> {
        let activation = self.frames.pop().ok_or(RuntimeError::StackUnderflow)?;
        self.stack.truncate(activation.receiver_index);
        self.stack.push(return_value);

        tracing::debug!(
            method = %activation.frame.method_name(),
            depth = self.frames.len(),
            "pop frame"
        );
        Ok(activation.frame)
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    #[test]
    fn test_vm_stack() {
        let mut vm = VM::default();
        vm.push(Value::Integer(42));
        assert_eq!(vm.pop().unwrap(), Value::Integer(42));
        assert_eq!(vm.pop(), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn test_call_and_return_restore_stack() {
        let method = MethodObject::with_params("add", shape![Normal "a", Normal "b"].unwrap());
        let mut vm = VM::default();
        vm.push(Value::string("caller local"));
        vm.push(Value::string("receiver"));
        vm.push(Value::Integer(1));
        vm.push(Value::Integer(2));

        let frame = vm.call_method(&method, 2, None, None, 1).unwrap();
        assert_eq!(frame.receiver, Value::string("receiver"));
        assert_eq!(frame.local(1), Some(&Value::Integer(2)));
        assert_eq!(vm.frame_depth(), 1);

        vm.return_from_method(Value::Integer(3)).unwrap();
        assert_eq!(vm.frame_depth(), 0);
        assert_eq!(
            vm.stack().as_slice(),
            &[Value::string("caller local"), Value::Integer(3)]
        );
    }

    #[test]
    fn test_call_without_receiver_underflows() {
        let method = MethodObject::with_params("f", ShapeDescriptor::default());
        let mut vm = VM::default();
        let err = vm.call_method(&method, 0, None, None, 1).unwrap_err();
        assert_eq!(err, RuntimeError::StackUnderflow);
    }
}
