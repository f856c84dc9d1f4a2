//! Argument binding
//!
//! A [`CallBinder`] is built at a call instruction, reconciles the call site's
//! argument shape with the method's parameter shape, copies the matching
//! stack values into a fresh [`CallFrame`], and is consumed by [`CallBinder::bind`].
//!
//! Binding runs in up to three passes:
//! 1. keywords, matched by name;
//! 2. positionals, either one-to-one (all parameters Normal, or no argument
//!    shape at the call site) or by scanning the argument shape for the next
//!    Normal/Optioned entry, draining a call-site splat element by element
//!    when one is reached;
//! 3. a trailing splat parameter, which collects whatever is left.
//!
//! The keyword pass goes first so that the consumed-count cursor already
//! covers keyword slots sitting left of a call-site splat when pass 2 drains it.
//!
//! ## Cursor
//!
//! The cursor counts consumed arguments. Recording a consumed stack index
//! advances it by exactly one when the index is greater than the current
//! count, however far ahead the index is. Strict left-to-right consumption
//! keeps it exact; anything else leaves it behind.

use crate::method::MethodObject;
use crate::shape::{ParamKind, ShapeDescriptor, ShapeEntry};
use crate::stack::Stack;
use crate::value::{Value, ValueArray};
use crate::vm::error::BindError;
use crate::vm::frame::CallFrame;
use std::sync::Arc;

/// How positional parameters are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Every parameter is Normal: argument `i` goes to parameter `i`
    Positional,
    /// Optioned, keyword, or splat parameters present: scan the argument shape
    Mixed,
}

/// Where and how a call was made
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    /// Stack index of the receiver; arguments start right above it
    pub receiver_index: usize,
    /// Number of argument slots on the stack, after splat expansion
    pub arg_count: usize,
    /// Argument shape; `None` means plain positional arguments
    pub arg_shape: Option<&'a ShapeDescriptor>,
    /// Source line of the call, for diagnostics
    pub source_line: usize,
}

impl<'a> CallSite<'a> {
    pub fn new(receiver_index: usize, arg_count: usize) -> Self {
        Self {
            receiver_index,
            arg_count,
            arg_shape: None,
            source_line: 0,
        }
    }

    pub fn with_shape(mut self, shape: &'a ShapeDescriptor) -> Self {
        self.arg_shape = Some(shape);
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.source_line = line;
        self
    }
}

/// Per-invocation binding state. Built fresh for every call.
#[derive(Debug)]
pub struct CallBinder<'a> {
    method: &'a MethodObject,
    receiver_index: usize,
    arg_count: usize,
    arg_shape: Option<&'a ShapeDescriptor>,
    /// Arguments consumed so far
    consumed: usize,
    /// Argument-shape index of the last Normal/Optioned argument matched
    last_arg_index: Option<usize>,
    frame: CallFrame,
}

impl<'a> CallBinder<'a> {
    /// Create a binder and the frame it will populate
    pub fn new(
        receiver: Value,
        method: &'a MethodObject,
        site: CallSite<'a>,
        block_frame: Option<&Arc<CallFrame>>,
    ) -> Self {
        let mut frame = CallFrame::new(method.instruction_set.clone(), receiver, site.source_line);
        frame.set_block_frame(block_frame);

        Self {
            method,
            receiver_index: site.receiver_index,
            arg_count: site.arg_count,
            arg_shape: site.arg_shape,
            consumed: 0,
            last_arg_index: None,
            frame,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn method_name(&self) -> &str {
        &self.method.name
    }

    pub fn arg_count(&self) -> usize {
        self.arg_count
    }

    pub fn params(&self) -> &'a [ShapeEntry] {
        self.method.params().entries()
    }

    pub fn param_kinds(&self) -> impl Iterator<Item = ParamKind> + 'a {
        self.params().iter().map(|e| e.kind)
    }

    pub fn param_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.params().iter().map(|e| e.name.as_str())
    }

    /// Argument shape entries; empty when the call site has no shape
    pub fn args(&self) -> &'a [ShapeEntry] {
        match self.arg_shape {
            Some(shape) => shape.entries(),
            None => &[],
        }
    }

    pub fn arg_kinds(&self) -> impl Iterator<Item = ParamKind> + 'a {
        self.args().iter().map(|e| e.kind)
    }

    pub fn arg_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.args().iter().map(|e| e.name.as_str())
    }

    /// Stack index of the first argument
    pub fn arg_base(&self) -> usize {
        self.receiver_index + 1
    }

    /// Stack index of the next unconsumed argument
    pub fn arg_position(&self) -> usize {
        self.arg_base() + self.consumed
    }

    pub fn count_params(&self, kind: ParamKind) -> usize {
        self.param_kinds().filter(|k| *k == kind).count()
    }

    pub fn count_args(&self, kind: ParamKind) -> usize {
        self.arg_kinds().filter(|k| *k == kind).count()
    }

    pub fn normal_params_count(&self) -> usize {
        self.count_params(ParamKind::Normal)
    }

    pub fn has_splat_argument(&self) -> bool {
        self.arg_kinds().any(|k| k == ParamKind::Splat)
    }

    /// Index of the first keyword parameter called `name`
    pub fn has_keyword_param(&self, name: &str) -> Option<usize> {
        find_keyword(self.params(), name)
    }

    /// Index of the first keyword argument called `name`
    pub fn has_keyword_argument(&self, name: &str) -> Option<usize> {
        find_keyword(self.args(), name)
    }

    pub fn bind_mode(&self) -> BindMode {
        if self.param_kinds().all(|k| k == ParamKind::Normal) {
            BindMode::Positional
        } else {
            BindMode::Mixed
        }
    }

    /// Arguments consumed so far
    pub fn cursor(&self) -> usize {
        self.consumed
    }

    /// Argument-shape index of the last positional match
    pub fn watermark(&self) -> Option<usize> {
        self.last_arg_index
    }

    /// Frame being populated
    pub fn frame(&self) -> &CallFrame {
        &self.frame
    }

    /// Give up the frame without running the remaining passes
    pub fn into_frame(self) -> CallFrame {
        self.frame
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Run every pass and hand back the populated frame
    #[tracing::instrument(
        level = "debug",
        skip(self, stack),
        fields(method = %self.method.name, argc = self.arg_count)
    )]
    pub fn bind(mut self, stack: &Stack) -> Result<CallFrame, BindError> {
        self.assign_keyword_arguments(stack)?;

        match self.bind_mode() {
            BindMode::Positional => self.assign_normal_arguments(stack)?,
            BindMode::Mixed if self.arg_shape.is_none() => {
                self.assign_unshaped_arguments(stack)?
            }
            BindMode::Mixed => {
                for (param_index, entry) in self.params().iter().enumerate() {
                    if entry.kind.is_positional() {
                        self.assign_positional_argument(param_index, stack)?;
                    }
                }
            }
        }

        if self.method.has_splat_param() {
            self.collect_splat_argument(stack)?;
        }

        Ok(self.frame)
    }

    /// One-to-one positional binding for Normal parameters
    pub fn assign_normal_arguments(&mut self, stack: &Stack) -> Result<(), BindError> {
        for (param_index, entry) in self.params().iter().enumerate() {
            if entry.kind == ParamKind::Normal {
                let index = self.arg_position();
                self.bind_slot(param_index, index, stack)?;
            }
        }
        Ok(())
    }

    /// Positional binding for a call site without an argument shape: every
    /// argument is positional, so Normal and Optioned parameters take them in
    /// order until they run out.
    pub fn assign_unshaped_arguments(&mut self, stack: &Stack) -> Result<(), BindError> {
        for (param_index, entry) in self.params().iter().enumerate() {
            if !entry.kind.is_positional() {
                continue;
            }
            if self.consumed >= self.arg_count {
                break;
            }
            let index = self.arg_position();
            self.bind_slot(param_index, index, stack)?;
        }
        Ok(())
    }

    /// Bind the next positional argument after the watermark to `param_index`
    ///
    /// Keyword arguments are skipped over, so `f(y: 100, 10)` still gives
    /// `10` to the first positional parameter. Reaching a call-site splat
    /// binds the value at the cursor instead; successive calls drain the
    /// splat one element at a time. Leaves the parameter unset when nothing
    /// is left to match.
    pub fn assign_positional_argument(
        &mut self,
        param_index: usize,
        stack: &Stack,
    ) -> Result<(), BindError> {
        let start = self.last_arg_index.map_or(0, |i| i + 1);

        for (arg_index, entry) in self.args().iter().enumerate().skip(start) {
            match entry.kind {
                ParamKind::Normal | ParamKind::Optioned => {
                    let index = self.arg_base() + arg_index;
                    self.bind_slot(param_index, index, stack)?;
                    self.last_arg_index = Some(arg_index);
                    return Ok(());
                }
                ParamKind::Splat => {
                    if self.consumed < self.arg_count {
                        let index = self.arg_position();
                        self.bind_slot(param_index, index, stack)?;
                    }
                    return Ok(());
                }
                ParamKind::RequiredKeyword | ParamKind::OptionalKeyword => {}
            }
        }

        Ok(())
    }

    /// Bind every keyword argument to the same-named keyword parameter
    ///
    /// Unknown keys do not stop the pass; the last one seen is reported once
    /// all keyword arguments have been processed.
    pub fn assign_keyword_arguments(&mut self, stack: &Stack) -> Result<(), BindError> {
        let mut last_error = None;

        for (arg_index, entry) in self.args().iter().enumerate() {
            match entry.kind {
                ParamKind::RequiredKeyword | ParamKind::OptionalKeyword => {}
                ParamKind::Normal | ParamKind::Optioned | ParamKind::Splat => continue,
            }

            match self.has_keyword_param(&entry.name) {
                Some(param_index) => {
                    let index = self.arg_base() + arg_index;
                    self.bind_slot(param_index, index, stack)?;
                }
                None => {
                    tracing::debug!(
                        key = %entry.name,
                        method = %self.method.name,
                        "unknown keyword argument"
                    );
                    last_error = Some(BindError::UnknownKeyword {
                        key: entry.name.clone(),
                        method: self.method.name.clone(),
                    });
                }
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Collect every unconsumed argument into an array bound to the last parameter
    pub fn collect_splat_argument(&mut self, stack: &Stack) -> Result<(), BindError> {
        let Some(param_index) = self.params().len().checked_sub(1) else {
            return Ok(());
        };

        let mut collected = ValueArray::new();
        while self.consumed < self.arg_count {
            let index = self.arg_position();
            collected.push(self.read(index, stack)?);
            self.record_consumed(index);
        }

        tracing::trace!(param_index, len = collected.len(), "collected splat");
        self.frame.set_local(param_index, Value::Array(collected));
        Ok(())
    }

    /// Advance the cursor after consuming the argument at stack index `index`
    pub fn record_consumed(&mut self, index: usize) {
        if index > self.consumed {
            self.consumed += 1;
        }
    }

    fn bind_slot(&mut self, param_index: usize, index: usize, stack: &Stack) -> Result<(), BindError> {
        let value = self.read(index, stack)?;
        self.frame.set_local(param_index, value);
        self.record_consumed(index);
        tracing::trace!(
            param_index,
            stack_index = index,
            cursor = self.consumed,
            "bound argument"
        );
        Ok(())
    }

    fn read(&self, index: usize, stack: &Stack) -> Result<Value, BindError> {
        let window_end = self.arg_base() + self.arg_count;
        if index >= window_end {
            return Err(self.out_of_window(index));
        }
        stack
            .get(index)
            .cloned()
            .ok_or_else(|| self.out_of_window(index))
    }

    fn out_of_window(&self, index: usize) -> BindError {
        BindError::ArgumentOutOfWindow {
            index,
            method: self.method.name.clone(),
        }
    }
}

fn find_keyword(entries: &[ShapeEntry], name: &str) -> Option<usize> {
    entries
        .iter()
        .position(|e| e.kind.is_keyword() && e.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    fn stack_of(values: &[i64]) -> Stack {
        std::iter::once(Value::string("receiver"))
            .chain(values.iter().map(|n| Value::Integer(*n)))
            .collect()
    }

    #[test]
    fn test_queries_without_arg_shape() {
        let method = MethodObject::with_params("f", shape![Normal "a", Normal "b"].unwrap());
        let binder = CallBinder::new(Value::Null, &method, CallSite::new(4, 2), None);

        assert_eq!(binder.arg_kinds().count(), 0);
        assert_eq!(binder.arg_base(), 5);
        assert_eq!(binder.arg_position(), 5);
        assert!(!binder.has_splat_argument());
        assert_eq!(binder.bind_mode(), BindMode::Positional);
        assert_eq!(binder.watermark(), None);
    }

    #[test]
    fn test_keyword_lookup_ignores_positional_names() {
        let method = MethodObject::with_params(
            "f",
            shape![Normal "y", OptionalKeyword "y", RequiredKeyword "z"].unwrap(),
        );
        let args = shape![RequiredKeyword "z", Normal "y"].unwrap();
        let binder = CallBinder::new(
            Value::Null,
            &method,
            CallSite::new(0, 2).with_shape(&args),
            None,
        );

        assert_eq!(binder.has_keyword_param("y"), Some(1));
        assert_eq!(binder.has_keyword_param("z"), Some(2));
        assert_eq!(binder.has_keyword_param("w"), None);
        assert_eq!(binder.has_keyword_argument("z"), Some(0));
        assert_eq!(binder.has_keyword_argument("y"), None);
    }

    #[test]
    fn test_cursor_advances_by_one_for_far_index() {
        let method = MethodObject::with_params("f", ShapeDescriptor::default());
        let mut binder = CallBinder::new(Value::Null, &method, CallSite::new(0, 5), None);

        binder.record_consumed(5);
        assert_eq!(binder.cursor(), 1);
        binder.record_consumed(1);
        assert_eq!(binder.cursor(), 1);
        binder.record_consumed(2);
        assert_eq!(binder.cursor(), 2);
    }

    #[test]
    fn test_keyword_left_of_normal_leaves_cursor_behind() {
        // Receiver at slot 0: consuming `k` (slot 2) first moves the cursor
        // to 1, then `a` (slot 1) is not above it and does not move it.
        let method = MethodObject::with_params(
            "f",
            shape![Normal "a", Normal "b", RequiredKeyword "k"].unwrap(),
        );
        let args = shape![Normal "", RequiredKeyword "k", Splat ""].unwrap();
        let stack = stack_of(&[1, 9, 2]);
        let mut binder = CallBinder::new(
            Value::Null,
            &method,
            CallSite::new(0, 3).with_shape(&args),
            None,
        );

        binder.assign_keyword_arguments(&stack).unwrap();
        assert_eq!(binder.cursor(), 1);
        binder.assign_positional_argument(0, &stack).unwrap();
        assert_eq!(binder.cursor(), 1);
        binder.assign_positional_argument(1, &stack).unwrap();

        assert_eq!(binder.frame().local(1), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_positional_scan_sets_watermark() {
        let method =
            MethodObject::with_params("f", shape![Normal "x", RequiredKeyword "y"].unwrap());
        let args = shape![RequiredKeyword "y", Normal ""].unwrap();
        let stack = stack_of(&[100, 10]);
        let mut binder = CallBinder::new(
            Value::Null,
            &method,
            CallSite::new(0, 2).with_shape(&args),
            None,
        );

        binder.assign_positional_argument(0, &stack).unwrap();
        assert_eq!(binder.watermark(), Some(1));
        assert_eq!(binder.frame().local(0), Some(&Value::Integer(10)));

        // Nothing past the watermark: the slot stays unset
        binder.assign_positional_argument(2, &stack).unwrap();
        assert_eq!(binder.frame().local(2), None);
    }

    #[test]
    fn test_keyword_pass_continues_after_unknown_key() {
        let method = MethodObject::with_params("f", shape![OptionalKeyword "b"].unwrap());
        let args = shape![OptionalKeyword "a", OptionalKeyword "b"].unwrap();
        let stack = stack_of(&[1, 2]);
        let mut binder = CallBinder::new(
            Value::Null,
            &method,
            CallSite::new(0, 2).with_shape(&args),
            None,
        );

        let err = binder.assign_keyword_arguments(&stack).unwrap_err();
        assert_eq!(
            err,
            BindError::UnknownKeyword {
                key: "a".to_string(),
                method: "f".to_string()
            }
        );
        assert_eq!(binder.frame().local(0), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_last_unknown_key_is_reported() {
        let method = MethodObject::with_params("g", ShapeDescriptor::default());
        let args = shape![OptionalKeyword "first", RequiredKeyword "second"].unwrap();
        let stack = stack_of(&[1, 2]);
        let mut binder = CallBinder::new(
            Value::Null,
            &method,
            CallSite::new(0, 2).with_shape(&args),
            None,
        );

        let err = binder.assign_keyword_arguments(&stack).unwrap_err();
        assert_eq!(err.to_string(), "unknown key second for method g");
    }

    #[test]
    fn test_read_outside_window_is_error() {
        let method = MethodObject::with_params("f", shape![Normal "a", Normal "b"].unwrap());
        let stack = stack_of(&[1, 2]);
        let binder = CallBinder::new(Value::Null, &method, CallSite::new(0, 1), None);

        let err = binder.bind(&stack).unwrap_err();
        assert_eq!(
            err,
            BindError::ArgumentOutOfWindow {
                index: 2,
                method: "f".to_string()
            }
        );
    }

    #[test]
    fn test_collect_with_no_params_is_noop() {
        let method = MethodObject::with_params("f", ShapeDescriptor::default());
        let stack = stack_of(&[1]);
        let mut binder = CallBinder::new(Value::Null, &method, CallSite::new(0, 1), None);

        binder.collect_splat_argument(&stack).unwrap();
        assert_eq!(binder.cursor(), 0);
        assert!(binder.frame().locals().is_empty());
    }
}
