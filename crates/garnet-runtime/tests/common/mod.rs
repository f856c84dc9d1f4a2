//! Shared helpers for binding tests

#![allow(dead_code)]

use garnet_runtime::{BindError, CallBinder, CallFrame, CallSite, MethodObject, ShapeDescriptor, Stack, Value};

/// Integer values, the usual argument payload in these tests
pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|n| Value::Integer(*n)).collect()
}

/// Stack holding `filler` unrelated slots, the receiver, then `args`.
/// Returns the stack and the receiver index.
pub fn call_stack(filler: usize, args: &[Value]) -> (Stack, usize) {
    let stack: Stack = (0..filler)
        .map(|i| Value::string(format!("caller slot {}", i)))
        .chain(std::iter::once(Value::string("receiver")))
        .chain(args.iter().cloned())
        .collect();
    (stack, filler)
}

/// Bind `args` (receiver at slot 0) against `params`
pub fn bind_call(
    params: ShapeDescriptor,
    arg_shape: Option<&ShapeDescriptor>,
    args: &[Value],
) -> Result<CallFrame, BindError> {
    let method = MethodObject::with_params("f", params);
    let (stack, receiver_index) = call_stack(0, args);
    let mut site = CallSite::new(receiver_index, args.len());
    if let Some(shape) = arg_shape {
        site = site.with_shape(shape);
    }
    CallBinder::new(Value::string("receiver"), &method, site, None).bind(&stack)
}

/// Local slot `index`, panicking with context when it is unset
pub fn local(frame: &CallFrame, index: usize) -> Value {
    frame
        .local(index)
        .cloned()
        .unwrap_or_else(|| panic!("local {} unset in {:?}", index, frame.locals()))
}
