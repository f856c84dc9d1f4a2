//! Arity validation run ahead of binding when `strict_arity` is enabled
//!
//! The binder itself accepts any argument shape and leaves unmatched
//! parameters unset. These checks reject the calls a stricter dispatch layer
//! treats as argument errors.

use crate::shape::ParamKind;
use crate::vm::binder::CallBinder;
use crate::vm::error::BindError;

/// Reject too many or too few positional arguments and missing required keywords
pub fn check(binder: &CallBinder<'_>) -> Result<(), BindError> {
    let method = binder.method_name();
    let keyword_args =
        binder.count_args(ParamKind::RequiredKeyword) + binder.count_args(ParamKind::OptionalKeyword);
    let given = binder.arg_count().saturating_sub(keyword_args);

    let has_splat_param = binder.param_kinds().last() == Some(ParamKind::Splat);
    let max = binder.count_params(ParamKind::Normal) + binder.count_params(ParamKind::Optioned);
    if given > max && !has_splat_param {
        return Err(BindError::TooManyArguments {
            method: method.to_string(),
            max,
            given,
        });
    }

    let expected = binder.normal_params_count();
    if given < expected {
        return Err(BindError::WrongArgumentCount {
            method: method.to_string(),
            expected,
            given,
        });
    }

    for entry in binder.params() {
        if entry.kind == ParamKind::RequiredKeyword
            && binder.has_keyword_argument(&entry.name).is_none()
        {
            return Err(BindError::MissingKeyword {
                key: entry.name.clone(),
                method: method.to_string(),
            });
        }
    }

    Ok(())
}
