// ABOUTME: String builtins: split, join, strip

use crate::error::RuntimeError;
use crate::value::Value;

/// Splits a string by a non-empty separator into a list of strings.
pub fn split(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 2 {
        return Err(RuntimeError::builtin_arity("split", "2", args.len()));
    }
    let Value::Str(value) = &args[0] else {
        return Err(RuntimeError::builtin_type("split", "str", &args[0], 1));
    };
    let Value::Str(separator) = &args[1] else {
        return Err(RuntimeError::builtin_type("split", "str", &args[1], 2));
    };
    if separator.is_empty() {
        return Err(RuntimeError::builtin("split", "cannot split on empty separator"));
    }

    let parts = value
        .split(separator.as_str())
        .map(|part| Value::Str(part.to_string()))
        .collect();
    Ok(Value::list(parts))
}

/// Joins a list with a string separator; elements render through their
/// inspect forms, so `list(1, 2).join(", ")` is `"1, 2"`.
pub fn join(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 2 {
        return Err(RuntimeError::builtin_arity("join", "2", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("join", "list", &args[0], 1));
    };
    let Value::Str(separator) = &args[1] else {
        return Err(RuntimeError::builtin_type("join", "str", &args[1], 2));
    };

    let parts: Vec<String> = elements.borrow().iter().map(Value::to_string).collect();
    Ok(Value::Str(parts.join(separator)))
}

/// Trims leading and trailing whitespace.
pub fn strip(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("strip", "1", args.len()));
    }
    let Value::Str(value) = &args[0] else {
        return Err(RuntimeError::builtin_type("strip", "str", &args[0], 1));
    };
    Ok(Value::Str(value.trim().to_string()))
}
