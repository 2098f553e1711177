// ABOUTME: Kind introspection and scalar conversion builtins

use crate::error::RuntimeError;
use crate::value::Value;

/// `type(x)` returns the kind name of any value.
pub fn type_name(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("type", "1", args.len()));
    }
    Ok(Value::Str(args[0].kind_name().to_string()))
}

/// Converts a float (truncating) or a decimal string to i64.
/// A string that fails to parse converts to 0.
pub fn as_i64(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("as_i64", "1", args.len()));
    }
    match &args[0] {
        Value::F64(value) => Ok(Value::I64(*value as i64)),
        Value::Str(value) => Ok(Value::I64(value.parse().unwrap_or(0))),
        other => Err(RuntimeError::builtin(
            "as_i64",
            format!("cannot convert {} to i64", other.kind_name()),
        )),
    }
}

/// Converts an integer or a decimal string to f64.
/// A string that fails to parse converts to 0.0.
pub fn as_f64(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("as_f64", "1", args.len()));
    }
    match &args[0] {
        Value::I64(value) => Ok(Value::F64(*value as f64)),
        Value::Str(value) => Ok(Value::F64(value.parse().unwrap_or(0.0))),
        other => Err(RuntimeError::builtin(
            "as_f64",
            format!("cannot convert {} to f64", other.kind_name()),
        )),
    }
}

/// Renders an integer, float, or boolean through its inspect form.
pub fn as_str(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("as_str", "1", args.len()));
    }
    match &args[0] {
        value @ (Value::I64(_) | Value::F64(_) | Value::Bool(_)) => {
            Ok(Value::Str(value.to_string()))
        }
        other => Err(RuntimeError::builtin(
            "as_str",
            format!("cannot convert {} to str", other.kind_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_i64_round_trips_decimal_strings() {
        let value = as_i64(&[Value::Str("123".to_string())]).unwrap();
        assert_eq!(value, Value::I64(123));
        let back = as_str(&[value]).unwrap();
        assert_eq!(back, Value::Str("123".to_string()));
    }

    #[test]
    fn test_as_i64_parse_failure_is_zero() {
        assert_eq!(
            as_i64(&[Value::Str("abc".to_string())]).unwrap(),
            Value::I64(0)
        );
    }

    #[test]
    fn test_as_f64_from_integer() {
        assert_eq!(as_f64(&[Value::I64(2)]).unwrap(), Value::F64(2.0));
    }

    #[test]
    fn test_as_str_rejects_lists() {
        let error = as_str(&[Value::list(vec![])]).unwrap_err();
        assert_eq!(error.to_string(), "as_str: cannot convert list to str");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(
            type_name(&[Value::I64(1)]).unwrap(),
            Value::Str("i64".to_string())
        );
        assert_eq!(
            type_name(&[Value::None]).unwrap(),
            Value::Str("none".to_string())
        );
    }
}
