// ABOUTME: Numeric builtins: sqrt

use crate::error::RuntimeError;
use crate::value::Value;

/// Square root of an integer or float; always returns an f64.
pub fn sqrt(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("sqrt", "1", args.len()));
    }
    match &args[0] {
        Value::I64(value) => Ok(Value::F64((*value as f64).sqrt())),
        Value::F64(value) => Ok(Value::F64(value.sqrt())),
        other => Err(RuntimeError::builtin_type("sqrt", "i64 or f64", other, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_of_integer() {
        assert_eq!(sqrt(&[Value::I64(9)]).unwrap(), Value::F64(3.0));
    }

    #[test]
    fn test_sqrt_of_float() {
        assert_eq!(sqrt(&[Value::F64(2.25)]).unwrap(), Value::F64(1.5));
    }

    #[test]
    fn test_sqrt_rejects_strings() {
        assert!(sqrt(&[Value::Str("4".to_string())]).is_err());
    }
}
