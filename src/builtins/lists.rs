// ABOUTME: List builtins: len, append, concat, reverse, sort, sum, max,
// min, with_size, transpose

use crate::error::RuntimeError;
use crate::value::Value;

/// Length of a string (bytes) or a list (elements).
pub fn len(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("len", "1", args.len()));
    }
    match &args[0] {
        Value::Str(value) => Ok(Value::I64(value.len() as i64)),
        Value::List(elements) => Ok(Value::I64(elements.borrow().len() as i64)),
        other => Err(RuntimeError::builtin_type("len", "str or list", other, 1)),
    }
}

/// Returns a new list with the value appended; the receiver is unchanged.
pub fn append(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 2 {
        return Err(RuntimeError::builtin_arity("append", "2", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("append", "list", &args[0], 1));
    };

    let mut elements = elements.borrow().clone();
    elements.push(args[1].clone());
    Ok(Value::list(elements))
}

/// Returns a new list holding the elements of both arguments.
pub fn concat(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 2 {
        return Err(RuntimeError::builtin_arity("concat", "2", args.len()));
    }
    let Value::List(left) = &args[0] else {
        return Err(RuntimeError::builtin_type("concat", "list", &args[0], 1));
    };
    let Value::List(right) = &args[1] else {
        return Err(RuntimeError::builtin_type("concat", "list", &args[1], 2));
    };

    let mut elements = left.borrow().clone();
    elements.extend(right.borrow().iter().cloned());
    Ok(Value::list(elements))
}

/// Reverses the list in place and returns it.
pub fn reverse(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("reverse", "1", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("reverse", "list", &args[0], 1));
    };

    elements.borrow_mut().reverse();
    Ok(args[0].clone())
}

/// Sorts a homogeneous numeric list in place and returns it. Mixing i64 and
/// f64 elements is an error rather than a lossy cast.
pub fn sort(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("sort", "1", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("sort", "list", &args[0], 1));
    };
    if elements.borrow().is_empty() {
        return Ok(args[0].clone());
    }

    let numbers = numeric_elements("sort", &elements.borrow())?;
    match numbers {
        Numbers::Ints(mut values) => {
            values.sort_unstable();
            *elements.borrow_mut() = values.into_iter().map(Value::I64).collect();
        }
        Numbers::Floats(mut values) => {
            values.sort_by(f64::total_cmp);
            *elements.borrow_mut() = values.into_iter().map(Value::F64).collect();
        }
    }
    Ok(args[0].clone())
}

/// Sum of a non-empty numeric list; integer sums wrap like `+`.
pub fn sum(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("sum", "1", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("sum", "list", &args[0], 1));
    };
    if elements.borrow().is_empty() {
        return Err(RuntimeError::builtin("sum", "empty list"));
    }

    match numeric_elements("sum", &elements.borrow())? {
        Numbers::Ints(values) => Ok(Value::I64(
            values.into_iter().fold(0i64, i64::wrapping_add),
        )),
        Numbers::Floats(values) => Ok(Value::F64(values.into_iter().sum())),
    }
}

pub fn max(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("max", "1", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("max", "list", &args[0], 1));
    };

    match numeric_elements("max", &elements.borrow())? {
        Numbers::Ints(values) => Ok(values.into_iter().max().map_or(Value::None, Value::I64)),
        Numbers::Floats(values) => Ok(Value::F64(
            values.into_iter().fold(f64::NEG_INFINITY, f64::max),
        )),
    }
}

pub fn min(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("min", "1", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("min", "list", &args[0], 1));
    };

    match numeric_elements("min", &elements.borrow())? {
        Numbers::Ints(values) => Ok(values.into_iter().min().map_or(Value::None, Value::I64)),
        Numbers::Floats(values) => Ok(Value::F64(
            values.into_iter().fold(f64::INFINITY, f64::min),
        )),
    }
}

/// `with_size(list(), rows)` builds a flat list of `none`;
/// `with_size(list(), rows, cols)` builds a rows x cols rectangle of `none`.
pub fn with_size(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(RuntimeError::builtin_arity("with_size", "2-3", args.len()));
    }
    let Value::List(elements) = &args[0] else {
        return Err(RuntimeError::builtin_type("with_size", "list", &args[0], 1));
    };
    if !elements.borrow().is_empty() {
        return Err(RuntimeError::builtin("with_size", "expected an empty list"));
    }
    let rows = dimension("with_size", &args[1], 2)?;

    match args.get(2) {
        None => Ok(Value::list(vec![Value::None; rows])),
        Some(cols_arg) => {
            let cols = dimension("with_size", cols_arg, 3)?;
            let grid = (0..rows)
                .map(|_| Value::list(vec![Value::None; cols]))
                .collect();
            Ok(Value::list(grid))
        }
    }
}

/// Transposes a non-empty list of equal-length lists.
pub fn transpose(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("transpose", "1", args.len()));
    }
    let Value::List(outer) = &args[0] else {
        return Err(RuntimeError::builtin_type("transpose", "list", &args[0], 1));
    };
    let outer = outer.borrow();
    if outer.is_empty() {
        return Err(RuntimeError::builtin("transpose", "expected a non-empty list"));
    }

    let mut grid: Vec<Vec<Value>> = Vec::with_capacity(outer.len());
    for (position, row) in outer.iter().enumerate() {
        let Value::List(row) = row else {
            return Err(RuntimeError::builtin_type("transpose", "list", row, position + 1));
        };
        grid.push(row.borrow().clone());
    }

    let cols = grid[0].len();
    if grid.iter().any(|row| row.len() != cols) {
        return Err(RuntimeError::builtin("transpose", "expected rows of equal length"));
    }

    let transposed = (0..cols)
        .map(|col| Value::list(grid.iter().map(|row| row[col].clone()).collect()))
        .collect();
    Ok(Value::list(transposed))
}

enum Numbers {
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

/// A homogeneous numeric view of a list; the first element decides the
/// kind. Empty and non-numeric lists surface the element-kind error.
fn numeric_elements(function: &'static str, elements: &[Value]) -> Result<Numbers, RuntimeError> {
    match elements.first() {
        Some(Value::I64(_)) => {
            let mut values = Vec::with_capacity(elements.len());
            for (position, element) in elements.iter().enumerate() {
                let Value::I64(value) = element else {
                    return Err(RuntimeError::builtin_type(function, "i64", element, position + 1));
                };
                values.push(*value);
            }
            Ok(Numbers::Ints(values))
        }
        Some(Value::F64(_)) => {
            let mut values = Vec::with_capacity(elements.len());
            for (position, element) in elements.iter().enumerate() {
                let Value::F64(value) = element else {
                    return Err(RuntimeError::builtin_type(function, "f64", element, position + 1));
                };
                values.push(*value);
            }
            Ok(Numbers::Floats(values))
        }
        _ => Err(RuntimeError::builtin(
            function,
            "expected a list of i64 or f64 elements",
        )),
    }
}

fn dimension(
    function: &'static str,
    arg: &Value,
    position: usize,
) -> Result<usize, RuntimeError> {
    let Value::I64(value) = arg else {
        return Err(RuntimeError::builtin_type(function, "i64", arg, position));
    };
    usize::try_from(*value)
        .map_err(|_| RuntimeError::builtin(function, "sizes must be non-negative"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().copied().map(Value::I64).collect())
    }

    #[test]
    fn test_append_leaves_receiver_unchanged() {
        let list = ints(&[1, 2, 3]);
        let appended = append(&[list.clone(), Value::I64(4)]).unwrap();
        assert_eq!(appended, ints(&[1, 2, 3, 4]));
        assert_eq!(list, ints(&[1, 2, 3]));
    }

    #[test]
    fn test_reverse_twice_is_identity() {
        let list = ints(&[1, 2, 3]);
        reverse(&[list.clone()]).unwrap();
        reverse(&[list.clone()]).unwrap();
        assert_eq!(list, ints(&[1, 2, 3]));
    }

    #[test]
    fn test_sort_is_in_place_and_non_decreasing() {
        let list = ints(&[3, 1, 2]);
        let sorted = sort(&[list.clone()]).unwrap();
        assert_eq!(sorted, ints(&[1, 2, 3]));
        assert_eq!(list, ints(&[1, 2, 3]));
    }

    #[test]
    fn test_sort_floats() {
        let list = Value::list(vec![Value::F64(2.5), Value::F64(-1.0), Value::F64(0.5)]);
        let sorted = sort(&[list]).unwrap();
        assert_eq!(
            sorted,
            Value::list(vec![Value::F64(-1.0), Value::F64(0.5), Value::F64(2.5)])
        );
    }

    #[test]
    fn test_sort_rejects_mixed_kinds() {
        let list = Value::list(vec![Value::I64(1), Value::F64(2.0)]);
        assert!(sort(&[list]).is_err());
    }

    #[test]
    fn test_sum_max_min() {
        assert_eq!(sum(&[ints(&[1, 2, 3])]).unwrap(), Value::I64(6));
        assert_eq!(max(&[ints(&[1, 3, 2])]).unwrap(), Value::I64(3));
        assert_eq!(min(&[ints(&[3, 1, 2])]).unwrap(), Value::I64(1));
    }

    #[test]
    fn test_sum_of_empty_list_is_an_error() {
        let error = sum(&[ints(&[])]).unwrap_err();
        assert_eq!(error.to_string(), "sum: empty list");
    }

    #[test]
    fn test_max_of_empty_list_reports_element_kind() {
        let error = max(&[ints(&[])]).unwrap_err();
        assert_eq!(error.to_string(), "max: expected a list of i64 or f64 elements");
    }

    #[test]
    fn test_with_size_flat_and_rectangular() {
        let flat = with_size(&[ints(&[]), Value::I64(2)]).unwrap();
        assert_eq!(flat, Value::list(vec![Value::None, Value::None]));

        let grid = with_size(&[ints(&[]), Value::I64(2), Value::I64(3)]).unwrap();
        let Value::List(rows) = &grid else { panic!("expected a list") };
        assert_eq!(rows.borrow().len(), 2);
        for row in rows.borrow().iter() {
            assert_eq!(row, &Value::list(vec![Value::None; 3]));
        }
    }

    #[test]
    fn test_with_size_rejects_non_empty_receiver() {
        assert!(with_size(&[ints(&[1]), Value::I64(2)]).is_err());
    }

    #[test]
    fn test_transpose() {
        let grid = Value::list(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]);
        let transposed = transpose(&[grid]).unwrap();
        assert_eq!(
            transposed,
            Value::list(vec![ints(&[1, 4]), ints(&[2, 5]), ints(&[3, 6])])
        );
    }

    #[test]
    fn test_transpose_rejects_ragged_rows() {
        let grid = Value::list(vec![ints(&[1, 2]), ints(&[3])]);
        assert!(transpose(&[grid]).is_err());
    }

    #[test]
    fn test_len() {
        assert_eq!(len(&[Value::Str("hello".to_string())]).unwrap(), Value::I64(5));
        assert_eq!(len(&[ints(&[1, 2])]).unwrap(), Value::I64(2));
        assert!(len(&[Value::I64(1)]).is_err());
    }
}
